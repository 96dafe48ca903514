//! Normalisation of image-provider responses into an `ImageHandle`.
//!
//! Providers answer in several shapes: an `images` array holding URLs, raw
//! base64 strings or `{url}` / `{b64}` objects, or top-level `image_url` /
//! `b64_json` fields. The first usable image wins.

use loreweave_core::service::ImageHandle;
use serde_json::Value;

/// Wraps raw base64 image bytes in a data URL of the given MIME type.
#[must_use]
pub fn data_url(mime: &str, base64: &str) -> ImageHandle {
    ImageHandle::DataUrl(format!("data:{mime};base64,{base64}"))
}

/// Classifies a bare string: remote URL, existing data URL, or raw base64.
#[must_use]
pub fn handle_from_str(value: &str, mime: &str) -> Option<ImageHandle> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else if value.starts_with("http://") || value.starts_with("https://") {
        Some(ImageHandle::Url(value.to_owned()))
    } else if value.starts_with("data:") {
        Some(ImageHandle::DataUrl(value.to_owned()))
    } else {
        Some(data_url(mime, value))
    }
}

/// Extracts the first image from a provider JSON body.
#[must_use]
pub fn normalize(body: &Value, mime: &str) -> Option<ImageHandle> {
    if let Some(first) = body.get("images").and_then(Value::as_array).and_then(|a| a.first()) {
        let found = match first {
            Value::String(s) => handle_from_str(s, mime),
            Value::Object(obj) => obj
                .get("url")
                .and_then(Value::as_str)
                .and_then(|url| handle_from_str(url, mime))
                .or_else(|| {
                    obj.get("b64")
                        .and_then(Value::as_str)
                        .map(|b64| data_url(mime, b64))
                }),
            _ => None,
        };
        if found.is_some() {
            return found;
        }
    }
    body.get("image_url")
        .and_then(Value::as_str)
        .and_then(|url| handle_from_str(url, mime))
        .or_else(|| {
            body.get("b64_json")
                .and_then(Value::as_str)
                .map(|b64| data_url(mime, b64))
        })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const PNG: &str = "image/png";

    #[test]
    fn test_url_string_in_images_array() {
        let body = json!({ "images": ["https://cdn.example/a.png"] });
        assert_eq!(
            normalize(&body, PNG),
            Some(ImageHandle::Url("https://cdn.example/a.png".into()))
        );
    }

    #[test]
    fn test_raw_base64_string_becomes_data_url() {
        let body = json!({ "images": ["iVBORw0KGgo"] });
        assert_eq!(
            normalize(&body, PNG),
            Some(ImageHandle::DataUrl("data:image/png;base64,iVBORw0KGgo".into()))
        );
    }

    #[test]
    fn test_object_entries_with_url_or_b64() {
        let with_url = json!({ "images": [{ "url": "https://cdn.example/b.png" }] });
        let with_b64 = json!({ "images": [{ "b64": "AAAA" }] });
        assert!(normalize(&with_url, PNG).unwrap().is_remote());
        assert_eq!(
            normalize(&with_b64, PNG).unwrap().as_str(),
            "data:image/png;base64,AAAA"
        );
    }

    #[test]
    fn test_top_level_fields() {
        let url = json!({ "image_url": "https://cdn.example/c.png" });
        let b64 = json!({ "b64_json": "BBBB" });
        assert!(normalize(&url, PNG).unwrap().is_remote());
        assert!(!normalize(&b64, PNG).unwrap().is_remote());
    }

    #[test]
    fn test_body_without_image_is_none() {
        assert_eq!(normalize(&json!({ "images": [] }), PNG), None);
        assert_eq!(normalize(&json!({ "error_code": 0 }), PNG), None);
        assert_eq!(normalize(&json!({ "images": [42] }), PNG), None);
    }
}
