//! Builds the contribution pipeline from configuration.

use std::path::Path;
use std::sync::Arc;

use loreweave_core::clock::Clock;
use loreweave_core::repository::LockStore;
use loreweave_core::service::{ImageGeneration, ImageHosting, TextCompletion};
use loreweave_narrative::application::manuscript::ManuscriptCompiler;
use loreweave_narrative::application::orchestrator::SceneOrchestrator;
use loreweave_narrative::application::strategies::LlmNarrativeStrategy;
use loreweave_narrative::application::validator::ContributionValidator;
use loreweave_narrative::domain::canon::Canon;
use loreweave_narrative::domain::config::NarratorConfig;
use loreweave_narrative::domain::markers::MarkerVocabulary;
use loreweave_providers::cloudinary::{CloudinaryConfig, CloudinaryHost};
use loreweave_providers::retry::{RetryPolicy, RetryingImageGenerator};
use loreweave_providers::sinkin::{SinkInConfig, SinkInImageClient};
use loreweave_providers::venice::{VeniceConfig, VeniceImageClient, VeniceTextClient};
use loreweave_synthesis::application::lock::SynthesisLock;
use loreweave_synthesis::application::pipeline::{SynthesisConfig, SynthesisPipeline};
use tracing::info;

use crate::config::{AppConfig, ImageProvider};
use crate::error::AppError;

fn read(path: &Path) -> Result<String, AppError> {
    std::fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))
}

/// Narrator settings: YAML overrides when configured, always speaking the
/// configured language.
///
/// # Errors
///
/// Returns `AppError::Config` if the file cannot be read or parsed.
pub fn load_narrator(config: &AppConfig) -> Result<NarratorConfig, AppError> {
    let narrator = match &config.narrator_config_path {
        Some(path) => NarratorConfig::from_yaml(&read(path)?)
            .map_err(|e| AppError::Config(e.to_string()))?,
        None => NarratorConfig::default(),
    };
    Ok(narrator.with_language(config.narrator_language))
}

/// Marker vocabulary from YAML, else the built-in one for the language.
///
/// # Errors
///
/// Returns `AppError::Config` if the file cannot be read or parsed.
pub fn load_markers(config: &AppConfig) -> Result<MarkerVocabulary, AppError> {
    match &config.markers_path {
        Some(path) => {
            MarkerVocabulary::from_yaml(&read(path)?).map_err(|e| AppError::Config(e.to_string()))
        }
        None => Ok(MarkerVocabulary::for_language(config.narrator_language)),
    }
}

/// Canon text; `.md` / `.markdown` files are stripped to plain text.
///
/// # Errors
///
/// Returns `AppError::Config` if the file cannot be read.
pub fn load_canon(path: &Path) -> Result<Canon, AppError> {
    let source = read(path)?;
    let markdown = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("md") || e.eq_ignore_ascii_case("markdown"));
    Ok(if markdown {
        Canon::from_markdown(&source)
    } else {
        Canon::plain(source)
    })
}

fn venice_config(config: &AppConfig) -> VeniceConfig {
    VeniceConfig {
        api_key: config.venice_api_key.clone(),
        base_url: config.venice_base_url.clone(),
        text_model: config.venice_text_model.clone(),
        image_model: config.venice_image_model.clone(),
        timeout: config.text_timeout,
    }
}

fn image_generator(config: &AppConfig) -> Result<Arc<dyn ImageGeneration>, AppError> {
    let inner: Arc<dyn ImageGeneration> = match config.image_provider {
        ImageProvider::SinkIn => {
            let token = config.sinkin_access_token.clone().ok_or_else(|| {
                AppError::Config("SINKIN_ACCESS_TOKEN must be set when IMAGE_PROVIDER is sinkin".into())
            })?;
            Arc::new(
                SinkInImageClient::new(SinkInConfig {
                    model_id: config.sinkin_model_id.clone(),
                    timeout: config.image_timeout,
                    ..SinkInConfig::new(token)
                })
                .map_err(|e| AppError::Config(e.to_string()))?,
            )
        }
        ImageProvider::Venice => Arc::new(
            VeniceImageClient::new(VeniceConfig {
                timeout: config.image_timeout,
                ..venice_config(config)
            })
            .map_err(|e| AppError::Config(e.to_string()))?,
        ),
    };
    let policy = RetryPolicy {
        max_retries: config.image_max_retries,
        attempt_timeout: config.image_timeout,
        ..RetryPolicy::default()
    };
    Ok(Arc::new(RetryingImageGenerator::new(inner, policy)))
}

fn image_host(
    config: &AppConfig,
    clock: Arc<dyn Clock>,
) -> Result<Option<Arc<dyn ImageHosting>>, AppError> {
    let Some(settings) = &config.cloudinary else {
        return Ok(None);
    };
    let host = CloudinaryHost::new(
        CloudinaryConfig {
            folder: settings.folder.clone(),
            ..CloudinaryConfig::new(
                settings.cloud_name.clone(),
                settings.api_key.clone(),
                settings.api_secret.clone(),
            )
        },
        clock,
    )
    .map_err(|e| AppError::Config(e.to_string()))?;
    Ok(Some(Arc::new(host)))
}

/// Wires the external clients, strategies and lock into a pipeline.
///
/// # Errors
///
/// Returns `AppError::Config` if a client cannot be built or a configured
/// file cannot be loaded.
pub fn build_pipeline(
    config: &AppConfig,
    locks: Arc<dyn LockStore>,
    clock: Arc<dyn Clock>,
) -> Result<SynthesisPipeline, AppError> {
    let narrator = load_narrator(config)?;
    let markers = load_markers(config)?;

    let text: Arc<dyn TextCompletion> = Arc::new(
        VeniceTextClient::new(venice_config(config)).map_err(|e| AppError::Config(e.to_string()))?,
    );
    let images = image_generator(config)?;
    let hosting = image_host(config, clock)?;
    info!(
        image_provider = ?config.image_provider,
        image_prompt_strategy = ?config.image_prompt_strategy,
        hosting = hosting.is_some(),
        language = %config.narrator_language,
        "pipeline collaborators configured"
    );

    let validator = ContributionValidator::with_vocabulary(Arc::clone(&text), narrator.clone(), &markers)
        .map_err(|e| AppError::Config(e.to_string()))?;
    let orchestrator = SceneOrchestrator::new(
        Arc::new(LlmNarrativeStrategy::new(Arc::clone(&text), narrator.clone())),
        config.image_prompt_strategy.build(Arc::clone(&text)),
        images,
        hosting,
    );
    let compiler = ManuscriptCompiler::new(text, narrator).with_summary_interval(config.summary_interval);

    let mut pipeline = SynthesisPipeline::new(validator, orchestrator, compiler, SynthesisLock::new(locks))
        .with_config(SynthesisConfig {
            budget: config.synthesis_budget,
            ..SynthesisConfig::default()
        });
    if let Some(path) = &config.canon_path {
        pipeline = pipeline.with_canon(load_canon(path)?);
        info!(path = %path.display(), "canon loaded");
    }
    Ok(pipeline)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn temp_file(name: &str, contents: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("loreweave-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::File::create(&path)
            .unwrap()
            .write_all(contents.as_bytes())
            .unwrap();
        path
    }

    fn config() -> AppConfig {
        AppConfig::from_lookup(|key| match key {
            "DATABASE_URL" => Some("postgres://localhost/loreweave".into()),
            "VENICE_API_KEY" => Some("key".into()),
            "SINKIN_ACCESS_TOKEN" => Some("token".into()),
            "NARRATOR_LANGUAGE" => Some("en".into()),
            _ => None,
        })
        .unwrap()
    }

    #[test]
    fn test_markdown_canon_is_stripped() {
        let path = temp_file("canon.md", "# Canon\n\n**Aria** lives in *Neoterra*.\n");

        let canon = load_canon(&path).unwrap();

        assert!(canon.text().contains("Aria lives in Neoterra."));
        assert!(!canon.text().contains('*'));
    }

    #[test]
    fn test_plain_canon_is_kept_verbatim() {
        let path = temp_file("canon.txt", "Aria *really* lives here.");

        let canon = load_canon(&path).unwrap();

        assert_eq!(canon.text(), "Aria *really* lives here.");
    }

    #[test]
    fn test_missing_canon_is_config_error() {
        let result = load_canon(Path::new("/definitely/not/here.md"));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_narrator_yaml_overrides_defaults_but_not_language() {
        let mut config = config();
        config.narrator_config_path = Some(temp_file("narrator.yaml", "tone: grim\nlanguage: es\n"));

        let narrator = load_narrator(&config).unwrap();

        assert_eq!(narrator.tone, "grim");
        assert_eq!(narrator.language, config.narrator_language);
    }

    #[test]
    fn test_markers_default_to_configured_language() {
        let markers = load_markers(&config()).unwrap();
        assert!(markers.death.iter().any(|m| m == "died"));
    }

    #[tokio::test]
    async fn test_build_pipeline_with_default_config() {
        let store = Arc::new(loreweave_test_support::InMemoryStore::new());
        let clock: Arc<dyn Clock> = Arc::new(loreweave_test_support::FixedClock::standard());

        let pipeline = build_pipeline(&config(), store, clock);

        assert!(pipeline.is_ok());
    }
}
