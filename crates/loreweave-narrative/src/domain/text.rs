//! Small text-shaping helpers shared by prompts and post-processing.

/// The first `max` characters of `text`, never splitting a code point.
#[must_use]
pub fn truncate_chars(text: &str, max: usize) -> &str {
    text.char_indices().nth(max).map_or(text, |(i, _)| &text[..i])
}

/// Keeps at most `max` paragraphs, where paragraphs are separated by one or
/// more blank lines. Paragraphs are trimmed and rejoined with one blank line.
#[must_use]
pub fn first_paragraphs(text: &str, max: usize) -> String {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line.trim_end());
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join("\n"));
    }

    paragraphs
        .iter()
        .map(|p| p.trim())
        .take(max)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Collapses every whitespace run to one space and trims the ends.
#[must_use]
pub fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Removes one pair of surrounding quotes, if present.
#[must_use]
pub fn strip_quotes(text: &str) -> &str {
    let trimmed = text.trim();
    for (open, close) in [('"', '"'), ('\'', '\''), ('“', '”'), ('`', '`')] {
        if let Some(inner) = trimmed
            .strip_prefix(open)
            .and_then(|rest| rest.strip_suffix(close))
        {
            return inner.trim();
        }
    }
    trimmed
}

/// Joins `tags` with ", " in order, skipping any whole tag that would push
/// the result past `max` characters.
#[must_use]
pub fn join_within(tags: &[String], max: usize) -> String {
    let mut out = String::new();
    let mut len = 0;
    for tag in tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        let sep = if out.is_empty() { 0 } else { 2 };
        let tag_len = tag.chars().count();
        if len + sep + tag_len > max {
            continue;
        }
        if sep > 0 {
            out.push_str(", ");
        }
        out.push_str(tag);
        len += sep + tag_len;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_respects_multibyte_boundaries() {
        assert_eq!(truncate_chars("canción", 6), "canció");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn test_first_paragraphs_keeps_three() {
        let text = "One.\n\nTwo.\n \nThree.\n\n\nFour.";
        assert_eq!(first_paragraphs(text, 3), "One.\n\nTwo.\n\nThree.");
    }

    #[test]
    fn test_first_paragraphs_keeps_line_breaks_inside_a_paragraph() {
        let text = "\n\nLine a\nline b\n\nNext.\n";
        assert_eq!(first_paragraphs(text, 3), "Line a\nline b\n\nNext.");
    }

    #[test]
    fn test_single_line_collapses_whitespace() {
        assert_eq!(single_line("  a\n b\t\tc  "), "a b c");
    }

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes("\"tavern, candles\""), "tavern, candles");
        assert_eq!(strip_quotes("no quotes"), "no quotes");
        assert_eq!(strip_quotes("\"unbalanced"), "\"unbalanced");
    }

    #[test]
    fn test_join_within_skips_whole_tags() {
        let tags = vec!["alpha".to_owned(), "beta".to_owned(), "gamma".to_owned()];
        assert_eq!(join_within(&tags, 11), "alpha, beta");
        let skipped = vec!["alpha".to_owned(), "far too long".to_owned(), "beta".to_owned()];
        assert_eq!(join_within(&skipped, 11), "alpha, beta");
        assert_eq!(join_within(&tags, 4), "beta");
        assert_eq!(join_within(&tags, 3), "");
        assert_eq!(join_within(&tags, 100), "alpha, beta, gamma");
    }
}
