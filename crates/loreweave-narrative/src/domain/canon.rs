//! Canon text loading.
//!
//! Canon documents are usually written in Markdown. The validator only needs
//! the words, so markup is stripped before the text reaches the checks and
//! the prompt.

use pulldown_cmark::{Event, Parser, TagEnd};

/// Canon reference text handed to the validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canon {
    text: String,
}

impl Canon {
    /// Canon from already-plain text.
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Canon from a Markdown document.
    #[must_use]
    pub fn from_markdown(source: &str) -> Self {
        Self {
            text: markdown_to_text(source),
        }
    }

    /// The plain text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Renders Markdown as plain text, one block per line.
#[must_use]
pub fn markdown_to_text(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    for event in Parser::new(source) {
        match event {
            Event::Text(text) | Event::Code(text) => out.push_str(&text),
            Event::SoftBreak => out.push(' '),
            Event::HardBreak
            | Event::End(TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::Item) => {
                if !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
    out.trim().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_markup_is_stripped() {
        let source = "# Heroes\n\n- **Aria**, the scout\n- *Marco*\n\nThe `Veil` never lifts.";

        let text = markdown_to_text(source);

        assert_eq!(text, "Heroes\nAria, the scout\nMarco\nThe Veil never lifts.");
    }

    #[test]
    fn test_plain_canon_is_kept_verbatim() {
        let canon = Canon::plain("Aria and Marco");
        assert_eq!(canon.text(), "Aria and Marco");
    }

    #[test]
    fn test_soft_breaks_become_spaces() {
        assert_eq!(markdown_to_text("one\ntwo"), "one two");
    }
}
