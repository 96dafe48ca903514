//! Narrator configuration.

use std::fmt;
use std::str::FromStr;

use loreweave_core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Language the narrator writes in. Also selects the marker vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Spanish.
    #[default]
    Es,
    /// English.
    En,
}

impl Language {
    /// ISO 639-1 code.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Es => "es",
            Self::En => "en",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "es" => Ok(Self::Es),
            "en" => Ok(Self::En),
            other => Err(DomainError::Validation(format!(
                "unsupported narrator language: {other}"
            ))),
        }
    }
}

/// Grammatical person of the narration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Person {
    /// "She walks into the tavern."
    #[default]
    Third,
    /// "I walk into the tavern."
    First,
}

impl Person {
    /// Prompt rule line for this person.
    #[must_use]
    pub fn rule(self) -> &'static str {
        match self {
            Self::Third => "Third-person narration.",
            Self::First => "First-person narration.",
        }
    }
}

/// Voice and budgets of the narrator.
///
/// Every field has a default, so a YAML file only needs the keys it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarratorConfig {
    /// Output language.
    pub language: Language,
    /// Overall tone, e.g. "epic".
    pub tone: String,
    /// Genre, e.g. "adventure".
    pub genre: String,
    /// Narrative person.
    pub person: Person,
    /// Lower bound of the requested scene length, in words.
    pub narrative_words_min: u32,
    /// Upper bound of the requested scene length, in words.
    pub narrative_words_max: u32,
    /// Longest accepted action, in characters.
    pub max_action_chars: usize,
    /// Style bullet points for the narrative prompt.
    pub style_guidelines: Vec<String>,
    /// Extra rules for the coherence check.
    pub coherence_directives: Vec<String>,
    /// Requested summary length, in lines.
    pub summary_length_lines: u32,
    /// Per-scene excerpt length in the validation prompt.
    pub validation_excerpt_chars: usize,
    /// Manuscript prefix sent to the summarizer.
    pub summary_input_chars: usize,
}

impl Default for NarratorConfig {
    fn default() -> Self {
        Self {
            language: Language::Es,
            tone: "epic".to_owned(),
            genre: "adventure".to_owned(),
            person: Person::Third,
            narrative_words_min: 180,
            narrative_words_max: 320,
            max_action_chars: 300,
            style_guidelines: vec![
                "Sensory details".to_owned(),
                "Clear transitions".to_owned(),
                "Precise descriptions of settings".to_owned(),
                "Avoid technical jargon".to_owned(),
            ],
            coherence_directives: vec![
                "Preserve continuity with the latest scenes".to_owned(),
                "Avoid contradicting past events".to_owned(),
                "Respect character development".to_owned(),
            ],
            summary_length_lines: 10,
            validation_excerpt_chars: 200,
            summary_input_chars: 15_000,
        }
    }
}

impl NarratorConfig {
    /// Parses a YAML override document on top of the defaults.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the document is not valid YAML
    /// for this shape.
    pub fn from_yaml(source: &str) -> Result<Self, DomainError> {
        serde_yaml::from_str(source)
            .map_err(|e| DomainError::Validation(format!("invalid narrator config: {e}")))
    }

    /// Returns a copy speaking `language`.
    #[must_use]
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }
}
