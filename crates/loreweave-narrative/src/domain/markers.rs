//! Marker vocabularies for the deterministic consistency checks.
//!
//! Detection logic is language-agnostic; the words it looks for are data.

use loreweave_core::error::DomainError;
use serde::{Deserialize, Serialize};

use super::config::Language;

/// Phrases the heuristic checks look for, in one language.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerVocabulary {
    /// A character has died.
    pub death: Vec<String>,
    /// A character comes back to life.
    pub revival: Vec<String>,
    /// Explicit time travel.
    pub time_travel: Vec<String>,
    /// The recent context is set "now".
    pub present: Vec<String>,
    /// The action is set in the past.
    pub past: Vec<String>,
}

impl MarkerVocabulary {
    /// Built-in vocabulary for `language`.
    #[must_use]
    pub fn for_language(language: Language) -> Self {
        match language {
            Language::Es => Self::spanish(),
            Language::En => Self::english(),
        }
    }

    /// Parses a vocabulary from YAML.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the document does not parse.
    pub fn from_yaml(source: &str) -> Result<Self, DomainError> {
        serde_yaml::from_str(source)
            .map_err(|e| DomainError::Validation(format!("invalid marker vocabulary: {e}")))
    }

    fn spanish() -> Self {
        Self {
            death: owned(&[
                "murió",
                "murio",
                "muere",
                "está muerto",
                "esta muerto",
                "está muerta",
                "esta muerta",
                "fue asesinado",
                "fue asesinada",
                "falleció",
                "fallecio",
                "se suicidó",
                "se suicido",
            ]),
            revival: owned(&[
                "revive",
                "resucita",
                "resucitar",
                "vuelve a la vida",
                "aparece vivo",
                "aparece viva",
                "está vivo",
                "esta vivo",
                "está viva",
                "esta viva",
            ]),
            time_travel: owned(&[
                "viaja en el tiempo",
                "viajar en el tiempo",
                "retrocede en el tiempo",
            ]),
            present: owned(&["hoy", "presente", "ahora"]),
            past: owned(&["ayer", "antes", "semana pasada", "anoche"]),
        }
    }

    fn english() -> Self {
        Self {
            death: owned(&[
                "died",
                "dies",
                "is dead",
                "was killed",
                "was murdered",
                "passed away",
                "killed himself",
                "killed herself",
                "killed themselves",
            ]),
            revival: owned(&[
                "revives",
                "resurrects",
                "is resurrected",
                "comes back to life",
                "returns from the dead",
                "appears alive",
                "is alive",
            ]),
            time_travel: owned(&[
                "travels in time",
                "travels back in time",
                "time travel",
                "goes back in time",
            ]),
            present: owned(&["today", "present", "now"]),
            past: owned(&["yesterday", "earlier", "last week", "last night"]),
        }
    }
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| (*w).to_owned()).collect()
}
