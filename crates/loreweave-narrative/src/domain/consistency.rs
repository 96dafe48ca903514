//! Deterministic consistency checks run before any external call.

use loreweave_core::error::DomainError;
use loreweave_core::model::Scene;
use regex::Regex;

use super::markers::MarkerVocabulary;

/// Findings of the heuristic pass, grouped by class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsistencyReport {
    /// Contradictions about a character's state.
    pub character: Vec<String>,
    /// Contradictions about when the action happens.
    pub temporal: Vec<String>,
    /// Breaks of the world's rules.
    pub canonical: Vec<String>,
}

impl ConsistencyReport {
    /// True when no check fired.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.character.is_empty() && self.temporal.is_empty() && self.canonical.is_empty()
    }

    /// Flattened, class-prefixed reasons: character first, then temporal,
    /// then canon.
    #[must_use]
    pub fn reasons(&self) -> Vec<String> {
        self.character
            .iter()
            .map(|r| format!("Character: {r}"))
            .chain(self.temporal.iter().map(|r| format!("Temporal: {r}")))
            .chain(self.canonical.iter().map(|r| format!("Canon: {r}")))
            .collect()
    }
}

/// A compiled marker vocabulary.
///
/// Every match is case-insensitive and anchored on word boundaries.
#[derive(Debug, Clone)]
pub struct ConsistencyChecker {
    death: Option<Regex>,
    revival: Option<Regex>,
    time_travel: Option<Regex>,
    present: Option<Regex>,
    past: Option<Regex>,
}

impl ConsistencyChecker {
    /// Compiles `vocabulary`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if a marker list cannot be
    /// compiled into a pattern.
    pub fn new(vocabulary: &MarkerVocabulary) -> Result<Self, DomainError> {
        Ok(Self {
            death: alternation(&vocabulary.death)?,
            revival: alternation(&vocabulary.revival)?,
            time_travel: alternation(&vocabulary.time_travel)?,
            present: alternation(&vocabulary.present)?,
            past: alternation(&vocabulary.past)?,
        })
    }

    /// Runs every check and collects what fired.
    #[must_use]
    pub fn check(
        &self,
        action: &str,
        character_name: &str,
        recent_scenes: &[Scene],
        canon: Option<&str>,
    ) -> ConsistencyReport {
        let mut report = ConsistencyReport::default();
        let name = word(character_name);

        let died_recently = name.as_ref().is_some_and(|name| {
            recent_scenes
                .iter()
                .any(|s| name.is_match(&s.narrative) && matches(self.death.as_ref(), &s.narrative))
        });
        if died_recently && matches(self.revival.as_ref(), action) {
            report.character.push(format!(
                "the action contradicts an earlier death of {character_name}."
            ));
        }

        if matches(self.time_travel.as_ref(), action) {
            report
                .canonical
                .push("time travel detected in the action.".to_owned());
        }

        let recent_is_present = recent_scenes
            .iter()
            .any(|s| matches(self.present.as_ref(), &s.narrative));
        if recent_is_present && matches(self.past.as_ref(), action) {
            report.temporal.push(
                "the action seems set in the past relative to the recent context.".to_owned(),
            );
        }

        if let Some(canon) = canon.filter(|c| !c.trim().is_empty()) {
            let known = name.as_ref().is_some_and(|name| name.is_match(canon));
            if !known {
                report.character.push(format!(
                    "{character_name} does not appear in the story canon."
                ));
            }
        }

        report
    }
}

fn matches(pattern: Option<&Regex>, text: &str) -> bool {
    pattern.is_some_and(|p| p.is_match(text))
}

fn alternation(markers: &[String]) -> Result<Option<Regex>, DomainError> {
    let escaped: Vec<String> = markers
        .iter()
        .map(|m| m.trim())
        .filter(|m| !m.is_empty())
        .map(regex::escape)
        .collect();
    if escaped.is_empty() {
        return Ok(None);
    }
    Regex::new(&format!(r"(?i)\b(?:{})\b", escaped.join("|")))
        .map(Some)
        .map_err(|e| DomainError::Validation(format!("invalid marker pattern: {e}")))
}

fn word(text: &str) -> Option<Regex> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let edge = |c: Option<char>| if c.is_some_and(is_word_char) { r"\b" } else { "" };
    let (lead, trail) = (edge(text.chars().next()), edge(text.chars().last()));
    Regex::new(&format!(r"(?i){lead}{}{trail}", regex::escape(text))).ok()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
