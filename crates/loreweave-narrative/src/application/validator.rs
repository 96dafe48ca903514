//! Contribution validator.
//!
//! Two phases: deterministic marker checks, then a coherence verdict from
//! the text collaborator. The second phase only runs when the first passes.

use std::sync::Arc;

use loreweave_core::error::DomainError;
use loreweave_core::model::Scene;
use loreweave_core::service::TextCompletion;
use tracing::{debug, instrument};

use crate::domain::brief::SceneExcerpt;
use crate::domain::canon::Canon;
use crate::domain::config::NarratorConfig;
use crate::domain::consistency::ConsistencyChecker;
use crate::domain::markers::MarkerVocabulary;
use crate::domain::prompts::validation_prompt;

/// Which phase produced a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictSource {
    /// The deterministic marker checks.
    Heuristic,
    /// The text collaborator's coherence check.
    Coherence,
}

/// Outcome of validating one contribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationVerdict {
    /// Whether the action may proceed.
    pub valid: bool,
    /// Itemised reasons; empty when valid.
    pub reasons: Vec<String>,
    /// The phase that decided.
    pub source: VerdictSource,
}

/// Rejects contributions that contradict the story so far.
pub struct ContributionValidator {
    text: Arc<dyn TextCompletion>,
    checker: ConsistencyChecker,
    config: NarratorConfig,
}

impl ContributionValidator {
    /// Creates a validator using the built-in vocabulary for the configured
    /// language.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the vocabulary does not compile.
    pub fn new(text: Arc<dyn TextCompletion>, config: NarratorConfig) -> Result<Self, DomainError> {
        let vocabulary = MarkerVocabulary::for_language(config.language);
        Self::with_vocabulary(text, config, &vocabulary)
    }

    /// Creates a validator with a custom marker vocabulary.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the vocabulary does not compile.
    pub fn with_vocabulary(
        text: Arc<dyn TextCompletion>,
        config: NarratorConfig,
        vocabulary: &MarkerVocabulary,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            text,
            checker: ConsistencyChecker::new(vocabulary)?,
            config,
        })
    }

    /// Validates `action` against the recent scenes and optional canon.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Upstream` or `DomainError::Timeout` when the
    /// coherence call fails. A failed call is never read as "invalid".
    #[instrument(skip_all, fields(character = character_name, recent = recent_scenes.len()))]
    pub async fn validate(
        &self,
        action: &str,
        character_name: &str,
        recent_scenes: &[Scene],
        canon: Option<&Canon>,
    ) -> Result<ValidationVerdict, DomainError> {
        let canon_text = canon.map(Canon::text);
        let report = self
            .checker
            .check(action, character_name, recent_scenes, canon_text);
        if !report.is_consistent() {
            debug!(reasons = ?report.reasons(), "heuristic checks rejected contribution");
            return Ok(ValidationVerdict {
                valid: false,
                reasons: report.reasons(),
                source: VerdictSource::Heuristic,
            });
        }

        let excerpts =
            SceneExcerpt::oldest_first(recent_scenes, self.config.validation_excerpt_chars);
        let prompt = validation_prompt(&self.config, action, character_name, &excerpts, canon_text);
        let response = self
            .text
            .complete(&prompt)
            .await
            .map_err(|e| DomainError::upstream("text", &e))?;

        let (valid, reasons) = parse_verdict(&response);
        debug!(valid, "coherence check answered");
        Ok(ValidationVerdict {
            valid,
            reasons,
            source: VerdictSource::Coherence,
        })
    }
}

/// Reads a `VALID` / `INVALID` response.
///
/// The verdict is the prefix of the trimmed, uppercased text. Reasons are the
/// remaining non-empty lines, with list bullets removed.
#[must_use]
pub fn parse_verdict(response: &str) -> (bool, Vec<String>) {
    let trimmed = response.trim();
    if trimmed.to_uppercase().starts_with("VALID") {
        return (true, Vec::new());
    }

    let mut reasons = Vec::new();
    for (i, line) in trimmed.lines().enumerate() {
        let mut line = line.trim();
        if i == 0 {
            line = strip_verdict_token(line);
        }
        let line = line
            .trim_start_matches(['-', '*', '•'])
            .trim_start();
        if !line.is_empty() {
            reasons.push(line.to_owned());
        }
    }
    if reasons.is_empty() {
        reasons.push("the coherence check rejected the action.".to_owned());
    }
    (false, reasons)
}

fn strip_verdict_token(line: &str) -> &str {
    const TOKEN: &str = "INVALID";
    match line.get(..TOKEN.len()) {
        Some(head) if head.eq_ignore_ascii_case(TOKEN) => line[TOKEN.len()..]
            .trim_start_matches([':', '.', '-', ' '])
            .trim(),
        _ => line,
    }
}
