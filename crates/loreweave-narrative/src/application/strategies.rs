//! Swappable generation strategies.
//!
//! The orchestrator only sees the two traits; which implementation runs is a
//! configuration choice.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use loreweave_core::error::DomainError;
use loreweave_core::service::{ServiceError, TextCompletion};

use crate::domain::brief::SceneBrief;
use crate::domain::config::NarratorConfig;
use crate::domain::keywords::keyword_prompt;
use crate::domain::prompts::{image_prompt_request, narrative_prompt};
use crate::domain::text::{single_line, strip_quotes, truncate_chars};

/// Turns a brief into scene prose.
#[async_trait]
pub trait NarrativeStrategy: Send + Sync {
    /// Raw prose for `brief`. Post-processing is the caller's job.
    async fn narrate(&self, brief: &SceneBrief) -> Result<String, ServiceError>;
}

/// Turns a brief into a text-to-image prompt.
#[async_trait]
pub trait ImagePromptStrategy: Send + Sync {
    /// Whether `design` wants the finished narrative. When `false` the
    /// orchestrator runs it alongside narration and passes `None`.
    fn needs_narrative(&self) -> bool;

    /// A single-line prompt of at most `max_chars` characters.
    async fn design(
        &self,
        brief: &SceneBrief,
        narrative: Option<&str>,
        max_chars: usize,
    ) -> Result<String, ServiceError>;
}

/// Narration by the text collaborator.
pub struct LlmNarrativeStrategy {
    text: Arc<dyn TextCompletion>,
    config: NarratorConfig,
}

impl LlmNarrativeStrategy {
    /// Creates the strategy.
    #[must_use]
    pub fn new(text: Arc<dyn TextCompletion>, config: NarratorConfig) -> Self {
        Self { text, config }
    }
}

#[async_trait]
impl NarrativeStrategy for LlmNarrativeStrategy {
    async fn narrate(&self, brief: &SceneBrief) -> Result<String, ServiceError> {
        let prompt = narrative_prompt(&self.config, brief);
        let narrative = self.text.complete(&prompt).await?;
        if narrative.trim().is_empty() {
            return Err(ServiceError::EmptyResponse("narrative".to_owned()));
        }
        Ok(narrative)
    }
}

/// Image prompts written by the text collaborator.
pub struct LlmImagePromptStrategy {
    text: Arc<dyn TextCompletion>,
    from_narrative: bool,
}

impl LlmImagePromptStrategy {
    /// Designs from the brief alone, so it can run alongside narration.
    #[must_use]
    pub fn from_brief(text: Arc<dyn TextCompletion>) -> Self {
        Self {
            text,
            from_narrative: false,
        }
    }

    /// Designs from the finished narrative, after narration.
    #[must_use]
    pub fn from_narrative(text: Arc<dyn TextCompletion>) -> Self {
        Self {
            text,
            from_narrative: true,
        }
    }
}

#[async_trait]
impl ImagePromptStrategy for LlmImagePromptStrategy {
    fn needs_narrative(&self) -> bool {
        self.from_narrative
    }

    async fn design(
        &self,
        brief: &SceneBrief,
        narrative: Option<&str>,
        max_chars: usize,
    ) -> Result<String, ServiceError> {
        let request = image_prompt_request(brief, narrative, max_chars);
        let raw = self.text.complete(&request).await?;
        let line = single_line(&raw);
        let prompt = truncate_chars(strip_quotes(&line), max_chars).trim().to_owned();
        if prompt.is_empty() {
            return Err(ServiceError::EmptyResponse("image prompt".to_owned()));
        }
        Ok(prompt)
    }
}

/// Deterministic keyword-table prompts. Never calls out.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordImagePromptStrategy;

#[async_trait]
impl ImagePromptStrategy for KeywordImagePromptStrategy {
    fn needs_narrative(&self) -> bool {
        false
    }

    async fn design(
        &self,
        brief: &SceneBrief,
        _narrative: Option<&str>,
        max_chars: usize,
    ) -> Result<String, ServiceError> {
        Ok(keyword_prompt(brief, max_chars))
    }
}

/// Which image-prompt strategy to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImagePromptMode {
    /// Text collaborator, run alongside narration.
    #[default]
    Llm,
    /// Text collaborator, fed the finished narrative.
    LlmFromNarrative,
    /// Keyword table.
    Keywords,
}

impl ImagePromptMode {
    /// Builds the strategy for this mode.
    #[must_use]
    pub fn build(self, text: Arc<dyn TextCompletion>) -> Arc<dyn ImagePromptStrategy> {
        match self {
            Self::Llm => Arc::new(LlmImagePromptStrategy::from_brief(text)),
            Self::LlmFromNarrative => Arc::new(LlmImagePromptStrategy::from_narrative(text)),
            Self::Keywords => Arc::new(KeywordImagePromptStrategy),
        }
    }
}

impl FromStr for ImagePromptMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "llm" => Ok(Self::Llm),
            "llm_narrative" | "llm-narrative" => Ok(Self::LlmFromNarrative),
            "keywords" => Ok(Self::Keywords),
            other => Err(DomainError::Validation(format!(
                "unknown image prompt strategy: {other}"
            ))),
        }
    }
}
