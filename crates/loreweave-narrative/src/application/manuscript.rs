//! Manuscript compiler and summarizer.

use std::sync::Arc;
use std::time::Instant;

use loreweave_core::clock::{Clock, elapsed_ms};
use loreweave_core::error::DomainError;
use loreweave_core::model::{Manuscript, Summary};
use loreweave_core::repository::{ManuscriptRepository, SceneRepository};
use loreweave_core::service::TextCompletion;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::config::NarratorConfig;
use crate::domain::manuscript::compile;
use crate::domain::prompts::summary_prompt;

/// Default spacing between summarised versions.
pub const DEFAULT_SUMMARY_INTERVAL: i32 = 50;

/// What `record_version` wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRecord {
    /// Manuscript version, equal to the scene number just written.
    pub version: i32,
    /// False when the version already existed.
    pub manuscript_saved: bool,
    /// Whether a summary was generated and stored for this version.
    pub summarized: bool,
}

/// Rolls scenes up into versioned manuscripts and periodic summaries.
pub struct ManuscriptCompiler {
    text: Arc<dyn TextCompletion>,
    config: NarratorConfig,
    summary_interval: i32,
}

impl ManuscriptCompiler {
    /// Creates a compiler summarising every [`DEFAULT_SUMMARY_INTERVAL`]
    /// versions.
    #[must_use]
    pub fn new(text: Arc<dyn TextCompletion>, config: NarratorConfig) -> Self {
        Self {
            text,
            config,
            summary_interval: DEFAULT_SUMMARY_INTERVAL,
        }
    }

    /// Overrides the summary interval. Values below 1 disable summaries.
    #[must_use]
    pub fn with_summary_interval(mut self, interval: i32) -> Self {
        self.summary_interval = interval;
        self
    }

    /// Whether `version` is due a summary.
    #[must_use]
    pub fn should_summarize(&self, version: i32) -> bool {
        self.summary_interval > 0 && version > 0 && version % self.summary_interval == 0
    }

    /// Compiles every scene of the story. Pure function of persisted state.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the scenes cannot be read.
    pub async fn compile(
        &self,
        story_id: Uuid,
        scenes: &dyn SceneRepository,
    ) -> Result<String, DomainError> {
        let all = scenes.all_in_order(story_id).await?;
        Ok(compile(&all))
    }

    /// Condenses `manuscript` through the text collaborator.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Upstream` or `DomainError::Timeout` when the
    /// call fails.
    pub async fn summarize(&self, manuscript: &str) -> Result<String, DomainError> {
        let prompt = summary_prompt(&self.config, manuscript);
        let summary = self
            .text
            .complete(&prompt)
            .await
            .map_err(|e| DomainError::upstream("text", &e))?;
        Ok(summary.trim().to_owned())
    }

    /// Stores manuscript `version` and, when due, its summary.
    ///
    /// A failed summary is logged and skipped; the scene and manuscript are
    /// already durable by then.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if compiling or saving the
    /// manuscript fails.
    #[instrument(skip(self, scenes, manuscripts, clock), fields(story_id = %story_id))]
    pub async fn record_version(
        &self,
        story_id: Uuid,
        version: i32,
        scenes: &dyn SceneRepository,
        manuscripts: &dyn ManuscriptRepository,
        clock: &dyn Clock,
    ) -> Result<VersionRecord, DomainError> {
        let started = Instant::now();
        let content = self.compile(story_id, scenes).await?;
        let manuscript_saved = manuscripts
            .save_manuscript(Manuscript {
                story_id,
                version,
                content: content.clone(),
                created_at: clock.now(),
            })
            .await?;
        info!(
            stage = "manuscript",
            success = true,
            duration_ms = elapsed_ms(started),
            scene_number = version,
            saved = manuscript_saved,
            "stage complete"
        );

        if !self.should_summarize(version) {
            return Ok(VersionRecord {
                version,
                manuscript_saved,
                summarized: false,
            });
        }

        let started = Instant::now();
        let summarized = match self.summarize(&content).await {
            Ok(summary) => {
                manuscripts
                    .save_summary(Summary {
                        story_id,
                        version,
                        summary,
                        created_at: clock.now(),
                    })
                    .await?
            }
            Err(e) => {
                warn!(
                    stage = "summary",
                    success = false,
                    duration_ms = elapsed_ms(started),
                    scene_number = version,
                    error = %e,
                    "summary skipped"
                );
                return Ok(VersionRecord {
                    version,
                    manuscript_saved,
                    summarized: false,
                });
            }
        };
        info!(
            stage = "summary",
            success = true,
            duration_ms = elapsed_ms(started),
            scene_number = version,
            "stage complete"
        );

        Ok(VersionRecord {
            version,
            manuscript_saved,
            summarized,
        })
    }
}
