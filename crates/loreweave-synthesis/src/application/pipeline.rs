//! The contribution pipeline.
//!
//! input bounds → character lookup → validation → lock → orchestration →
//! scene persist → manuscript (and periodic summary) → unlock.
//!
//! The lock is held from orchestration through manuscript compilation, so
//! the scene repository's "next sequence number" read and the insert happen
//! under it. Orchestration runs under one wall-clock budget. Once the scene
//! is appended the contribution is accepted, so persistence and the
//! manuscript step run outside it. The lock is released before returning.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use loreweave_core::clock::{Clock, elapsed_ms};
use loreweave_core::command::Command;
use loreweave_core::error::DomainError;
use loreweave_core::model::{Character, NewScene};
use loreweave_core::repository::{
    CharacterRepository, EventLog, ManuscriptRepository, ReferenceRepository, SceneRepository,
};
use loreweave_core::rng::DeterministicRng;
use loreweave_narrative::application::manuscript::ManuscriptCompiler;
use loreweave_narrative::application::orchestrator::{
    GenerationContext, GeneratedScene, SceneOrchestrator,
};
use loreweave_narrative::application::validator::ContributionValidator;
use loreweave_narrative::domain::canon::Canon;
use tracing::{error, info, instrument, warn};

use super::lock::SynthesisLock;
use crate::domain::commands::SubmitContribution;
use crate::domain::input::{MAX_ACTION_CHARS, NO_CHARACTER, normalize_action};
use crate::domain::outcome::{AcceptedScene, ContributionOutcome};

/// Tunables of the pipeline.
#[derive(Debug, Clone)]
pub struct SynthesisConfig {
    /// Wall-clock budget of orchestration inside the locked section.
    pub budget: Duration,
    /// Recent scenes fed to validation and generation.
    pub recent_window: usize,
    /// Longest accepted action, in characters.
    pub max_action_chars: usize,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            budget: Duration::from_secs(240),
            recent_window: 3,
            max_action_chars: MAX_ACTION_CHARS,
        }
    }
}

/// Stores and shared state a submission works against.
#[derive(Clone, Copy)]
pub struct SynthesisContext<'a> {
    /// Registered characters.
    pub characters: &'a dyn CharacterRepository,
    /// Scenes.
    pub scenes: &'a dyn SceneRepository,
    /// Event history and log.
    pub events: &'a dyn EventLog,
    /// Manuscripts and summaries.
    pub manuscripts: &'a dyn ManuscriptRepository,
    /// Reference tables.
    pub references: &'a dyn ReferenceRepository,
    /// Shared RNG.
    pub rng: &'a Mutex<dyn DeterministicRng + Send>,
    /// Time source.
    pub clock: &'a dyn Clock,
}

/// Everything needed to turn contributions into scenes.
pub struct SynthesisPipeline {
    validator: ContributionValidator,
    orchestrator: SceneOrchestrator,
    compiler: ManuscriptCompiler,
    lock: SynthesisLock,
    canon: Option<Canon>,
    config: SynthesisConfig,
}

impl SynthesisPipeline {
    /// Creates a pipeline with default tunables and no canon.
    #[must_use]
    pub fn new(
        validator: ContributionValidator,
        orchestrator: SceneOrchestrator,
        compiler: ManuscriptCompiler,
        lock: SynthesisLock,
    ) -> Self {
        Self {
            validator,
            orchestrator,
            compiler,
            lock,
            canon: None,
            config: SynthesisConfig::default(),
        }
    }

    /// Sets the canon text checked by the validator.
    #[must_use]
    pub fn with_canon(mut self, canon: Canon) -> Self {
        self.canon = Some(canon);
        self
    }

    /// Replaces the tunables.
    #[must_use]
    pub fn with_config(mut self, config: SynthesisConfig) -> Self {
        self.config = config;
        self
    }

    /// The synthesis lock, for diagnostics.
    #[must_use]
    pub fn lock(&self) -> &SynthesisLock {
        &self.lock
    }

    /// Handles `SubmitContribution`.
    ///
    /// Invalid input, rejection and lock contention are returned as
    /// outcomes and mutate nothing.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Upstream` or `DomainError::Timeout` when
    /// validation or narration fails or the orchestration budget runs out, and
    /// `DomainError::Infrastructure` or `DomainError::Conflict` when
    /// persistence fails. The lock is released in every case.
    #[instrument(
        skip(self, command, ctx),
        fields(
            command = command.command_type(),
            correlation_id = %command.correlation_id(),
            story_id = %command.story_id,
            user_id = %command.user_id
        )
    )]
    pub async fn submit(
        &self,
        command: &SubmitContribution,
        ctx: SynthesisContext<'_>,
    ) -> Result<ContributionOutcome, DomainError> {
        let action = match normalize_action(&command.action, self.config.max_action_chars) {
            Ok(action) => action,
            Err(reason) => {
                info!(outcome = "invalid_input", %reason, "contribution not processed");
                return Ok(ContributionOutcome::InvalidInput { reason });
            }
        };
        let Some(character) = ctx
            .characters
            .find_for_user(command.story_id, &command.user_id)
            .await?
        else {
            info!(outcome = "invalid_input", "contributor has no character");
            return Ok(ContributionOutcome::InvalidInput {
                reason: NO_CHARACTER.to_owned(),
            });
        };

        let started = Instant::now();
        let recent = ctx
            .scenes
            .recent(command.story_id, self.config.recent_window)
            .await?;
        let verdict = self
            .validator
            .validate(action, &character.name, &recent, self.canon.as_ref())
            .await;
        let verdict = match verdict {
            Ok(verdict) => verdict,
            Err(e) => {
                warn!(
                    stage = "validate",
                    success = false,
                    duration_ms = elapsed_ms(started),
                    error = %e,
                    "stage failed"
                );
                return Err(e);
            }
        };
        info!(
            stage = "validate",
            success = true,
            duration_ms = elapsed_ms(started),
            valid = verdict.valid,
            "stage complete"
        );
        if !verdict.valid {
            info!(outcome = "rejected", reasons = ?verdict.reasons, "contribution rejected");
            return Ok(ContributionOutcome::Rejected {
                reasons: verdict.reasons,
            });
        }

        let Some(guard) = self
            .lock
            .guard(command.story_id, &command.user_id, ctx.clock.now())
            .await?
        else {
            info!(stage = "lock", success = false, outcome = "locked", "story busy");
            return Ok(ContributionOutcome::Locked);
        };
        info!(stage = "lock", success = true, "synthesis lock acquired");

        let result = match tokio::time::timeout(
            self.config.budget,
            self.orchestrate(command, action, &character, ctx),
        )
        .await
        {
            Ok(Ok((context_used, generated))) => {
                self.persist(command, action, &character, context_used, generated, ctx)
                    .await
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(DomainError::Timeout(format!(
                "synthesis exceeded {:?}",
                self.config.budget
            ))),
        };

        if let Err(e) = guard.release().await {
            error!(error = %e, "failed to release synthesis lock");
        }

        match &result {
            Ok(outcome) => info!(outcome = outcome.label(), "contribution processed"),
            Err(e) => error!(error = %e, "contribution failed"),
        }
        result
    }

    async fn orchestrate(
        &self,
        command: &SubmitContribution,
        action: &str,
        character: &Character,
        ctx: SynthesisContext<'_>,
    ) -> Result<(Vec<i32>, GeneratedScene), DomainError> {
        let recent = ctx
            .scenes
            .recent(command.story_id, self.config.recent_window)
            .await?;

        let started = Instant::now();
        let generated = self
            .orchestrator
            .generate(
                action,
                character,
                &recent,
                GenerationContext {
                    story_id: command.story_id,
                    rng: ctx.rng,
                    clock: ctx.clock,
                    events: ctx.events,
                    references: ctx.references,
                },
            )
            .await?;
        info!(
            stage = "orchestrate",
            success = true,
            duration_ms = elapsed_ms(started),
            has_image = generated.image_url.is_some(),
            "stage complete"
        );

        let mut context_used: Vec<i32> = recent.iter().map(|s| s.scene_number).collect();
        context_used.sort_unstable();
        Ok((context_used, generated))
    }

    async fn persist(
        &self,
        command: &SubmitContribution,
        action: &str,
        character: &Character,
        context_used: Vec<i32>,
        generated: GeneratedScene,
        ctx: SynthesisContext<'_>,
    ) -> Result<ContributionOutcome, DomainError> {
        let started = Instant::now();
        let scene = ctx
            .scenes
            .append(NewScene {
                story_id: command.story_id,
                character_id: Some(character.id),
                user_id: command.user_id.clone(),
                action: action.to_owned(),
                narrative: generated.narrative.clone(),
                image_url: generated.image_url.clone(),
                location: Some(generated.location.clone()),
                context_used,
                created_at: ctx.clock.now(),
            })
            .await?;
        info!(
            stage = "persist",
            success = true,
            duration_ms = elapsed_ms(started),
            scene_number = scene.scene_number,
            "stage complete"
        );

        self.compiler
            .record_version(
                command.story_id,
                scene.scene_number,
                ctx.scenes,
                ctx.manuscripts,
                ctx.clock,
            )
            .await?;

        Ok(ContributionOutcome::Accepted(AcceptedScene {
            scene_id: scene.id,
            scene_number: scene.scene_number,
            narrative: scene.narrative,
            image_url: scene.image_url,
            image_prompt: generated.image_prompt,
            event_type: generated.event.event_type.as_str().to_owned(),
            dice_roll: generated.event.dice.final_value,
            dice_category: generated.event.category(),
        }))
    }
}
