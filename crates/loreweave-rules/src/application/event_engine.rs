//! Event engine.
//!
//! Looks up the user's recent outcomes, rolls with streak modifiers, turns the
//! roll into a beat and appends the event row. One row is written per call,
//! whatever later happens to the contribution.

use std::sync::Mutex;

use loreweave_core::clock::Clock;
use loreweave_core::error::DomainError;
use loreweave_core::model::EventRecord;
use loreweave_core::repository::EventLog;
use loreweave_core::rng::DeterministicRng;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::domain::antagonists::AntagonistRegistry;
use crate::domain::dice;
use crate::domain::events::{EventContext, build_event_context};
use crate::domain::streak::streak_modifiers;

/// Number of past outcomes fetched for streak detection.
pub const DEFAULT_HISTORY_WINDOW: usize = 3;

/// Who is rolling, and where.
#[derive(Debug, Clone, Copy)]
pub struct RollRequest<'a> {
    /// Story the beat belongs to.
    pub story_id: Uuid,
    /// Rolling user.
    pub user_id: &'a str,
    /// Region of the user's character.
    pub region_slug: Option<&'a str>,
    /// Primary faction of the user's character.
    pub faction_slug: Option<&'a str>,
}

/// Rolls and records story beats.
#[derive(Debug, Clone)]
pub struct EventEngine {
    registry: AntagonistRegistry,
    history_window: usize,
}

impl Default for EventEngine {
    fn default() -> Self {
        Self::new(AntagonistRegistry::standard())
    }
}

impl EventEngine {
    /// Creates an engine with the given antagonist pools.
    #[must_use]
    pub fn new(registry: AntagonistRegistry) -> Self {
        Self {
            registry,
            history_window: DEFAULT_HISTORY_WINDOW,
        }
    }

    /// Overrides how many past outcomes are fetched.
    #[must_use]
    pub fn with_history_window(mut self, window: usize) -> Self {
        self.history_window = window;
        self
    }

    /// Rolls a beat for `request` and appends the event row.
    ///
    /// The `Mutex` is locked only around the synchronous roll and antagonist
    /// pick, never across an await.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the history lookup or the
    /// event insert fails, or if the RNG mutex is poisoned.
    #[instrument(skip(self, rng, clock, log), fields(story_id = %request.story_id, user_id = request.user_id))]
    pub async fn roll_event(
        &self,
        request: &RollRequest<'_>,
        rng: &Mutex<dyn DeterministicRng + Send>,
        clock: &dyn Clock,
        log: &dyn EventLog,
    ) -> Result<EventContext, DomainError> {
        let history = log
            .recent_categories(request.story_id, request.user_id, self.history_window)
            .await?;
        let modifiers = streak_modifiers(&history);

        let context = {
            let mut rng_guard = rng
                .lock()
                .map_err(|e| DomainError::Infrastructure(format!("RNG mutex poisoned: {e}")))?;
            let roll = dice::roll(modifiers, &mut *rng_guard);
            build_event_context(roll, request.region_slug, &self.registry, &mut *rng_guard)
        };

        debug!(
            base = context.dice.base_value,
            final_value = context.dice.final_value,
            category = %context.category(),
            event_type = context.event_type.as_str(),
            subtype = %context.subtype,
            "rolled story event"
        );

        log.record(EventRecord {
            id: Uuid::new_v4(),
            story_id: request.story_id,
            scene_id: None,
            user_id: request.user_id.to_owned(),
            region_slug: request.region_slug.map(str::to_owned),
            faction_slug: request.faction_slug.map(str::to_owned),
            dice_roll: context.dice.final_value,
            dice_category: context.category(),
            event_type: context.event_type.as_str().to_owned(),
            event_subtype: context.subtype.clone(),
            payload: context.payload(),
            outcome: None,
            resolved_at: None,
            created_at: clock.now(),
        })
        .await?;

        Ok(context)
    }
}
