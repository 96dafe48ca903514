//! The narrative die.
//!
//! A d20 draw plus modifiers, clamped back into the die's range and
//! classified into one of five ordered categories.

use loreweave_core::model::DiceCategory;
use loreweave_core::rng::DeterministicRng;
use serde::Serialize;

/// Lowest face of the die.
pub const DIE_MIN: i32 = 1;
/// Highest face of the die.
pub const DIE_MAX: i32 = 20;

/// Result of one narrative roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiceRoll {
    /// Uniform draw from `DIE_MIN..=DIE_MAX`.
    pub base_value: i32,
    /// `base_value + sum(modifiers)` clamped to the die range.
    pub final_value: i32,
    /// Category of `final_value`.
    pub category: DiceCategory,
    /// Modifiers that were applied.
    pub modifiers: Vec<i32>,
}

/// Classifies a die value. Values outside the die range fall into the
/// nearest end tier, so the function is total over `i32`.
#[must_use]
pub fn categorize(value: i32) -> DiceCategory {
    match value {
        i32::MIN..=5 => DiceCategory::CriticalBad,
        6..=10 => DiceCategory::Bad,
        11..=15 => DiceCategory::Neutral,
        16..=19 => DiceCategory::Good,
        20..=i32::MAX => DiceCategory::CriticalGood,
    }
}

/// Applies `modifiers` to an already drawn `base_value`.
///
/// Pure: used directly by tests that pin the draw.
#[must_use]
pub fn resolve(base_value: i32, modifiers: Vec<i32>) -> DiceRoll {
    let total = modifiers
        .iter()
        .fold(base_value, |acc, m| acc.saturating_add(*m));
    let final_value = total.clamp(DIE_MIN, DIE_MAX);
    DiceRoll {
        base_value,
        final_value,
        category: categorize(final_value),
        modifiers,
    }
}

/// Draws a base value from `rng` and resolves it with `modifiers`.
pub fn roll(modifiers: Vec<i32>, rng: &mut dyn DeterministicRng) -> DiceRoll {
    let draw = rng.next_u32_range(DIE_MIN.unsigned_abs(), DIE_MAX.unsigned_abs());
    let base_value = i32::try_from(draw).unwrap_or(DIE_MAX);
    resolve(base_value, modifiers)
}
