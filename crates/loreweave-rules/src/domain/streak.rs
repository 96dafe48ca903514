//! Mean-reversion modifiers derived from a user's recent outcomes.

use loreweave_core::model::DiceCategory;

/// Modifier applied after a bad or critically bad outcome.
pub const RECOVERY_BONUS: i32 = 2;
/// Modifier applied after a good or critically good outcome.
pub const SUCCESS_PENALTY: i32 = -1;

/// Derives roll modifiers from `history` (newest first).
///
/// Only the most recent category counts: a negative one makes the next roll
/// easier, a positive one makes it harder, neutral or no history leaves it
/// untouched.
#[must_use]
pub fn streak_modifiers(history: &[DiceCategory]) -> Vec<i32> {
    match history.first() {
        Some(last) if last.is_negative() => vec![RECOVERY_BONUS],
        Some(last) if last.is_positive() => vec![SUCCESS_PENALTY],
        _ => Vec::new(),
    }
}
