//! Pure dice, streak and event-table logic.

pub mod antagonists;
pub mod dice;
pub mod events;
pub mod streak;
