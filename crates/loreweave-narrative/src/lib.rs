//! Loreweave — Narrative bounded context.
//!
//! Responsible for rejecting canon-breaking contributions, turning an
//! accepted action into prose and an illustration, and rolling the story up
//! into versioned manuscripts and summaries.

pub mod application;
pub mod domain;
