//! Loreweave — Dice & Event engine.
//!
//! Rolls the narrative d20, classifies it into five severity tiers, biases
//! rolls back toward the mean after streaks, and turns the result into a
//! story beat (hazard, encounter, discovery, ...) that seeds both the
//! narrative and the illustration of a scene.

pub mod application;
pub mod domain;
