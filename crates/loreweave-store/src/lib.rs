//! Loreweave — PostgreSQL persistence.
//!
//! `sqlx` implementations of every repository trait in `loreweave-core` and
//! of the synthesis lock store.

mod rows;

pub mod error;
pub mod pg_character_repository;
pub mod pg_event_log;
pub mod pg_lock_store;
pub mod pg_manuscript_repository;
pub mod pg_reference_repository;
pub mod pg_scene_repository;
pub mod pg_story_repository;
pub mod schema;
