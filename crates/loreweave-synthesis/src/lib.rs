//! Loreweave — Synthesis bounded context.
//!
//! Serialises contributions per story with a store-backed lock and runs the
//! caller-facing pipeline: validate, lock, orchestrate, persist, compile.

pub mod application;
pub mod domain;
