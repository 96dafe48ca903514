//! Loreweave Core — shared data model and collaborator contracts.
//!
//! This crate defines the persisted records, the repository and service
//! traits every bounded context depends on, and the determinism seams
//! (clock, RNG). It contains no infrastructure code.

pub mod clock;
pub mod command;
pub mod error;
pub mod model;
pub mod repository;
pub mod rng;
pub mod service;
