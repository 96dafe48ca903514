//! Loreweave — Story membership bounded context.
//!
//! Responsible for per-tenant stories, character registration with faction,
//! profession and region assignment, and the read-side story context.

pub mod application;
pub mod domain;
