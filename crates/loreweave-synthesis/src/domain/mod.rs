//! Commands, outcomes and input rules of the synthesis pipeline.

pub mod commands;
pub mod input;
pub mod outcome;
