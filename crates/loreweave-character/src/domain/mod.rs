//! Commands and input rules for stories and characters.

pub mod commands;
pub mod rules;
