//! Services that call the text and image collaborators.

pub mod manuscript;
pub mod orchestrator;
pub mod strategies;
pub mod validator;
