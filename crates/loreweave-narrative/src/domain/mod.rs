//! Pure narrative logic: configuration, marker heuristics, prompt
//! construction, text shaping and manuscript compilation.

pub mod brief;
pub mod canon;
pub mod config;
pub mod consistency;
pub mod keywords;
pub mod manuscript;
pub mod markers;
pub mod prompts;
pub mod text;
