//! HTTP route modules.

pub mod character;
pub mod contribution;
pub mod health;
pub mod story;
