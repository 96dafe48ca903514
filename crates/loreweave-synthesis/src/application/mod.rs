//! Lock management and the contribution pipeline.

pub mod lock;
pub mod pipeline;
