//! Shared test doubles and utilities for the Loreweave story engine.

mod clock;
mod rng;
mod services;
mod store;

pub use clock::FixedClock;
pub use rng::{MockRng, SequenceRng};
pub use services::{
    FailingImageService, FailingTextService, RecordingImageHost, ScriptedTextService,
    StaticImageService,
};
pub use store::InMemoryStore;
