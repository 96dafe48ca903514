//! Event engine: history lookup, roll, persistence.

pub mod event_engine;
