//! Replaying an event stream through an engine and emitting JSON lines.

pub mod replay;

pub use replay::{replay_events, ReplayError, ReplaySummary};
