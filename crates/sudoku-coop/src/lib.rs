//! Collaborative two-player Sudoku sessions
//!
//! One player creates a [`Session`] at a chosen difficulty and shares its id;
//! a second joins with that code, and both submit numbers into a shared board
//! until it matches the precomputed solution. The [`SessionEngine`] owns the
//! lifecycle: it serializes all mutations per session, persists every
//! transition through the [`SessionStore`] before acknowledging it, streams
//! snapshots to subscribers, and folds completed sessions into player
//! profiles (experience, level, streak) through the [`StatsAggregator`].

mod engine;
mod error;
mod session;
mod stats;
mod storage;

pub use engine::{EngineConfig, MoveResponse, SessionEngine};
pub use error::SessionError;
pub use session::{MoveOutcome, MoveRecord, Player, Session, SessionStatus};
pub use stats::{Profile, StatsAggregator};
pub use storage::{MemoryProfileStore, MemorySessionStore, ProfileStore, SessionStore, Versioned};
