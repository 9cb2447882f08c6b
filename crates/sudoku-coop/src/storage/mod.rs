use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::SessionError;
use crate::session::Session;
use crate::stats::Profile;

mod memory;

pub use memory::{MemoryProfileStore, MemorySessionStore};

/// A stored record paired with a monotonically increasing version, for
/// conditional updates
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub version: u64,
    pub value: T,
}

/// Durable keyed storage for session documents, with change notification.
///
/// The engine requires update-by-id to be atomic per document and every
/// successful update to reach subscribers as a full snapshot.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert a new session. Fails with [`SessionError::Conflict`] when the
    /// id is already taken.
    async fn create(&self, session: &Session) -> Result<(), SessionError>;

    /// Fetch the current snapshot of a session.
    async fn get(&self, id: &str) -> Result<Session, SessionError>;

    /// Replace a stored session with an updated snapshot and notify
    /// subscribers.
    async fn update(&self, session: &Session) -> Result<(), SessionError>;

    /// Watch a session. The receiver always holds the latest snapshot;
    /// intermediate snapshots may be coalesced under load.
    async fn subscribe(&self, id: &str) -> Result<watch::Receiver<Session>, SessionError>;
}

/// Keyed storage for player profiles.
///
/// Profiles are owned by the account subsystem; the engine reads a snapshot
/// and proposes one conditional update per completion, never holding a lock.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch a profile with its current version, if one exists.
    async fn get(&self, player_id: &str) -> Result<Option<Versioned<Profile>>, SessionError>;

    /// Store a profile unconditionally, creating it if absent.
    async fn put(&self, profile: &Profile) -> Result<(), SessionError>;

    /// Replace an existing profile only if its stored version still matches
    /// `expected_version`; fails with [`SessionError::Conflict`] when a
    /// concurrent writer got there first.
    async fn update(&self, profile: &Profile, expected_version: u64) -> Result<(), SessionError>;

    /// The top `limit` profiles ordered by experience, descending.
    async fn top_by_experience(&self, limit: usize) -> Result<Vec<Profile>, SessionError>;
}
