use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::SessionError;
use crate::session::Session;
use crate::stats::Profile;
use crate::storage::{ProfileStore, SessionStore, Versioned};

/// In-memory session store backed by one watch channel per session.
///
/// The channel sender doubles as the stored document: its current value is
/// the latest snapshot, and replacing it notifies every subscriber.
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, watch::Sender<Session>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Number of stored sessions
    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, session: &Session) -> Result<(), SessionError> {
        let mut sessions = self.sessions.lock().unwrap();
        if sessions.contains_key(&session.id) {
            return Err(SessionError::Conflict {
                id: session.id.clone(),
            });
        }
        let (tx, _rx) = watch::channel(session.clone());
        sessions.insert(session.id.clone(), tx);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Session, SessionError> {
        let sessions = self.sessions.lock().unwrap();
        let sender = sessions.get(id).ok_or_else(|| SessionError::NotFound {
            id: id.to_string(),
        })?;
        let session = sender.borrow().clone();
        Ok(session)
    }

    async fn update(&self, session: &Session) -> Result<(), SessionError> {
        let sessions = self.sessions.lock().unwrap();
        let sender = sessions
            .get(&session.id)
            .ok_or_else(|| SessionError::NotFound {
                id: session.id.clone(),
            })?;
        sender.send_replace(session.clone());
        Ok(())
    }

    async fn subscribe(&self, id: &str) -> Result<watch::Receiver<Session>, SessionError> {
        let sessions = self.sessions.lock().unwrap();
        let sender = sessions.get(id).ok_or_else(|| SessionError::NotFound {
            id: id.to_string(),
        })?;
        Ok(sender.subscribe())
    }
}

/// In-memory profile store with versioned conditional updates
pub struct MemoryProfileStore {
    profiles: Mutex<HashMap<String, Versioned<Profile>>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self {
            profiles: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn get(&self, player_id: &str) -> Result<Option<Versioned<Profile>>, SessionError> {
        let profiles = self.profiles.lock().unwrap();
        Ok(profiles.get(player_id).cloned())
    }

    async fn put(&self, profile: &Profile) -> Result<(), SessionError> {
        let mut profiles = self.profiles.lock().unwrap();
        let version = profiles
            .get(&profile.player_id)
            .map_or(1, |current| current.version + 1);
        profiles.insert(
            profile.player_id.clone(),
            Versioned {
                version,
                value: profile.clone(),
            },
        );
        Ok(())
    }

    async fn update(&self, profile: &Profile, expected_version: u64) -> Result<(), SessionError> {
        let mut profiles = self.profiles.lock().unwrap();
        let current =
            profiles
                .get_mut(&profile.player_id)
                .ok_or_else(|| SessionError::NotFound {
                    id: profile.player_id.clone(),
                })?;
        if current.version != expected_version {
            return Err(SessionError::Conflict {
                id: profile.player_id.clone(),
            });
        }
        *current = Versioned {
            version: expected_version + 1,
            value: profile.clone(),
        };
        Ok(())
    }

    async fn top_by_experience(&self, limit: usize) -> Result<Vec<Profile>, SessionError> {
        let profiles = self.profiles.lock().unwrap();
        let mut all: Vec<Profile> = profiles.values().map(|v| v.value.clone()).collect();
        all.sort_by(|a, b| {
            b.experience
                .cmp(&a.experience)
                .then_with(|| a.player_id.cmp(&b.player_id))
        });
        all.truncate(limit);
        Ok(all)
    }
}
