use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sudoku_core::{Difficulty, Generator};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::error::SessionError;
use crate::session::{MoveOutcome, Player, Session, SessionStatus};
use crate::stats::{Profile, StatsAggregator};
use crate::storage::{ProfileStore, SessionStore};

/// Configuration for the session engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Seed for the puzzle generator; `None` seeds from the OS
    pub generator_seed: Option<u64>,
    /// Retries for the conditional profile update when a concurrent writer
    /// wins the race
    pub profile_update_retries: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            generator_seed: None,
            profile_update_retries: 3,
        }
    }
}

impl EngineConfig {
    /// Deterministic engine for reproducible sessions
    pub fn deterministic(seed: u64) -> Self {
        Self {
            generator_seed: Some(seed),
            ..Self::default()
        }
    }
}

/// Reply to a move request: whether it committed, the detailed outcome, and
/// the session snapshot after the attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveResponse {
    pub accepted: bool,
    pub outcome: MoveOutcome,
    pub session: Session,
}

/// Orchestrates sessions against the backing stores.
///
/// Every session is an independently lockable resource: mutating operations
/// against the same session id serialize behind a per-session lock, including
/// their store round trip, so the read-validate-write sequence of a move is
/// atomic with respect to the other player. Operations on different sessions
/// never contend.
pub struct SessionEngine {
    sessions: Arc<dyn SessionStore>,
    profiles: Arc<dyn ProfileStore>,
    generator: Mutex<Generator>,
    stats: StatsAggregator,
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
    config: EngineConfig,
}

impl SessionEngine {
    /// Create an engine with default configuration
    pub fn new(sessions: Arc<dyn SessionStore>, profiles: Arc<dyn ProfileStore>) -> Self {
        Self::with_config(sessions, profiles, EngineConfig::default())
    }

    /// Create an engine with custom configuration
    pub fn with_config(
        sessions: Arc<dyn SessionStore>,
        profiles: Arc<dyn ProfileStore>,
        config: EngineConfig,
    ) -> Self {
        let generator = match config.generator_seed {
            Some(seed) => Generator::with_seed(seed),
            None => Generator::new(),
        };
        Self {
            sessions,
            profiles,
            generator: Mutex::new(generator),
            stats: StatsAggregator::new(),
            locks: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Generate a puzzle and store a fresh waiting session around it. The
    /// returned session's id is the share code a partner joins with.
    #[instrument(skip(self))]
    pub async fn create_session(
        &self,
        difficulty: Difficulty,
        player_id: &str,
        display_name: &str,
    ) -> Result<Session, SessionError> {
        let puzzle = self.generator.lock().unwrap().generate(difficulty);
        let session = Session::create(
            new_session_id(),
            &puzzle,
            player_id,
            display_name,
            Utc::now(),
        );
        self.sessions.create(&session).await?;

        info!(session_id = %session.id, player_id, "Created session");
        Ok(session)
    }

    /// Join a waiting session as the second player, starting the game
    #[instrument(skip(self))]
    pub async fn join_session(
        &self,
        session_id: &str,
        player_id: &str,
        display_name: &str,
    ) -> Result<Session, SessionError> {
        let lock = self.session_lock(session_id);
        let _guard = lock.lock().await;

        let mut session = self.sessions.get(session_id).await?;
        session.join(player_id, display_name, Utc::now())?;
        self.sessions.update(&session).await?;

        info!(session_id, player_id, "Player joined, session started");
        Ok(session)
    }

    /// Submit a value for a cell.
    ///
    /// The whole read-validate-write sequence runs under the session's lock,
    /// so two moves racing the same cell resolve to exactly one winner. An
    /// accepted move is committed to the store before this returns; if the
    /// commit fails the move did not happen and the caller may retry it. The
    /// move that completes the board also credits both players' profiles; a
    /// failed credit only logs, and can be re-driven with
    /// [`apply_completion_stats`](Self::apply_completion_stats).
    #[instrument(skip(self))]
    pub async fn submit_move(
        &self,
        session_id: &str,
        player_id: &str,
        row: usize,
        col: usize,
        value: u8,
    ) -> Result<MoveResponse, SessionError> {
        let lock = self.session_lock(session_id);
        let _guard = lock.lock().await;

        let mut session = self.sessions.get(session_id).await?;
        let outcome = session.apply_move(player_id, row, col, value, Utc::now())?;

        if outcome.is_accepted() {
            self.sessions.update(&session).await?;
            debug!(session_id, player_id, row, col, value, "Move committed");

            if session.status == SessionStatus::Completed {
                info!(session_id, "Session completed");
                if let Err(err) = self.apply_completion_stats(&session).await {
                    warn!(session_id, error = %err, "Profile credit failed");
                }
            }
        } else {
            debug!(
                session_id,
                player_id,
                row,
                col,
                value,
                outcome = ?outcome,
                "Move rejected"
            );
        }

        Ok(MoveResponse {
            accepted: outcome.is_accepted(),
            outcome,
            session,
        })
    }

    /// Fetch the current session snapshot
    pub async fn get_session(&self, session_id: &str) -> Result<Session, SessionError> {
        self.sessions.get(session_id).await
    }

    /// Watch a session. The receiver holds the latest snapshot after each
    /// successful update; bursts of updates may coalesce to the newest.
    pub async fn subscribe(
        &self,
        session_id: &str,
    ) -> Result<watch::Receiver<Session>, SessionError> {
        self.sessions.subscribe(session_id).await
    }

    /// Credit both players' profiles for a completed session.
    ///
    /// Idempotent: session ids already credited on a profile are skipped, so
    /// calling this again after a partial failure is safe. Players without a
    /// stored profile are skipped.
    #[instrument(skip(self, session), fields(session_id = %session.id))]
    pub async fn apply_completion_stats(&self, session: &Session) -> Result<(), SessionError> {
        if session.status != SessionStatus::Completed {
            warn!(status = %session.status, "Session is not completed, nothing to credit");
            return Ok(());
        }

        let today = Utc::now().date_naive();
        for player in &session.players {
            self.credit_player(session, player, today).await?;
        }
        Ok(())
    }

    /// The top `limit` profiles by experience, descending
    pub async fn leaderboard(&self, limit: usize) -> Result<Vec<Profile>, SessionError> {
        self.profiles.top_by_experience(limit).await
    }

    async fn credit_player(
        &self,
        session: &Session,
        player: &Player,
        today: NaiveDate,
    ) -> Result<(), SessionError> {
        for _ in 0..=self.config.profile_update_retries {
            let stored = match self.profiles.get(&player.player_id).await? {
                Some(stored) => stored,
                None => {
                    warn!(player_id = %player.player_id, "No profile for player, skipping credit");
                    return Ok(());
                }
            };

            let updated =
                self.stats
                    .record_completion(&stored.value, &session.id, player.score, today);
            if updated == stored.value {
                debug!(player_id = %player.player_id, "Session already credited");
                return Ok(());
            }

            match self.profiles.update(&updated, stored.version).await {
                Ok(()) => {
                    info!(
                        player_id = %player.player_id,
                        experience = updated.experience,
                        level = updated.level,
                        streak = updated.streak,
                        "Profile credited"
                    );
                    return Ok(());
                }
                Err(SessionError::Conflict { .. }) => {
                    debug!(player_id = %player.player_id, "Profile version conflict, retrying");
                }
                Err(err) => return Err(err),
            }
        }

        Err(SessionError::Conflict {
            id: player.player_id.clone(),
        })
    }

    fn session_lock(&self, session_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap();
        locks.entry(session_id.to_string()).or_default().clone()
    }
}

/// Share-code session id: a millisecond timestamp plus a short random suffix
fn new_session_id() -> String {
    const CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| CHARS[rng.gen_range(0..CHARS.len())] as char)
        .collect();
    format!("game_{}_{}", Utc::now().timestamp_millis(), suffix)
}
