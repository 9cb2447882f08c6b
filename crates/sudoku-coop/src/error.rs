use crate::session::SessionStatus;

/// Error types for session operations.
///
/// Everything here is caller-correctable or infrastructural; an incorrect
/// candidate value is a normal gameplay outcome and is reported through
/// [`MoveOutcome`](crate::session::MoveOutcome), not as an error.
#[derive(Clone, Debug, thiserror::Error)]
pub enum SessionError {
    /// No session exists under this id.
    #[error("session not found: {id}")]
    NotFound {
        /// The session id that was looked up.
        id: String,
    },
    /// The session already has two players.
    #[error("session {id} is full")]
    RoomFull {
        /// The session id that was joined.
        id: String,
    },
    /// The player is already part of this session.
    #[error("player {player_id} already joined this session")]
    AlreadyJoined {
        /// The duplicate player id.
        player_id: String,
    },
    /// The session has left the waiting state and cannot be joined.
    #[error("session already started: status is {status}")]
    AlreadyStarted {
        /// Current session status.
        status: SessionStatus,
    },
    /// The target cell is a given and is never writable.
    #[error("cell ({row}, {col}) is a given cell")]
    InvalidCell {
        /// Target row.
        row: usize,
        /// Target column.
        col: usize,
    },
    /// The move request itself is malformed.
    #[error("invalid move: {reason}")]
    InvalidMove {
        /// Reason the move is invalid.
        reason: String,
    },
    /// Moves are only accepted while the session is playing.
    #[error("session is not accepting moves: status is {status}")]
    NotPlaying {
        /// Current session status.
        status: SessionStatus,
    },
    /// The acting player is not part of this session.
    #[error("player {player_id} is not in this session")]
    NotInSession {
        /// The unknown player id.
        player_id: String,
    },
    /// A conditional update lost against a concurrent writer.
    #[error("concurrent update conflict on {id}")]
    Conflict {
        /// The record id that was being updated.
        id: String,
    },
    /// The backing store failed; the operation did not commit.
    #[error("persistence failure: {message}")]
    Persistence {
        /// Store-reported failure detail.
        message: String,
    },
}
