use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use sudoku_core::{Difficulty, Grid, Position, Puzzle};

use crate::error::SessionError;

/// Lifecycle states of a session: linear, no cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Created, waiting for a second player
    Waiting,
    /// Both players present, accepting moves
    Playing,
    /// Board matches the solution; terminal
    Completed,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Waiting => "waiting",
            Self::Playing => "playing",
            Self::Completed => "completed",
        };
        write!(f, "{}", name)
    }
}

/// One participant in a session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub player_id: String,
    pub display_name: String,
    pub score: u32,
}

impl Player {
    fn new(player_id: &str, display_name: &str) -> Self {
        Self {
            player_id: player_id.to_string(),
            display_name: display_name.to_string(),
            score: 0,
        }
    }
}

/// One accepted move in the append-only log
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRecord {
    pub player_id: String,
    pub display_name: String,
    pub row: usize,
    pub col: usize,
    pub value: u8,
    pub timestamp: DateTime<Utc>,
}

/// Outcome of a move attempt that passed validation.
///
/// Rejections here are expected gameplay, reported so the caller can prompt a
/// retry; they never mutate the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveOutcome {
    /// Correct value, committed to the board
    Accepted,
    /// The cell was already filled on the board, likely by the other player
    AlreadyFilled,
    /// The value does not match the solution
    Incorrect,
}

impl MoveOutcome {
    pub fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// One shared game between up to two players.
///
/// The `puzzle` and `solution` grids are fixed at creation; `board` starts as
/// a copy of `puzzle` and converges toward `solution` as correct moves land.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Unique id, doubling as the human-shareable join code
    pub id: String,
    /// Difficulty the puzzle was carved at
    pub difficulty: Difficulty,
    /// The masked grid; non-zero cells are givens and never change
    pub puzzle: Grid,
    /// The full solution the puzzle was carved from
    pub solution: Grid,
    /// The live grid both players fill in
    pub board: Grid,
    /// Participants in join order, at most two
    pub players: Vec<Player>,
    /// Lifecycle state
    pub status: SessionStatus,
    /// Append-only record of accepted moves
    pub move_log: Vec<MoveRecord>,
    /// When the session was created
    pub created_at: DateTime<Utc>,
    /// When the second player joined; `None` while waiting
    pub started_at: Option<DateTime<Utc>>,
    /// When the board matched the solution; `None` until completed
    pub completed_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Build a fresh session around a generated puzzle, with the creator as
    /// the only player
    pub fn create(
        id: String,
        puzzle: &Puzzle,
        creator_id: &str,
        creator_name: &str,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            difficulty: puzzle.difficulty,
            puzzle: puzzle.puzzle,
            solution: puzzle.solution,
            board: puzzle.puzzle,
            players: vec![Player::new(creator_id, creator_name)],
            status: SessionStatus::Waiting,
            move_log: Vec::new(),
            created_at: now,
            started_at: None,
            completed_at: None,
        }
    }

    /// Add the second player and start the game.
    ///
    /// Rejections, in order of precedence: [`SessionError::RoomFull`],
    /// [`SessionError::AlreadyJoined`], [`SessionError::AlreadyStarted`].
    pub fn join(
        &mut self,
        player_id: &str,
        display_name: &str,
        now: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        if self.players.len() >= 2 {
            return Err(SessionError::RoomFull {
                id: self.id.clone(),
            });
        }
        if self.players.iter().any(|p| p.player_id == player_id) {
            return Err(SessionError::AlreadyJoined {
                player_id: player_id.to_string(),
            });
        }
        if self.status != SessionStatus::Waiting {
            return Err(SessionError::AlreadyStarted {
                status: self.status,
            });
        }

        self.players.push(Player::new(player_id, display_name));
        self.status = SessionStatus::Playing;
        self.started_at = Some(now);
        Ok(())
    }

    /// Attempt to place `value` at `(row, col)` on behalf of `player_id`.
    ///
    /// Errors cover malformed or illegal requests; a well-formed move on an
    /// open cell always returns `Ok`, with the outcome saying whether it
    /// committed. A correct value writes the board, awards 10 points, and
    /// appends to the move log; the move that makes the board match the
    /// solution also transitions the session to completed.
    pub fn apply_move(
        &mut self,
        player_id: &str,
        row: usize,
        col: usize,
        value: u8,
        now: DateTime<Utc>,
    ) -> Result<MoveOutcome, SessionError> {
        if self.status != SessionStatus::Playing {
            return Err(SessionError::NotPlaying {
                status: self.status,
            });
        }
        if row >= 9 || col >= 9 {
            return Err(SessionError::InvalidMove {
                reason: format!("cell ({}, {}) is out of range", row, col),
            });
        }
        if !(1..=9).contains(&value) {
            return Err(SessionError::InvalidMove {
                reason: format!("value must be 1-9, got {}", value),
            });
        }

        let pos = Position::new(row, col);
        if !self.puzzle.is_empty(pos) {
            return Err(SessionError::InvalidCell { row, col });
        }

        let player_idx = self
            .players
            .iter()
            .position(|p| p.player_id == player_id)
            .ok_or_else(|| SessionError::NotInSession {
                player_id: player_id.to_string(),
            })?;

        // Two players can race the same cell; the board, not the immutable
        // puzzle, is the serialization point that decides who won it.
        if !self.board.is_empty(pos) {
            return Ok(MoveOutcome::AlreadyFilled);
        }
        if self.solution.get(pos) != value {
            return Ok(MoveOutcome::Incorrect);
        }

        self.board.set(pos, value);
        self.players[player_idx].score += 10;
        self.move_log.push(MoveRecord {
            player_id: player_id.to_string(),
            display_name: self.players[player_idx].display_name.clone(),
            row,
            col,
            value,
            timestamp: now,
        });

        if self.board == self.solution {
            self.status = SessionStatus::Completed;
            self.completed_at = Some(now);
        }

        Ok(MoveOutcome::Accepted)
    }

    /// Look up a participant by id
    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.player_id == player_id)
    }

    /// The last `limit` accepted moves, oldest first
    pub fn recent_moves(&self, limit: usize) -> &[MoveRecord] {
        let start = self.move_log.len().saturating_sub(limit);
        &self.move_log[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sudoku_core::Generator;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    fn make_session() -> Session {
        let puzzle = Generator::with_seed(42).generate(Difficulty::Easy);
        Session::create(
            "game_1_test".to_string(),
            &puzzle,
            "alice",
            "Alice",
            fixed_now(),
        )
    }

    fn playing_session() -> Session {
        let mut session = make_session();
        session.join("bob", "Bob", fixed_now()).unwrap();
        session
    }

    /// Some empty cell of the puzzle with its solution value
    fn open_cell(session: &Session) -> (usize, usize, u8) {
        let pos = Position::all()
            .find(|&p| session.board.is_empty(p))
            .unwrap();
        (pos.row, pos.col, session.solution.get(pos))
    }

    #[test]
    fn test_create_initial_state() {
        let session = make_session();

        assert_eq!(session.status, SessionStatus::Waiting);
        assert_eq!(session.players.len(), 1);
        assert_eq!(session.players[0].player_id, "alice");
        assert_eq!(session.players[0].score, 0);
        assert_eq!(session.board, session.puzzle);
        assert!(session.move_log.is_empty());
        assert_eq!(session.created_at, fixed_now());
        assert!(session.started_at.is_none());
        assert!(session.completed_at.is_none());
    }

    #[test]
    fn test_join_starts_session() {
        let mut session = make_session();
        session.join("bob", "Bob", fixed_now()).unwrap();

        assert_eq!(session.status, SessionStatus::Playing);
        assert_eq!(session.players.len(), 2);
        assert_eq!(session.players[1].player_id, "bob");
        assert_eq!(session.started_at, Some(fixed_now()));
    }

    #[test]
    fn test_join_full_session() {
        let mut session = playing_session();

        let err = session.join("carol", "Carol", fixed_now()).unwrap_err();
        assert!(matches!(err, SessionError::RoomFull { .. }));

        // Room-full wins over duplicate detection.
        let err = session.join("alice", "Alice", fixed_now()).unwrap_err();
        assert!(matches!(err, SessionError::RoomFull { .. }));
    }

    #[test]
    fn test_join_own_session() {
        let mut session = make_session();

        let err = session.join("alice", "Alice", fixed_now()).unwrap_err();
        assert!(matches!(err, SessionError::AlreadyJoined { .. }));
        assert_eq!(session.status, SessionStatus::Waiting);
    }

    #[test]
    fn test_join_after_start() {
        let mut session = make_session();
        session.status = SessionStatus::Playing;

        let err = session.join("bob", "Bob", fixed_now()).unwrap_err();
        assert!(matches!(err, SessionError::AlreadyStarted { .. }));
    }

    #[test]
    fn test_move_requires_playing() {
        let mut session = make_session();
        let (row, col, value) = open_cell(&session);

        let err = session
            .apply_move("alice", row, col, value, fixed_now())
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::NotPlaying {
                status: SessionStatus::Waiting
            }
        ));
    }

    #[test]
    fn test_move_range_checks() {
        let mut session = playing_session();

        let err = session
            .apply_move("alice", 9, 0, 5, fixed_now())
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidMove { .. }));

        let (row, col, _) = open_cell(&session);
        let err = session
            .apply_move("alice", row, col, 0, fixed_now())
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidMove { .. }));
        let err = session
            .apply_move("alice", row, col, 10, fixed_now())
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidMove { .. }));
    }

    #[test]
    fn test_move_on_given_cell() {
        let mut session = playing_session();
        let given = Position::all()
            .find(|&p| !session.puzzle.is_empty(p))
            .unwrap();

        let err = session
            .apply_move("alice", given.row, given.col, 5, fixed_now())
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidCell { .. }));
    }

    #[test]
    fn test_move_by_stranger() {
        let mut session = playing_session();
        let (row, col, value) = open_cell(&session);

        let err = session
            .apply_move("mallory", row, col, value, fixed_now())
            .unwrap_err();
        assert!(matches!(err, SessionError::NotInSession { .. }));
    }

    #[test]
    fn test_incorrect_value_rejected_without_mutation() {
        let mut session = playing_session();
        let (row, col, value) = open_cell(&session);
        let wrong = if value == 9 { 1 } else { value + 1 };

        let outcome = session
            .apply_move("alice", row, col, wrong, fixed_now())
            .unwrap();
        assert_eq!(outcome, MoveOutcome::Incorrect);
        assert!(session.board.is_empty(Position::new(row, col)));
        assert_eq!(session.player("alice").unwrap().score, 0);
        assert!(session.move_log.is_empty());
    }

    #[test]
    fn test_correct_move_commits() {
        let mut session = playing_session();
        let (row, col, value) = open_cell(&session);

        let outcome = session
            .apply_move("bob", row, col, value, fixed_now())
            .unwrap();
        assert!(outcome.is_accepted());
        assert_eq!(session.board.get(Position::new(row, col)), value);
        assert_eq!(session.player("bob").unwrap().score, 10);
        assert_eq!(session.player("alice").unwrap().score, 0);

        let record = &session.move_log[0];
        assert_eq!(record.player_id, "bob");
        assert_eq!(record.display_name, "Bob");
        assert_eq!((record.row, record.col, record.value), (row, col, value));
        assert_eq!(session.status, SessionStatus::Playing);
    }

    #[test]
    fn test_cell_can_only_be_won_once() {
        let mut session = playing_session();
        let (row, col, value) = open_cell(&session);

        let first = session
            .apply_move("alice", row, col, value, fixed_now())
            .unwrap();
        let second = session
            .apply_move("bob", row, col, value, fixed_now())
            .unwrap();

        assert_eq!(first, MoveOutcome::Accepted);
        assert_eq!(second, MoveOutcome::AlreadyFilled);
        assert_eq!(session.player("alice").unwrap().score, 10);
        assert_eq!(session.player("bob").unwrap().score, 0);
        assert_eq!(session.move_log.len(), 1);
    }

    #[test]
    fn test_completion_on_last_move() {
        let mut session = playing_session();
        let empties: Vec<Position> = session.board.empty_positions();

        for (i, pos) in empties.iter().enumerate() {
            let mover = if i % 2 == 0 { "alice" } else { "bob" };
            let value = session.solution.get(*pos);
            let outcome = session
                .apply_move(mover, pos.row, pos.col, value, fixed_now())
                .unwrap();
            assert!(outcome.is_accepted());

            let expected = if i + 1 == empties.len() {
                SessionStatus::Completed
            } else {
                SessionStatus::Playing
            };
            assert_eq!(session.status, expected);
        }

        assert_eq!(session.board, session.solution);
        assert_eq!(session.completed_at, Some(fixed_now()));
        assert_eq!(session.move_log.len(), empties.len());

        // Terminal: nothing further is accepted.
        let pos = empties[0];
        let err = session
            .apply_move("alice", pos.row, pos.col, 1, fixed_now())
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::NotPlaying {
                status: SessionStatus::Completed
            }
        ));
    }

    #[test]
    fn test_recent_moves() {
        let mut session = playing_session();
        let empties: Vec<Position> = session.board.empty_positions();
        for pos in &empties {
            let value = session.solution.get(*pos);
            session
                .apply_move("alice", pos.row, pos.col, value, fixed_now())
                .unwrap();
        }

        let recent = session.recent_moves(5);
        assert_eq!(recent.len(), 5);
        assert_eq!(
            recent.last().unwrap().row,
            session.move_log.last().unwrap().row
        );
        assert_eq!(session.recent_moves(1000).len(), empties.len());
    }

    #[test]
    fn test_session_serialization_shape() {
        let session = make_session();
        let value = serde_json::to_value(&session).unwrap();

        assert_eq!(value["id"], "game_1_test");
        assert_eq!(value["difficulty"], "easy");
        assert_eq!(value["status"], "waiting");
        assert!(value["puzzle"].is_array());
        assert!(value["board"].is_array());
        assert_eq!(value["players"][0]["playerId"], "alice");
        assert_eq!(value["players"][0]["displayName"], "Alice");
        assert_eq!(value["players"][0]["score"], 0);
        assert!(value["moveLog"].as_array().unwrap().is_empty());
        assert!(value["startedAt"].is_null());
        assert!(value["completedAt"].is_null());
        assert!(value["createdAt"].is_string());

        let back: Session = serde_json::from_value(value).unwrap();
        assert_eq!(back.id, session.id);
        assert_eq!(back.board, session.board);
    }
}
