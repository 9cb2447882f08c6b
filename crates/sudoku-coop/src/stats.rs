use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A player's standing profile: experience, level, streak, and game tallies.
///
/// The engine computes new snapshots; persistence belongs to the profile
/// store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub player_id: String,
    pub display_name: String,
    pub experience: u32,
    pub level: u32,
    pub streak: u32,
    /// Calendar day of the most recent credited completion
    pub last_played_date: Option<NaiveDate>,
    pub games_played: u32,
    pub games_won: u32,
    /// Newest-first ids of sessions already credited, capped at 100. Guards
    /// against double-counting a replayed completion event.
    pub completed_sessions: Vec<String>,
}

impl Profile {
    /// Fresh profile: level 1, nothing earned yet
    pub fn new(player_id: &str, display_name: &str) -> Self {
        Self {
            player_id: player_id.to_string(),
            display_name: display_name.to_string(),
            experience: 0,
            level: 1,
            streak: 0,
            last_played_date: None,
            games_played: 0,
            games_won: 0,
            completed_sessions: Vec::new(),
        }
    }
}

/// Derives profile updates from completed sessions.
///
/// Both players are credited a win on shared completion; there is no losing
/// side in a cooperative game.
pub struct StatsAggregator;

impl Default for StatsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Fold one completed session into a profile snapshot and return the
    /// updated profile.
    ///
    /// Experience gained is a flat 100 completion bonus plus the player's
    /// in-session score; level is one per 500 experience. The streak counts
    /// consecutive calendar days with a completion: unchanged when `today`
    /// was already credited, incremented when the last credit was yesterday,
    /// reset to 1 otherwise. Replaying an already-credited session id returns
    /// the profile unchanged.
    pub fn record_completion(
        &self,
        profile: &Profile,
        session_id: &str,
        score: u32,
        today: NaiveDate,
    ) -> Profile {
        if profile.completed_sessions.iter().any(|id| id == session_id) {
            return profile.clone();
        }

        let experience = profile.experience + 100 + score;
        let level = experience / 500 + 1;
        let streak = match profile.last_played_date {
            Some(last) if last == today => profile.streak,
            Some(last) if last.succ_opt() == Some(today) => profile.streak + 1,
            _ => 1,
        };

        let mut completed_sessions = profile.completed_sessions.clone();
        completed_sessions.insert(0, session_id.to_string());
        completed_sessions.truncate(100);

        Profile {
            player_id: profile.player_id.clone(),
            display_name: profile.display_name.clone(),
            experience,
            level,
            streak,
            last_played_date: Some(today),
            games_played: profile.games_played + 1,
            games_won: profile.games_won + 1,
            completed_sessions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_fresh_profile_defaults() {
        let profile = Profile::new("alice", "Alice");

        assert_eq!(profile.experience, 0);
        assert_eq!(profile.level, 1);
        assert_eq!(profile.streak, 0);
        assert!(profile.last_played_date.is_none());
        assert_eq!(profile.games_played, 0);
        assert_eq!(profile.games_won, 0);
        assert!(profile.completed_sessions.is_empty());
    }

    #[test]
    fn test_completion_awards_experience_and_win() {
        let aggregator = StatsAggregator::new();
        let profile = Profile::new("alice", "Alice");

        let updated = aggregator.record_completion(&profile, "game_1", 350, day(2024, 3, 15));

        assert_eq!(updated.experience, 450);
        assert_eq!(updated.level, 1);
        assert_eq!(updated.streak, 1);
        assert_eq!(updated.last_played_date, Some(day(2024, 3, 15)));
        assert_eq!(updated.games_played, 1);
        assert_eq!(updated.games_won, 1);
        assert_eq!(updated.completed_sessions, vec!["game_1".to_string()]);
    }

    #[test]
    fn test_level_crosses_threshold() {
        let aggregator = StatsAggregator::new();
        let mut profile = Profile::new("alice", "Alice");
        profile.experience = 450;

        let updated = aggregator.record_completion(&profile, "game_2", 60, day(2024, 3, 15));

        // 450 + 100 + 60 = 610, one full 500 step.
        assert_eq!(updated.experience, 610);
        assert_eq!(updated.level, 2);
    }

    #[test]
    fn test_streak_same_day_unchanged() {
        let aggregator = StatsAggregator::new();
        let mut profile = Profile::new("alice", "Alice");
        profile.streak = 4;
        profile.last_played_date = Some(day(2024, 3, 15));

        let updated = aggregator.record_completion(&profile, "game_2", 0, day(2024, 3, 15));

        assert_eq!(updated.streak, 4);
    }

    #[test]
    fn test_streak_extends_from_yesterday() {
        let aggregator = StatsAggregator::new();
        let mut profile = Profile::new("alice", "Alice");
        profile.streak = 4;
        profile.last_played_date = Some(day(2024, 3, 14));

        let updated = aggregator.record_completion(&profile, "game_2", 0, day(2024, 3, 15));

        assert_eq!(updated.streak, 5);
    }

    #[test]
    fn test_streak_resets_after_gap() {
        let aggregator = StatsAggregator::new();
        let mut profile = Profile::new("alice", "Alice");
        profile.streak = 9;
        profile.last_played_date = Some(day(2024, 3, 10));

        let updated = aggregator.record_completion(&profile, "game_2", 0, day(2024, 3, 15));

        assert_eq!(updated.streak, 1);
    }

    #[test]
    fn test_streak_crosses_month_boundary() {
        let aggregator = StatsAggregator::new();
        let mut profile = Profile::new("alice", "Alice");
        profile.streak = 2;
        profile.last_played_date = Some(day(2024, 2, 29));

        let updated = aggregator.record_completion(&profile, "game_2", 0, day(2024, 3, 1));

        assert_eq!(updated.streak, 3);
    }

    #[test]
    fn test_replay_is_noop() {
        let aggregator = StatsAggregator::new();
        let profile = Profile::new("alice", "Alice");

        let once = aggregator.record_completion(&profile, "game_1", 120, day(2024, 3, 15));
        let twice = aggregator.record_completion(&once, "game_1", 120, day(2024, 3, 16));

        assert_eq!(twice, once);

        // A different session on the same day still counts.
        let third = aggregator.record_completion(&twice, "game_2", 50, day(2024, 3, 16));
        assert_eq!(third.games_played, 2);
    }

    #[test]
    fn test_completed_sessions_capped_newest_first() {
        let aggregator = StatsAggregator::new();
        let mut profile = Profile::new("alice", "Alice");

        for i in 0..150 {
            let id = format!("game_{}", i);
            profile = aggregator.record_completion(&profile, &id, 0, day(2024, 3, 15));
        }

        assert_eq!(profile.completed_sessions.len(), 100);
        assert_eq!(profile.completed_sessions[0], "game_149");
        // The oldest ids aged out of the window.
        assert!(!profile.completed_sessions.contains(&"game_0".to_string()));
        assert_eq!(profile.games_played, 150);
    }

    #[test]
    fn test_profile_serialization_shape() {
        let mut profile = Profile::new("alice", "Alice");
        profile.last_played_date = Some(day(2024, 3, 15));
        let value = serde_json::to_value(&profile).unwrap();

        assert_eq!(value["playerId"], "alice");
        assert_eq!(value["displayName"], "Alice");
        assert_eq!(value["experience"], 0);
        assert_eq!(value["level"], 1);
        assert_eq!(value["lastPlayedDate"], "2024-03-15");
        assert_eq!(value["gamesPlayed"], 0);
        assert_eq!(value["gamesWon"], 0);
        assert!(value["completedSessions"].as_array().unwrap().is_empty());
    }
}
