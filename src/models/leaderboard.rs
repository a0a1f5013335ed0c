use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One ranked player, computed from completed games on every request.
#[derive(Clone, Debug, PartialEq)]
pub struct LeaderStats {
    pub user_id: Uuid,
    pub login: String,
    pub win_ratio: f64,
    pub wins: u32,
    pub total: u32,
}

// Query string of the leaderboard request
#[derive(Deserialize, Debug)]
pub struct LeaderboardQuery {
    pub limit: Option<i64>,
}

// The struct used to respond with a leaderboard entry. win_ratio is rounded to 3 decimals
#[derive(Deserialize, Serialize, Debug, PartialEq)]
pub struct LeaderboardEntry {
    pub user_id: Uuid,
    pub login: String,
    pub win_ratio: f64,
    pub wins: u32,
    pub total: u32,
}

impl From<&LeaderStats> for LeaderboardEntry {
    fn from(stats: &LeaderStats) -> Self {
        LeaderboardEntry {
            user_id: stats.user_id,
            login: stats.login.clone(),
            win_ratio: (stats.win_ratio * 1000.0).round() / 1000.0,
            wins: stats.wins,
            total: stats.total,
        }
    }
}
