// src/models/score.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'scores' table in the database.
/// One row per completed quiz attempt; never mutated after insert.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ScoreRecord {
    pub id: i64,
    pub user_id: i64,
    pub category: String,
    pub score: i64,
    pub total_questions: i64,
    /// Integer percentage, 0..=100.
    pub accuracy: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// One leaderboard row, joined from `scores` and `users`. Exposes the
/// display name only, no internal identifiers.
#[derive(Debug, Serialize, FromRow)]
pub struct LeaderboardEntry {
    pub username: String,
    pub score: i64,
    pub accuracy: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for submitting a completed quiz result.
/// Field types are enforced by serde before validation runs, so a
/// non-numeric score never reaches the store.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitScoreRequest {
    #[serde(default = "default_category")]
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    #[validate(range(min = 0))]
    pub score: i64,
    #[validate(range(min = 1))]
    pub total_questions: i64,
    #[validate(range(min = 0, max = 100))]
    pub accuracy: i64,
}

fn default_category() -> String {
    "random".to_string()
}

/// Response after a successful score submission. `best_score` reflects
/// the ratchet after this submission was applied.
#[derive(Debug, Serialize)]
pub struct SubmitScoreResponse {
    pub message: String,
    pub best_score: i64,
    pub score: ScoreRecord,
}

/// Query parameters for the public leaderboard.
#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub category: Option<String>,
    pub limit: Option<i64>,
}

/// Query parameters for the caller's own score history.
#[derive(Debug, Deserialize)]
pub struct ScoreHistoryQuery {
    pub category: Option<String>,
}
