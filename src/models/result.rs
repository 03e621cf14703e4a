use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::answer::UserAnswer;
use crate::models::session::SessionStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub id: Uuid,
    pub quiz_id: String,
    pub quiz_name: String,
    pub user_id: String,
    pub username: String,
    pub score: u32,
    pub max_score: u32,
    /// Whole percent, 0..=100.
    pub percentage: u32,
    pub correct_count: usize,
    pub total_questions: usize,
    /// Sum of per-answer seconds, not wall-clock duration.
    pub time_taken: u32,
    pub completed_at: DateTime<Utc>,
    pub status: SessionStatus,
    #[serde(default)]
    pub passed: Option<bool>,
    pub answers: Vec<UserAnswer>,
}

/// Who is taking the quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub user_id: String,
    pub username: String,
}

impl Participant {
    pub fn new(user_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
        }
    }
}

impl Default for Participant {
    fn default() -> Self {
        Self::new("guest", "Guest")
    }
}
