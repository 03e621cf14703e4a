use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::models::answer::UserAnswer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Completed,
    TimedOut,
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, SessionStatus::InProgress)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Completed => "completed",
            SessionStatus::TimedOut => "timed_out",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSession {
    pub id: Uuid,
    pub quiz_id: String,
    pub started_at: DateTime<Utc>,
    pub current_question_index: usize,
    pub answers: Vec<UserAnswer>,
    /// Mirror of the quiz timer.
    pub time_remaining: u32,
    pub status: SessionStatus,
}

impl QuizSession {
    pub fn is_in_progress(&self) -> bool {
        self.status == SessionStatus::InProgress
    }
}
