use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One submitted response. Written once, in question order, never edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAnswer {
    pub question_id: String,
    pub selected_options: Vec<String>,
    pub text_answer: Option<String>,
    pub is_correct: bool,
    pub timestamp: DateTime<Utc>,
    /// Seconds spent on this question.
    pub time_taken: u32,
}
