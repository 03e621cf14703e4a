use serde::{Deserialize, Serialize};

use crate::models::question::Question;
use crate::models::quiz::Quiz;

/// Content as produced by the loaders: every quiz plus the question pool
/// their `questionIds` point into.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuizBundle {
    pub quizzes: Vec<Quiz>,
    #[serde(default)]
    pub questions: Vec<Question>,
}
