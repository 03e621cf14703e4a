use crate::models::session::SessionStatus;
use crate::storage::StorageError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Quiz not found: {0}")]
    QuizNotFound(String),

    #[error("No questions available for quiz {0}")]
    NoQuestions(String),

    #[error("No session has been started")]
    NoSession,

    #[error("Session is no longer in progress (status: {status})")]
    SessionNotActive { status: SessionStatus },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Errors a caller is expected to show to the user. Everything else is a
    /// programming or environment problem the engine degrades around.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Error::QuizNotFound(_) | Error::NoQuestions(_))
    }
}
