use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::answer::UserAnswer;
use crate::models::question::Question;
use crate::models::session::{QuizSession, SessionStatus};
use crate::services::grading_service::GradingService;

/// Pure transitions over [`QuizSession`]. Every call returns a new value;
/// once a session leaves `in_progress` every transition is refused.
pub struct SessionService;

impl SessionService {
    pub fn create(quiz_id: &str, time_limit: u32, now: DateTime<Utc>) -> QuizSession {
        QuizSession {
            id: Uuid::new_v4(),
            quiz_id: quiz_id.to_string(),
            started_at: now,
            current_question_index: 0,
            answers: Vec::new(),
            time_remaining: time_limit,
            status: SessionStatus::InProgress,
        }
    }

    pub fn submit_answer(
        session: &QuizSession,
        question: &Question,
        selected_options: Vec<String>,
        text_answer: Option<String>,
        time_taken: u32,
        now: DateTime<Utc>,
    ) -> Result<QuizSession> {
        Self::ensure_in_progress(session)?;

        let is_correct = GradingService::is_correct(question, &selected_options, text_answer.as_deref());
        let mut next = session.clone();
        next.answers.push(UserAnswer {
            question_id: question.id.clone(),
            selected_options,
            text_answer,
            is_correct,
            timestamp: now,
            time_taken,
        });
        next.current_question_index += 1;
        Ok(next)
    }

    /// An empty response, which every grading rule scores as wrong.
    pub fn skip_question(
        session: &QuizSession,
        question: &Question,
        time_taken: u32,
        now: DateTime<Utc>,
    ) -> Result<QuizSession> {
        Self::submit_answer(session, question, Vec::new(), None, time_taken, now)
    }

    pub fn has_more_questions(session: &QuizSession, total_questions: usize) -> bool {
        session.current_question_index < total_questions
    }

    pub fn mark_completed(session: &QuizSession) -> Result<QuizSession> {
        Self::transition(session, SessionStatus::Completed)
    }

    pub fn timeout_session(session: &QuizSession) -> Result<QuizSession> {
        let mut next = Self::transition(session, SessionStatus::TimedOut)?;
        next.time_remaining = 0;
        Ok(next)
    }

    /// Mirrors the quiz timer into the session while it is live.
    pub fn sync_time_remaining(session: &mut QuizSession, time_remaining: u32) {
        if session.is_in_progress() {
            session.time_remaining = time_remaining;
        }
    }

    fn transition(session: &QuizSession, status: SessionStatus) -> Result<QuizSession> {
        Self::ensure_in_progress(session)?;
        let mut next = session.clone();
        next.status = status;
        Ok(next)
    }

    fn ensure_in_progress(session: &QuizSession) -> Result<()> {
        if session.status.is_terminal() {
            return Err(Error::SessionNotActive {
                status: session.status,
            });
        }
        Ok(())
    }
}
