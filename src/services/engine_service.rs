use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::Arc;

use crate::dto::engine_dto::{Progress, TimerSnapshot};
use crate::error::{Error, Result};
use crate::models::question::Question;
use crate::models::quiz::{Quiz, FALLBACK_LOCALE};
use crate::models::result::{Participant, QuizResult};
use crate::models::session::{QuizSession, SessionStatus};
use crate::services::quiz_source::QuizSource;
use crate::services::result_service::{ResultStore, SaveOutcome};
use crate::services::scoring_service::ScoringService;
use crate::services::session_service::SessionService;
use crate::services::timer_service::{CountdownTimer, TickOutcome};
use crate::utils::time::{elapsed_seconds, Clock, SystemClock};
use crate::utils::validation::integrity_issues;

/// Notifications from a running session. Every hook defaults to a no-op.
pub trait SessionListener: Send {
    fn on_change(&mut self, _progress: &Progress) {}
    fn on_question(&mut self, _index: usize, _question: &Question) {}
    fn on_question_timeout(&mut self, _index: usize) {}
    fn on_timeout(&mut self) {}
    fn on_complete(&mut self, _result: &QuizResult) {}
}

pub struct NoopListener;

impl SessionListener for NoopListener {}

/// Drives one quiz attempt at a time: owns the session, both timers and the
/// result store, and turns timer expiry into session transitions.
pub struct QuizEngine {
    quiz: Quiz,
    source_questions: Vec<Question>,
    questions: Vec<Question>,
    participant: Participant,
    locale: String,
    seed: Option<u64>,
    session: Option<QuizSession>,
    quiz_timer: CountdownTimer,
    question_timer: CountdownTimer,
    question_started_at: DateTime<Utc>,
    // Single-fire guard for termination; cleared only by `start_session`.
    terminated: bool,
    result: Option<QuizResult>,
    store: ResultStore,
    clock: Arc<dyn Clock>,
    listener: Box<dyn SessionListener>,
}

impl QuizEngine {
    pub fn new(quiz: Quiz, questions: Vec<Question>, store: ResultStore) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let quiz_timer = CountdownTimer::new(quiz.time_limit);
        Self {
            quiz,
            questions: questions.clone(),
            source_questions: questions,
            participant: Participant::default(),
            locale: FALLBACK_LOCALE.to_string(),
            seed: None,
            session: None,
            quiz_timer,
            question_timer: CountdownTimer::new(0),
            question_started_at: clock.now(),
            terminated: false,
            result: None,
            store,
            clock,
            listener: Box::new(NoopListener),
        }
    }

    pub fn from_source(source: &impl QuizSource, quiz_id: &str, store: ResultStore) -> Result<Self> {
        let quiz = source
            .quiz(quiz_id)
            .ok_or_else(|| Error::QuizNotFound(quiz_id.to_string()))?;
        let questions = source.questions(&quiz);
        Ok(Self::new(quiz, questions, store))
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self.question_started_at = self.clock.now();
        self
    }

    pub fn with_listener(mut self, listener: impl SessionListener + 'static) -> Self {
        self.listener = Box::new(listener);
        self
    }

    pub fn with_participant(mut self, participant: Participant) -> Self {
        self.participant = participant;
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Fixes the shuffle order for quizzes that shuffle questions or options.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Starts a fresh attempt, discarding any previous session.
    pub fn start_session(&mut self) -> Result<&QuizSession> {
        if self.source_questions.is_empty() {
            tracing::warn!(quiz_id = %self.quiz.id, "Cannot start a quiz without questions");
            return Err(Error::NoQuestions(self.quiz.id.clone()));
        }
        if self.session.as_ref().is_some_and(QuizSession::is_in_progress) {
            tracing::info!(quiz_id = %self.quiz.id, "Restarting quiz, abandoning the live session");
        }

        self.report_integrity_issues();
        self.questions = self.arrange_questions();

        let now = self.clock.now();
        let session = SessionService::create(&self.quiz.id, self.quiz.time_limit, now);
        tracing::info!(
            session_id = %session.id,
            quiz_id = %self.quiz.id,
            questions = self.questions.len(),
            time_limit = self.quiz.time_limit,
            "Quiz session started"
        );

        self.terminated = false;
        self.result = None;
        self.session = Some(session);
        self.question_started_at = now;

        self.quiz_timer.reset(Some(self.quiz.time_limit));
        if self.quiz.has_time_limit() {
            self.quiz_timer.start();
        }
        self.arm_question_timer(0);

        self.announce_current_question();
        self.notify_change();
        self.session.as_ref().ok_or(Error::NoSession)
    }

    pub fn submit_answer(&mut self, selected_options: Vec<String>, text_answer: Option<String>) -> Result<()> {
        let session = self.session.as_ref().ok_or(Error::NoSession)?;
        if self.terminated || session.status.is_terminal() {
            return Err(Error::SessionNotActive {
                status: session.status,
            });
        }

        let index = session.current_question_index;
        let question = self
            .questions
            .get(index)
            .ok_or_else(|| Error::NotFound(format!("Question at index {}", index)))?;

        let now = self.clock.now();
        let time_taken = elapsed_seconds(self.question_started_at, now);
        let next = SessionService::submit_answer(session, question, selected_options, text_answer, time_taken, now)?;
        tracing::debug!(
            session_id = %next.id,
            question_id = %question.id,
            is_correct = next.answers.last().is_some_and(|a| a.is_correct),
            time_taken,
            "Answer recorded"
        );

        let has_more = SessionService::has_more_questions(&next, self.questions.len());
        let next_index = next.current_question_index;
        self.session = Some(next);

        if has_more {
            // Re-arm only after the index moved, so the old timer cannot hit the new question.
            self.question_started_at = now;
            self.arm_question_timer(next_index);
            self.announce_current_question();
            self.notify_change();
        } else {
            self.terminate(SessionStatus::Completed);
        }
        Ok(())
    }

    pub fn skip_question(&mut self) -> Result<()> {
        self.submit_answer(Vec::new(), None)
    }

    /// Ends the attempt now, scoring whatever has been answered.
    pub fn finish_quiz(&mut self) -> Result<QuizResult> {
        let session = self.session.as_ref().ok_or(Error::NoSession)?;
        let status = session.status;
        if self.terminated || status.is_terminal() {
            return Err(Error::SessionNotActive { status });
        }
        self.terminate(SessionStatus::Completed)
            .ok_or(Error::SessionNotActive { status })
    }

    /// Advances both timers by one second. Quiz expiry is handled first and
    /// ends the tick, so the question timer stays where the session stopped.
    pub fn tick(&mut self) {
        let live = self.session.as_ref().is_some_and(QuizSession::is_in_progress);
        if !live || self.terminated {
            return;
        }

        let quiz_outcome = self.quiz_timer.tick();
        if let Some(session) = self.session.as_mut() {
            SessionService::sync_time_remaining(session, self.quiz_timer.time_remaining());
        }
        if quiz_outcome == TickOutcome::Expired {
            self.handle_quiz_timeout();
            return;
        }
        if self.question_timer.tick() == TickOutcome::Expired {
            self.handle_question_timeout();
        }
    }

    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    /// Questions in the order this session presents them.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn session(&self) -> Option<&QuizSession> {
        self.session.as_ref()
    }

    pub fn status(&self) -> Option<SessionStatus> {
        self.session.as_ref().map(|s| s.status)
    }

    pub fn current_question(&self) -> Option<&Question> {
        let session = self.session.as_ref().filter(|s| s.is_in_progress())?;
        self.questions.get(session.current_question_index)
    }

    pub fn progress(&self) -> Progress {
        let current = self
            .session
            .as_ref()
            .map(|s| s.current_question_index)
            .unwrap_or(0);
        Progress::new(current, self.questions.len())
    }

    pub fn quiz_timer(&self) -> &CountdownTimer {
        &self.quiz_timer
    }

    pub fn question_timer(&self) -> &CountdownTimer {
        &self.question_timer
    }

    pub fn timers(&self) -> (TimerSnapshot, TimerSnapshot) {
        (
            TimerSnapshot::from(&self.quiz_timer),
            TimerSnapshot::from(&self.question_timer),
        )
    }

    pub fn is_in_progress(&self) -> bool {
        self.status() == Some(SessionStatus::InProgress)
    }

    /// True once the session has ended, by finishing or by timing out.
    pub fn is_completed(&self) -> bool {
        self.status().is_some_and(SessionStatus::is_terminal)
    }

    pub fn result(&self) -> Option<&QuizResult> {
        self.result.as_ref()
    }

    pub fn result_store(&self) -> &ResultStore {
        &self.store
    }

    fn handle_quiz_timeout(&mut self) {
        tracing::info!(quiz_id = %self.quiz.id, "Quiz time limit reached");
        self.terminate(SessionStatus::TimedOut);
    }

    fn handle_question_timeout(&mut self) {
        if self.terminated {
            tracing::debug!("Question timer expired after the session ended, ignoring");
            return;
        }
        let index = self.progress().current;
        tracing::info!(quiz_id = %self.quiz.id, question_index = index, "Question time limit reached, skipping");
        self.listener.on_question_timeout(index);
        if let Err(e) = self.skip_question() {
            tracing::warn!(error = ?e, "Automatic skip after question timeout failed");
        }
    }

    /// Moves the session to a terminal state, scores and persists it. Returns
    /// `None` if termination already happened.
    fn terminate(&mut self, status: SessionStatus) -> Option<QuizResult> {
        if self.terminated {
            tracing::debug!(?status, "Session already terminated, ignoring");
            return None;
        }
        let session = self.session.as_ref()?;
        let transitioned = match status {
            SessionStatus::TimedOut => SessionService::timeout_session(session),
            _ => SessionService::mark_completed(session),
        };
        let finished = match transitioned {
            Ok(finished) => finished,
            Err(e) => {
                tracing::warn!(error = ?e, "Refusing to terminate session");
                return None;
            }
        };

        self.terminated = true;
        self.quiz_timer.pause();
        self.question_timer.pause();

        let result = ScoringService::calculate_result(
            &finished,
            &self.quiz,
            &self.questions,
            &self.participant,
            &self.locale,
            self.clock.now(),
        );
        self.session = Some(finished);

        match self.store.save(&result) {
            SaveOutcome::Dropped => {
                tracing::warn!(result_id = %result.id, "Quiz finished but its result was not stored")
            }
            outcome => tracing::debug!(?outcome, "Result persisted"),
        }
        tracing::info!(
            result_id = %result.id,
            quiz_id = %result.quiz_id,
            status = %status,
            score = result.score,
            max_score = result.max_score,
            percentage = result.percentage,
            "Quiz session ended"
        );

        if status == SessionStatus::TimedOut {
            self.listener.on_timeout();
        }
        self.listener.on_complete(&result);
        self.result = Some(result.clone());
        self.notify_change();
        Some(result)
    }

    fn arm_question_timer(&mut self, index: usize) {
        let limit = self.questions.get(index).map(Question::limit_seconds).unwrap_or(0);
        // A zero reset leaves an unlimited question with a timer that cannot fire.
        self.question_timer.reset(Some(limit));
        if limit > 0 {
            self.question_timer.start();
        }
    }

    fn arrange_questions(&self) -> Vec<Question> {
        let mut questions = self.source_questions.clone();
        if !self.quiz.shuffle_questions && !self.quiz.shuffle_options {
            return questions;
        }
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        if self.quiz.shuffle_questions {
            questions.shuffle(&mut rng);
        }
        if self.quiz.shuffle_options {
            for question in &mut questions {
                question.options.shuffle(&mut rng);
            }
        }
        questions
    }

    fn report_integrity_issues(&self) {
        let quiz_issues = integrity_issues(&self.quiz);
        if !quiz_issues.is_empty() {
            tracing::warn!(quiz_id = %self.quiz.id, issues = ?quiz_issues, "Quiz failed validation");
        }
        for question in &self.source_questions {
            let issues = integrity_issues(question);
            if !issues.is_empty() {
                tracing::warn!(
                    quiz_id = %self.quiz.id,
                    question_id = %question.id,
                    issues = ?issues,
                    "Question failed validation, it may never grade as correct"
                );
            }
        }
    }

    fn announce_current_question(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let index = session.current_question_index;
        if let Some(question) = self.questions.get(index) {
            self.listener.on_question(index, question);
        }
    }

    fn notify_change(&mut self) {
        let progress = self.progress();
        self.listener.on_change(&progress);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::{QuestionOption, QuestionType};
    use crate::models::quiz::LocalizedText;
    use crate::storage::MemoryStorage;
    use crate::utils::time::ManualClock;

    fn question(id: &str, points: u32, time_limit: Option<u32>) -> Question {
        Question {
            id: id.into(),
            question_type: QuestionType::SingleChoice,
            content: format!("Question {}", id),
            options: vec![
                QuestionOption { id: "right".into(), text: "Right".into(), is_correct: true },
                QuestionOption { id: "wrong".into(), text: "Wrong".into(), is_correct: false },
            ],
            correct_answer: None,
            points,
            time_limit,
            explanation: None,
        }
    }

    fn engine(time_limit: u32, questions: Vec<Question>) -> (QuizEngine, ManualClock) {
        let quiz = Quiz {
            id: "quiz-1".into(),
            name: LocalizedText::new("en", "Quiz"),
            description: LocalizedText::default(),
            time_limit,
            question_ids: questions.iter().map(|q| q.id.clone()).collect(),
            passing_score: None,
            shuffle_questions: false,
            shuffle_options: false,
        };
        let clock = ManualClock::new(Utc::now());
        let store = ResultStore::new(MemoryStorage::new(), 10);
        let engine = QuizEngine::new(quiz, questions, store).with_clock(clock.clone());
        (engine, clock)
    }

    #[test]
    fn elapsed_time_is_measured_per_question() {
        let (mut engine, clock) = engine(0, vec![question("q1", 1, None), question("q2", 1, None)]);
        engine.start_session().unwrap();
        clock.advance(7);
        engine.submit_answer(vec!["right".into()], None).unwrap();
        clock.advance(3);
        engine.skip_question().unwrap();

        let result = engine.result().unwrap();
        let taken: Vec<u32> = result.answers.iter().map(|a| a.time_taken).collect();
        assert_eq!(taken, vec![7, 3]);
        assert_eq!(result.time_taken, 10);
    }

    #[test]
    fn unlimited_question_disarms_question_timer() {
        let (mut engine, _clock) = engine(0, vec![question("q1", 1, Some(5)), question("q2", 1, None)]);
        engine.start_session().unwrap();
        assert!(engine.question_timer().is_running());
        engine.tick();
        assert_eq!(engine.question_timer().time_remaining(), 4);

        engine.skip_question().unwrap();
        assert!(!engine.question_timer().is_running());
        for _ in 0..10 {
            engine.tick();
        }
        assert!(engine.is_in_progress());
        assert_eq!(engine.progress().current, 1);
    }

    #[test]
    fn seeded_shuffle_is_reproducible() {
        let questions: Vec<Question> = (0..6).map(|i| question(&format!("q{}", i), 1, None)).collect();
        let order = |seed: u64| {
            let (engine, _) = engine(0, questions.clone());
            let mut engine = engine.with_seed(seed);
            engine.quiz.shuffle_questions = true;
            engine.start_session().unwrap();
            engine.questions().iter().map(|q| q.id.clone()).collect::<Vec<_>>()
        };
        assert_eq!(order(7), order(7));
        let mut sorted = order(7);
        sorted.sort();
        assert_eq!(sorted, vec!["q0", "q1", "q2", "q3", "q4", "q5"]);
    }

    #[test]
    fn restart_clears_previous_result() {
        let (mut engine, _clock) = engine(0, vec![question("q1", 1, None)]);
        engine.start_session().unwrap();
        engine.finish_quiz().unwrap();
        assert!(engine.result().is_some());

        engine.start_session().unwrap();
        assert!(engine.result().is_none());
        assert!(engine.is_in_progress());
        engine.submit_answer(vec!["right".into()], None).unwrap();
        assert_eq!(engine.result().unwrap().score, 1);
        assert_eq!(engine.result_store().load_all().len(), 2);
    }
}
