use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::question::Question;
use crate::models::quiz::Quiz;
use crate::models::result::{Participant, QuizResult};
use crate::models::session::QuizSession;

pub struct ScoringService;

impl ScoringService {
    /// Aggregates a terminal session. `max_score` covers every supplied question,
    /// answered or not.
    pub fn calculate_result(
        session: &QuizSession,
        quiz: &Quiz,
        questions: &[Question],
        participant: &Participant,
        locale: &str,
        completed_at: DateTime<Utc>,
    ) -> QuizResult {
        let points_by_id: HashMap<&str, u32> = questions
            .iter()
            .map(|q| (q.id.as_str(), q.points))
            .collect();

        let mut score: u32 = 0;
        let mut correct_count = 0;
        let mut time_taken: u32 = 0;
        for answer in &session.answers {
            time_taken = time_taken.saturating_add(answer.time_taken);
            if !answer.is_correct {
                continue;
            }
            correct_count += 1;
            match points_by_id.get(answer.question_id.as_str()) {
                Some(points) => score = score.saturating_add(*points),
                None => tracing::warn!(
                    question_id = %answer.question_id,
                    session_id = %session.id,
                    "Answer does not match any question, ignoring its points"
                ),
            }
        }

        let max_score = questions
            .iter()
            .fold(0u32, |acc, q| acc.saturating_add(q.points));
        let percentage = Self::percentage(score, max_score);
        let passed = quiz.passing_score.map(|pass| percentage >= pass);

        QuizResult {
            id: Uuid::new_v4(),
            quiz_id: quiz.id.clone(),
            quiz_name: quiz.name.resolve(locale).to_string(),
            user_id: participant.user_id.clone(),
            username: participant.username.clone(),
            score,
            max_score,
            percentage,
            correct_count,
            total_questions: questions.len(),
            time_taken,
            completed_at,
            status: session.status,
            passed,
            answers: session.answers.clone(),
        }
    }

    /// `round(part / whole * 100)` with halves rounded up; 0 when `whole` is 0.
    pub fn percentage(part: u32, whole: u32) -> u32 {
        if whole == 0 {
            return 0;
        }
        let (part, whole) = (u64::from(part), u64::from(whole));
        let rounded = (part * 200 + whole) / (whole * 2);
        u32::try_from(rounded.min(100)).unwrap_or(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::answer::UserAnswer;
    use crate::models::question::QuestionType;
    use crate::models::quiz::LocalizedText;
    use crate::models::session::SessionStatus;

    fn question(id: &str, points: u32) -> Question {
        Question {
            id: id.into(),
            question_type: QuestionType::TextInput,
            content: "?".into(),
            options: vec![],
            correct_answer: Some("x".into()),
            points,
            time_limit: None,
            explanation: None,
        }
    }

    fn answer(question_id: &str, is_correct: bool, time_taken: u32) -> UserAnswer {
        UserAnswer {
            question_id: question_id.into(),
            selected_options: vec![],
            text_answer: None,
            is_correct,
            timestamp: Utc::now(),
            time_taken,
        }
    }

    fn quiz(passing_score: Option<u32>) -> Quiz {
        let mut name = LocalizedText::new("en", "Event Trivia");
        name.0.insert("ja".into(), "イベントクイズ".into());
        Quiz {
            id: "quiz-1".into(),
            name,
            description: LocalizedText::default(),
            time_limit: 0,
            question_ids: vec!["q1".into(), "q2".into(), "q3".into()],
            passing_score,
            shuffle_questions: false,
            shuffle_options: false,
        }
    }

    fn session(answers: Vec<UserAnswer>, status: SessionStatus) -> QuizSession {
        QuizSession {
            id: Uuid::new_v4(),
            quiz_id: "quiz-1".into(),
            started_at: Utc::now(),
            current_question_index: answers.len(),
            answers,
            time_remaining: 0,
            status,
        }
    }

    #[test]
    fn early_finish_keeps_full_denominator() {
        let questions = vec![question("q1", 10), question("q2", 20), question("q3", 15)];
        let s = session(
            vec![answer("q1", true, 3), answer("q2", true, 8)],
            SessionStatus::Completed,
        );
        let result = ScoringService::calculate_result(
            &s,
            &quiz(Some(70)),
            &questions,
            &Participant::default(),
            "ja",
            Utc::now(),
        );

        assert_eq!(result.score, 30);
        assert_eq!(result.max_score, 45);
        assert_eq!(result.percentage, 67);
        assert_eq!(result.correct_count, 2);
        assert_eq!(result.total_questions, 3);
        assert_eq!(result.time_taken, 11);
        assert_eq!(result.passed, Some(false));
        assert_eq!(result.quiz_name, "イベントクイズ");
        assert_eq!(result.status, SessionStatus::Completed);
    }

    #[test]
    fn unmatched_answers_add_no_points() {
        let questions = vec![question("q1", 10)];
        let s = session(
            vec![answer("q1", false, 1), answer("ghost", true, 1)],
            SessionStatus::TimedOut,
        );
        let result = ScoringService::calculate_result(
            &s,
            &quiz(None),
            &questions,
            &Participant::default(),
            "en",
            Utc::now(),
        );
        assert_eq!(result.score, 0);
        assert_eq!(result.percentage, 0);
        assert_eq!(result.passed, None);
        assert_eq!(result.status, SessionStatus::TimedOut);
    }

    #[test]
    fn percentage_rounds_half_up_and_handles_zero() {
        assert_eq!(ScoringService::percentage(0, 0), 0);
        assert_eq!(ScoringService::percentage(1, 8), 13);
        assert_eq!(ScoringService::percentage(1, 3), 33);
        assert_eq!(ScoringService::percentage(2, 3), 67);
        assert_eq!(ScoringService::percentage(1, 200), 1);
        assert_eq!(ScoringService::percentage(45, 45), 100);
        assert_eq!(ScoringService::percentage(50, 45), 100);
    }
}
