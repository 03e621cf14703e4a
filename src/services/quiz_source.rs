use std::collections::HashMap;

use crate::dto::bundle_dto::QuizBundle;
use crate::error::Result;
use crate::models::question::Question;
use crate::models::quiz::Quiz;

/// Read-only access to already-parsed content. The engine never loads or
/// caches content itself.
pub trait QuizSource {
    fn quiz(&self, quiz_id: &str) -> Option<Quiz>;

    /// The quiz's questions in `question_ids` order.
    fn questions(&self, quiz: &Quiz) -> Vec<Question>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    quizzes: Vec<Quiz>,
    questions: HashMap<String, Question>,
}

impl InMemorySource {
    pub fn from_bundle(bundle: QuizBundle) -> Self {
        let questions = bundle
            .questions
            .into_iter()
            .map(|q| (q.id.clone(), q))
            .collect();
        Self {
            quizzes: bundle.quizzes,
            questions,
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let bundle: QuizBundle = serde_json::from_str(raw)?;
        Ok(Self::from_bundle(bundle))
    }

    pub fn quiz_ids(&self) -> Vec<&str> {
        self.quizzes.iter().map(|q| q.id.as_str()).collect()
    }
}

impl QuizSource for InMemorySource {
    fn quiz(&self, quiz_id: &str) -> Option<Quiz> {
        self.quizzes.iter().find(|q| q.id == quiz_id).cloned()
    }

    fn questions(&self, quiz: &Quiz) -> Vec<Question> {
        quiz.question_ids
            .iter()
            .filter_map(|id| {
                let found = self.questions.get(id).cloned();
                if found.is_none() {
                    tracing::warn!(quiz_id = %quiz.id, question_id = %id, "Quiz references a missing question");
                }
                found
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUNDLE: &str = r#"{
        "quizzes": [
            {"id": "events", "name": {"en": "Events"}, "timeLimit": 60, "questionIds": ["q2", "gone", "q1"]}
        ],
        "questions": [
            {"id": "q1", "type": "text_input", "content": "Who?", "correctAnswer": "Mika", "points": 5},
            {"id": "q2", "type": "single_choice", "content": "When?", "points": 10,
             "options": [{"id": "a", "text": "Spring", "isCorrect": true}, {"id": "b", "text": "Fall"}]}
        ]
    }"#;

    #[test]
    fn resolves_questions_in_quiz_order_skipping_missing() {
        let source = InMemorySource::from_json_str(BUNDLE).unwrap();
        let quiz = source.quiz("events").unwrap();
        let ids: Vec<String> = source.questions(&quiz).into_iter().map(|q| q.id).collect();
        assert_eq!(ids, vec!["q2", "q1"]);
        assert!(source.quiz("characters").is_none());
        assert_eq!(source.quiz_ids(), vec!["events"]);
    }

    #[test]
    fn demo_bundle_is_well_formed() {
        let source = InMemorySource::from_json_str(include_str!("../../demos/events_quiz.json")).unwrap();
        let quiz = source.quiz("events-basics").unwrap();
        let questions = source.questions(&quiz);
        assert_eq!(questions.len(), 3);
        assert!(questions
            .iter()
            .all(|q| crate::utils::validation::integrity_issues(q).is_empty()));
    }
}
