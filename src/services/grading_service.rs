use crate::models::question::{Question, QuestionType};
use std::collections::HashSet;

pub struct GradingService;

impl GradingService {
    /// Decides whether a response is correct for the question's type.
    /// Malformed questions grade as incorrect and are logged, never raised.
    pub fn is_correct(question: &Question, selected: &[String], text_answer: Option<&str>) -> bool {
        match question.question_type {
            QuestionType::SingleChoice => Self::grade_single_choice(question, selected),
            QuestionType::MultipleChoice => Self::grade_multiple_choice(question, selected),
            QuestionType::TextInput => Self::grade_text_input(question, text_answer),
            QuestionType::Unknown => {
                tracing::warn!(
                    question_id = %question.id,
                    "Unrecognized question type, grading as incorrect"
                );
                false
            }
        }
    }

    pub fn grade_single_choice(question: &Question, selected: &[String]) -> bool {
        let [only] = selected else {
            return false;
        };
        question
            .options
            .iter()
            .any(|o| o.id == *only && o.is_correct)
    }

    pub fn grade_multiple_choice(question: &Question, selected: &[String]) -> bool {
        let correct = question.correct_option_ids();
        if correct.is_empty() {
            tracing::warn!(
                question_id = %question.id,
                "Multiple choice question has no correct option"
            );
            return false;
        }
        let chosen: HashSet<&str> = selected.iter().map(String::as_str).collect();
        chosen == correct
    }

    pub fn grade_text_input(question: &Question, text_answer: Option<&str>) -> bool {
        let Some(expected) = question
            .correct_answer
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        else {
            tracing::warn!(
                question_id = %question.id,
                "Text question has no correct answer"
            );
            return false;
        };
        match text_answer {
            Some(given) if !given.trim().is_empty() => normalize(given) == normalize(expected),
            _ => false,
        }
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}
