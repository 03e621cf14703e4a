use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_question_shape", skip_on_field_errors = false))]
pub struct Question {
    #[validate(length(min = 1))]
    pub id: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub content: String,
    #[serde(default)]
    pub options: Vec<QuestionOption>,
    #[serde(default)]
    pub correct_answer: Option<String>,
    #[validate(range(min = 1))]
    pub points: u32,
    /// Per-question limit in seconds; `None` or 0 means no limit.
    #[serde(default)]
    pub time_limit: Option<u32>,
    #[serde(default)]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    SingleChoice,
    MultipleChoice,
    TextInput,
    /// Anything the content loader produced that the engine cannot grade.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOption {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

impl Question {
    pub fn limit_seconds(&self) -> u32 {
        self.time_limit.unwrap_or(0)
    }

    pub fn has_time_limit(&self) -> bool {
        self.limit_seconds() > 0
    }

    pub fn correct_option_ids(&self) -> HashSet<&str> {
        self.options
            .iter()
            .filter(|o| o.is_correct)
            .map(|o| o.id.as_str())
            .collect()
    }
}

fn validate_question_shape(q: &Question) -> Result<(), ValidationError> {
    match q.question_type {
        QuestionType::SingleChoice | QuestionType::MultipleChoice => {
            if q.options.len() < 2 {
                return Err(ValidationError::new("too_few_options"));
            }
            let mut seen = HashSet::new();
            if !q.options.iter().all(|o| seen.insert(o.id.as_str())) {
                return Err(ValidationError::new("duplicate_option_id"));
            }
            let correct = q.options.iter().filter(|o| o.is_correct).count();
            if correct == 0 {
                return Err(ValidationError::new("no_correct_option"));
            }
            if q.question_type == QuestionType::SingleChoice && correct != 1 {
                return Err(ValidationError::new("single_choice_needs_one_correct"));
            }
            Ok(())
        }
        QuestionType::TextInput => match q.correct_answer.as_deref().map(str::trim) {
            Some(answer) if !answer.is_empty() => Ok(()),
            _ => Err(ValidationError::new("missing_correct_answer")),
        },
        QuestionType::Unknown => Err(ValidationError::new("unknown_question_type")),
    }
}
