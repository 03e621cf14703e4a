#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use quiz_engine::dto::engine_dto::Progress;
use quiz_engine::models::question::{Question, QuestionOption, QuestionType};
use quiz_engine::models::quiz::{LocalizedText, Quiz};
use quiz_engine::models::result::QuizResult;
use quiz_engine::storage::MemoryStorage;
use quiz_engine::utils::time::ManualClock;
use quiz_engine::{QuizEngine, ResultStore, SessionListener};

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Change(Progress),
    Question(usize, String),
    QuestionTimeout(usize),
    Timeout,
    Complete(QuizResult),
}

/// Listener that records every hook call; clones share the log.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<Event>>>,
}

impl Recorder {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.events().iter().filter(|e| pred(e)).count()
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

impl SessionListener for Recorder {
    fn on_change(&mut self, progress: &Progress) {
        self.push(Event::Change(*progress));
    }

    fn on_question(&mut self, index: usize, question: &Question) {
        self.push(Event::Question(index, question.id.clone()));
    }

    fn on_question_timeout(&mut self, index: usize) {
        self.push(Event::QuestionTimeout(index));
    }

    fn on_timeout(&mut self) {
        self.push(Event::Timeout);
    }

    fn on_complete(&mut self, result: &QuizResult) {
        self.push(Event::Complete(result.clone()));
    }
}

pub fn single_choice(id: &str, points: u32) -> Question {
    Question {
        id: id.to_string(),
        question_type: QuestionType::SingleChoice,
        content: format!("Which event is {}?", id),
        options: vec![
            QuestionOption { id: "A".into(), text: "Spring Festival".into(), is_correct: false },
            QuestionOption { id: "B".into(), text: "Summer Live".into(), is_correct: true },
            QuestionOption { id: "C".into(), text: "Winter Tour".into(), is_correct: false },
        ],
        correct_answer: None,
        points,
        time_limit: None,
        explanation: None,
    }
}

pub fn text_input(id: &str, points: u32, answer: &str) -> Question {
    Question {
        id: id.to_string(),
        question_type: QuestionType::TextInput,
        content: format!("Name the character in {}", id),
        options: vec![],
        correct_answer: Some(answer.to_string()),
        points,
        time_limit: None,
        explanation: None,
    }
}

pub fn quiz_for(questions: &[Question], time_limit: u32) -> Quiz {
    Quiz {
        id: "events-quiz".into(),
        name: LocalizedText::new("en", "Event Trivia"),
        description: LocalizedText::new("en", "How well do you know the events?"),
        time_limit,
        question_ids: questions.iter().map(|q| q.id.clone()).collect(),
        passing_score: None,
        shuffle_questions: false,
        shuffle_options: false,
    }
}

pub struct Harness {
    pub engine: QuizEngine,
    pub clock: ManualClock,
    pub recorder: Recorder,
    pub storage: MemoryStorage,
}

pub fn harness(questions: Vec<Question>, time_limit: u32) -> Harness {
    let quiz = quiz_for(&questions, time_limit);
    let clock = ManualClock::new(chrono::Utc::now());
    let recorder = Recorder::default();
    let storage = MemoryStorage::new();
    let engine = QuizEngine::new(quiz, questions, ResultStore::new(storage.clone(), 50))
        .with_clock(clock.clone())
        .with_listener(recorder.clone());
    Harness {
        engine,
        clock,
        recorder,
        storage,
    }
}

pub fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}
