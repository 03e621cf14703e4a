pub mod config;
pub mod dto;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;

pub use crate::error::{Error, Result};
pub use crate::services::{
    engine_service::{NoopListener, QuizEngine, SessionListener},
    quiz_source::{InMemorySource, QuizSource},
    result_service::{ResultStore, SaveOutcome},
    runner_service::Command,
};
