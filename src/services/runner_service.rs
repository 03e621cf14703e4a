use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::models::question::{Question, QuestionType};
use crate::services::engine_service::QuizEngine;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Raw user input, interpreted against the current question.
    Respond(String),
    Submit {
        selected: Vec<String>,
        text: Option<String>,
    },
    Skip,
    Finish,
}

/// Splits raw input into option ids or free text depending on the question.
pub fn parse_response(question: &Question, input: &str) -> (Vec<String>, Option<String>) {
    match question.question_type {
        QuestionType::TextInput => (Vec::new(), Some(input.to_string())),
        _ => {
            let selected = input
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect();
            (selected, None)
        }
    }
}

/// Pumps `engine.tick()` every `period` and applies commands until the
/// session is no longer in progress. A closed channel finishes the quiz.
/// The engine must already have a started session.
pub async fn run(
    mut engine: QuizEngine,
    mut commands: mpsc::Receiver<Command>,
    period: Duration,
) -> QuizEngine {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    while engine.is_in_progress() {
        tokio::select! {
            _ = ticker.tick() => engine.tick(),
            command = commands.recv() => match command {
                Some(command) => apply(&mut engine, command),
                None => {
                    tracing::info!("Command channel closed, finishing quiz");
                    if let Err(e) = engine.finish_quiz() {
                        tracing::warn!(error = ?e, "Could not finish quiz");
                    }
                }
            },
        }
    }

    engine
}

fn apply(engine: &mut QuizEngine, command: Command) {
    let outcome = match command {
        Command::Respond(input) => match engine.current_question() {
            Some(question) => {
                let (selected, text) = parse_response(question, input.trim_end_matches(&['\r', '\n'][..]));
                engine.submit_answer(selected, text)
            }
            None => Ok(()),
        },
        Command::Submit { selected, text } => engine.submit_answer(selected, text),
        Command::Skip => engine.skip_question(),
        Command::Finish => engine.finish_quiz().map(|_| ()),
    };
    if let Err(e) = outcome {
        tracing::warn!(error = ?e, "Command rejected");
    }
}
