use anyhow::Context;
use quiz_engine::{
    config::{get_config, init_config, LogFormat},
    models::{
        question::{Question, QuestionType},
        result::{Participant, QuizResult},
    },
    services::runner_service,
    utils::time::{format_clock, to_rfc3339},
    Command, InMemorySource, QuizEngine, ResultStore, SessionListener,
};
use std::io::BufRead;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

struct ConsoleListener;

impl SessionListener for ConsoleListener {
    fn on_question(&mut self, index: usize, question: &Question) {
        println!();
        println!("[{}] {}", index + 1, question.content);
        for option in &question.options {
            println!("  {}) {}", option.id, option.text);
        }
        match question.question_type {
            QuestionType::TextInput => println!("  (type your answer)"),
            QuestionType::MultipleChoice => println!("  (one or more ids, comma separated)"),
            _ => {}
        }
        if question.has_time_limit() {
            println!("  time limit: {}", format_clock(question.limit_seconds()));
        }
    }

    fn on_question_timeout(&mut self, index: usize) {
        println!("Time is up for question {}.", index + 1);
    }

    fn on_timeout(&mut self) {
        println!("Quiz time is up!");
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

fn print_result(result: &QuizResult, best: Option<&QuizResult>) {
    println!();
    println!("== {} ==", result.quiz_name);
    println!("Status:     {}", result.status);
    println!("Score:      {}/{} ({}%)", result.score, result.max_score, result.percentage);
    println!("Correct:    {}/{}", result.correct_count, result.total_questions);
    println!("Time taken: {}", format_clock(result.time_taken));
    if let Some(passed) = result.passed {
        println!("Passed:     {}", if passed { "yes" } else { "no" });
    }
    println!("Completed:  {}", to_rfc3339(result.completed_at));
    if let Some(best) = best {
        println!("Best so far: {}%", best.percentage);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_config()?;
    let config = get_config();
    init_tracing(config.log_format);

    let mut args = std::env::args().skip(1);
    let bundle_path = args
        .next()
        .context("usage: quiz-engine <bundle.json> [quiz-id] [username]")?;
    let raw = tokio::fs::read_to_string(&bundle_path)
        .await
        .with_context(|| format!("reading {}", bundle_path))?;
    let source = InMemorySource::from_json_str(&raw)?;

    let quiz_id = match args.next() {
        Some(id) => id,
        None => source
            .quiz_ids()
            .first()
            .map(|id| id.to_string())
            .context("bundle contains no quizzes")?,
    };
    let username = args.next().unwrap_or_else(|| "Guest".to_string());
    let participant = Participant::new(username.to_lowercase(), username);

    let mut engine = QuizEngine::from_source(&source, &quiz_id, ResultStore::from_config(config))?
        .with_listener(ConsoleListener)
        .with_participant(participant.clone())
        .with_locale(config.locale.clone());

    println!(
        "{} (answer, `skip` or `finish`)",
        engine.quiz().name.resolve(&config.locale)
    );
    if engine.quiz().has_time_limit() {
        println!("Quiz time limit: {}", format_clock(engine.quiz().time_limit));
    }
    engine.start_session()?;

    let (tx, rx) = mpsc::channel(16);
    // Plain thread: a blocked stdin read must not hold up runtime shutdown.
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    tracing::error!(error = ?e, "Reading stdin failed");
                    break;
                }
            };
            let command = match line.trim() {
                "" => continue,
                "skip" => Command::Skip,
                "finish" => Command::Finish,
                _ => Command::Respond(line),
            };
            if tx.blocking_send(command).is_err() {
                break;
            }
        }
    });

    let engine = runner_service::run(engine, rx, Duration::from_millis(config.tick_interval_ms)).await;

    if let Some(result) = engine.result() {
        let best = engine
            .result_store()
            .best(&result.quiz_id, &participant.user_id);
        print_result(result, best.as_ref());
    }

    Ok(())
}
