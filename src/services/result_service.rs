use uuid::Uuid;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::result::QuizResult;
use crate::storage::{BlobStorage, FileStorage};

pub const RESULTS_KEY: &str = "quiz_results";
/// Where an undecodable results blob is moved before a fresh log is started.
pub const CORRUPT_RESULTS_KEY: &str = "quiz_results_corrupt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// Saved after dropping this many of the oldest results.
    Trimmed { dropped: usize },
    /// Storage refused the write even after trimming; the result was not kept.
    Dropped,
}

/// Append-only log of results in one storage blob. Queries are full scans.
pub struct ResultStore {
    storage: Box<dyn BlobStorage>,
    max_results: usize,
}

impl ResultStore {
    pub fn new(storage: impl BlobStorage + 'static, max_results: usize) -> Self {
        Self {
            storage: Box::new(storage),
            max_results: max_results.max(1),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(FileStorage::new(&config.storage_dir), config.max_results)
    }

    /// Never fails; storage trouble is recovered locally and reported in the outcome.
    pub fn save(&mut self, result: &QuizResult) -> SaveOutcome {
        let Some(mut results) = self.read_for_append() else {
            tracing::error!(result_id = %result.id, "Stored results could not be read, result not saved");
            return SaveOutcome::Dropped;
        };
        results.push(result.clone());

        let mut dropped = 0;
        if results.len() > self.max_results {
            dropped = results.len() - self.max_results;
            results.drain(..dropped);
        }

        match self.write_log(&results) {
            Ok(()) => {
                tracing::info!(result_id = %result.id, quiz_id = %result.quiz_id, "Result saved");
                return if dropped > 0 {
                    SaveOutcome::Trimmed { dropped }
                } else {
                    SaveOutcome::Saved
                };
            }
            Err(e) => {
                tracing::warn!(error = ?e, "Saving result failed, dropping oldest entries and retrying");
            }
        }

        // Oldest half goes; the new result is always the last entry and survives.
        let cut = results.len() / 2;
        results.drain(..cut);
        dropped += cut;
        match self.write_log(&results) {
            Ok(()) => {
                tracing::warn!(result_id = %result.id, dropped, "Result saved after trimming");
                SaveOutcome::Trimmed { dropped }
            }
            Err(e) => {
                tracing::error!(error = ?e, result_id = %result.id, "Result could not be persisted");
                SaveOutcome::Dropped
            }
        }
    }

    /// Most recent first.
    pub fn load_all(&self) -> Vec<QuizResult> {
        let mut results = self.read_log();
        results.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        results
    }

    pub fn by_quiz(&self, quiz_id: &str) -> Vec<QuizResult> {
        self.load_all()
            .into_iter()
            .filter(|r| r.quiz_id == quiz_id)
            .collect()
    }

    pub fn by_user(&self, user_id: &str) -> Vec<QuizResult> {
        self.load_all()
            .into_iter()
            .filter(|r| r.user_id == user_id)
            .collect()
    }

    /// Highest percentage for the quiz/user pair; the first maximum wins ties.
    pub fn best(&self, quiz_id: &str, user_id: &str) -> Option<QuizResult> {
        let mut best: Option<QuizResult> = None;
        for result in self
            .load_all()
            .into_iter()
            .filter(|r| r.quiz_id == quiz_id && r.user_id == user_id)
        {
            match &best {
                Some(current) if current.percentage >= result.percentage => {}
                _ => best = Some(result),
            }
        }
        best
    }

    pub fn delete(&mut self, id: Uuid) -> Result<()> {
        let mut results = self.load_log()?;
        let before = results.len();
        results.retain(|r| r.id != id);
        if results.len() == before {
            return Err(Error::NotFound(format!("Result {} not found", id)));
        }
        self.write_log(&results)
    }

    pub fn clear_all(&mut self) -> Result<()> {
        self.storage.remove(RESULTS_KEY)?;
        Ok(())
    }

    fn load_log(&self) -> Result<Vec<QuizResult>> {
        match self.storage.get(RESULTS_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    /// Lenient read for queries.
    fn read_log(&self) -> Vec<QuizResult> {
        self.load_log().unwrap_or_else(|e| {
            tracing::warn!(error = ?e, "Could not read stored results, treating as empty");
            Vec::new()
        })
    }

    /// Existing log to append to. A failed read is retried once and then
    /// gives `None`, so the blob is never overwritten from a partial view.
    /// An undecodable blob is moved to [`CORRUPT_RESULTS_KEY`] first.
    fn read_for_append(&mut self) -> Option<Vec<QuizResult>> {
        let raw = match self.storage.get(RESULTS_KEY) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = ?e, "Reading stored results failed, retrying");
                match self.storage.get(RESULTS_KEY) {
                    Ok(raw) => raw,
                    Err(e) => {
                        tracing::error!(error = ?e, "Reading stored results failed again");
                        return None;
                    }
                }
            }
        };
        let Some(raw) = raw else {
            return Some(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(results) => Some(results),
            Err(e) => {
                tracing::warn!(error = ?e, backup_key = CORRUPT_RESULTS_KEY, "Stored results are unreadable, moving them aside");
                match self.storage.set(CORRUPT_RESULTS_KEY, &raw) {
                    Ok(()) => Some(Vec::new()),
                    Err(e) => {
                        tracing::error!(error = ?e, "Could not back up unreadable results");
                        None
                    }
                }
            }
        }
    }

    fn write_log(&mut self, results: &[QuizResult]) -> Result<()> {
        let raw = serde_json::to_string(results)?;
        self.storage.set(RESULTS_KEY, &raw)?;
        Ok(())
    }
}
