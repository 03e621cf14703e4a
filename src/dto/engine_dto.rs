use serde::{Deserialize, Serialize};

use crate::services::scoring_service::ScoringService;
use crate::services::timer_service::CountdownTimer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
    pub percentage: u32,
}

impl Progress {
    pub fn new(current: usize, total: usize) -> Self {
        let percentage = ScoringService::percentage(
            u32::try_from(current).unwrap_or(u32::MAX),
            u32::try_from(total).unwrap_or(u32::MAX),
        );
        Self {
            current,
            total,
            percentage,
        }
    }
}

/// Read-only view of a timer for presentation code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub time_remaining: u32,
    pub is_running: bool,
    pub is_expired: bool,
    pub formatted: String,
}

impl From<&CountdownTimer> for TimerSnapshot {
    fn from(timer: &CountdownTimer) -> Self {
        Self {
            time_remaining: timer.time_remaining(),
            is_running: timer.is_running(),
            is_expired: timer.is_expired(),
            formatted: timer.formatted(),
        }
    }
}
