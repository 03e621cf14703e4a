use std::fmt;

use crate::utils::time::format_clock;

pub type TickCallback = Box<dyn FnMut(u32) + Send>;
pub type ExpireCallback = Box<dyn FnMut() + Send>;

/// What a single pumped tick did to a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running; nothing changed.
    Idle,
    /// Decremented, with the new remaining value.
    Ticked(u32),
    /// Decremented to zero on this tick.
    Expired,
}

/// Second-granularity countdown. It does not own a clock: something else
/// calls [`CountdownTimer::tick`] once per second.
pub struct CountdownTimer {
    initial_time: u32,
    time_remaining: u32,
    is_running: bool,
    is_expired: bool,
    on_tick: Option<TickCallback>,
    on_expire: Option<ExpireCallback>,
}

impl CountdownTimer {
    pub fn new(initial_time: u32) -> Self {
        Self {
            initial_time,
            time_remaining: initial_time,
            is_running: false,
            is_expired: false,
            on_tick: None,
            on_expire: None,
        }
    }

    pub fn on_tick(mut self, callback: impl FnMut(u32) + Send + 'static) -> Self {
        self.on_tick = Some(Box::new(callback));
        self
    }

    pub fn on_expire(mut self, callback: impl FnMut() + Send + 'static) -> Self {
        self.on_expire = Some(Box::new(callback));
        self
    }

    pub fn start(&mut self) {
        if self.is_expired || self.time_remaining == 0 {
            return;
        }
        self.is_running = true;
    }

    pub fn pause(&mut self) {
        self.is_running = false;
    }

    /// Stops the timer and clears expiry. `None` restores the configured initial time.
    pub fn reset(&mut self, new_time: Option<u32>) {
        self.is_running = false;
        self.is_expired = false;
        self.time_remaining = new_time.unwrap_or(self.initial_time);
    }

    pub fn tick(&mut self) -> TickOutcome {
        if !self.is_running || self.is_expired || self.time_remaining == 0 {
            return TickOutcome::Idle;
        }

        self.time_remaining -= 1;
        if let Some(cb) = self.on_tick.as_mut() {
            cb(self.time_remaining);
        }

        if self.time_remaining == 0 {
            self.is_running = false;
            self.is_expired = true;
            if let Some(cb) = self.on_expire.as_mut() {
                cb();
            }
            return TickOutcome::Expired;
        }

        TickOutcome::Ticked(self.time_remaining)
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired
    }

    pub fn formatted(&self) -> String {
        format_clock(self.time_remaining)
    }
}

impl fmt::Debug for CountdownTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CountdownTimer")
            .field("initial_time", &self.initial_time)
            .field("time_remaining", &self.time_remaining)
            .field("is_running", &self.is_running)
            .field("is_expired", &self.is_expired)
            .finish_non_exhaustive()
    }
}
