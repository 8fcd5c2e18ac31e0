//! Fixed-cadence step scheduling
//!
//! The scheduler behaves like a single-shot timer that is re-armed after
//! every step finishes: the next step is due one interval after the previous
//! one *completed*. A slow step therefore stretches the period instead of
//! queueing overlapping steps, and at most one step is ever in flight.
//!
//! It does not own the step itself. Callers check `is_due`, run their step,
//! then call `rearm`; calling `stop` at any point before `rearm` (including
//! from inside the step) cancels every further step.

use log::debug;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct FrameScheduler {
    interval: Duration,
    next_due: Option<Instant>,
    stopped: bool,
    steps: u64,
}

impl FrameScheduler {
    /// Stopped scheduler stepping every `interval` once started
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
            stopped: true,
            steps: 0,
        }
    }

    /// Arms the first step to run immediately
    pub fn start(&mut self, now: Instant) {
        debug!("Frame scheduler started at {:?} interval", self.interval);
        self.stopped = false;
        self.next_due = Some(now);
    }

    /// Cancels every step that has not started yet
    pub fn stop(&mut self) {
        if !self.stopped {
            debug!("Frame scheduler stopped after {} steps", self.steps);
        }
        self.stopped = true;
        self.next_due = None;
    }

    pub fn is_running(&self) -> bool {
        !self.stopped
    }

    /// Whether a step should run at `now`
    pub fn is_due(&self, now: Instant) -> bool {
        matches!(self.next_due, Some(due) if !self.stopped && now >= due)
    }

    /// Records a finished step and arms the next one unless stopped
    pub fn rearm(&mut self, finished_at: Instant) {
        self.steps += 1;
        if self.stopped {
            self.next_due = None;
            return;
        }
        self.next_due = Some(finished_at + self.interval);
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.next_due
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Steps completed since creation
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Sleeps until the next step is due. Never resolves while stopped.
    pub async fn wait_due(&self) {
        match self.next_due {
            Some(due) if !self.stopped => tokio::time::sleep_until(due).await,
            _ => std::future::pending().await,
        }
    }
}
