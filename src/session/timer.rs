use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerStatus {
    Idle,
    Running,
    Stopped,
}

/// Start/stop bookkeeping for one attempt. The repeating tick itself comes
/// from the event loop; the timer only says whether ticks should be
/// honoured and how much time has passed.
#[derive(Clone, Debug)]
pub struct SessionTimer {
    status: TimerStatus,
    started_at: Option<Instant>,
    stopped_at: Option<Instant>,
}

impl Default for SessionTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionTimer {
    pub fn new() -> Self {
        Self {
            status: TimerStatus::Idle,
            started_at: None,
            stopped_at: None,
        }
    }

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    /// No-op while already running.
    pub fn start(&mut self, now: Instant) {
        if self.is_running() {
            return;
        }
        self.status = TimerStatus::Running;
        self.started_at = Some(now);
        self.stopped_at = None;
    }

    /// No-op unless running.
    pub fn stop(&mut self, now: Instant) {
        if !self.is_running() {
            return;
        }
        self.status = TimerStatus::Stopped;
        self.stopped_at = Some(now);
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        match (self.started_at, self.stopped_at) {
            (Some(start), Some(end)) => end.saturating_duration_since(start),
            (Some(start), None) => now.saturating_duration_since(start),
            _ => Duration::ZERO,
        }
    }
}
