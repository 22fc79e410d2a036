use std::time::{Duration, Instant};

/// How long a notification stays in the footer.
pub const STATUS_TTL: Duration = Duration::from_secs(4);

/// Footer message that clears itself once it has been shown for a while.
#[derive(Clone, Debug, Default)]
pub struct StatusLine {
    current: Option<(String, Instant)>,
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, message: String, now: Instant) {
        self.current = Some((message, now + STATUS_TTL));
    }

    /// Drop the message once it has expired.
    pub fn tick(&mut self, now: Instant) {
        if let Some((_, expires)) = &self.current
            && now >= *expires
        {
            self.current = None;
        }
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn message(&self) -> Option<&str> {
        self.current.as_ref().map(|(msg, _)| msg.as_str())
    }
}
