use std::cell::RefCell;
use std::collections::VecDeque;

use log::{error, info};

use crate::engine::progression::LevelCompleted;

#[derive(Clone, Debug, PartialEq)]
pub enum Notification {
    LevelCompleted(LevelCompleted),
    Error(String),
}

impl Notification {
    pub fn message(&self) -> String {
        match self {
            Notification::LevelCompleted(e) => format!(
                "Level {} complete! Best {:.0} wpm. Level {} target: {:.0} wpm",
                e.completed_level, e.best_wpm, e.next_level, e.next_level_wpm_target
            ),
            Notification::Error(msg) => format!("Error: {msg}"),
        }
    }
}

/// Fire-and-forget delivery; senders never learn whether anyone saw it.
pub trait NotificationSink {
    fn notify(&self, notification: Notification);
}

pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&self, notification: Notification) {
        match &notification {
            Notification::LevelCompleted(_) => info!("{}", notification.message()),
            Notification::Error(_) => error!("{}", notification.message()),
        }
    }
}

/// Keeps notifications until the UI drains them into its status line.
#[derive(Default)]
pub struct QueueSink {
    queue: RefCell<VecDeque<Notification>>,
}

impl QueueSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pop(&self) -> Option<Notification> {
        self.queue.borrow_mut().pop_front()
    }

    pub fn drain(&self) -> Vec<Notification> {
        self.queue.borrow_mut().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }
}

impl NotificationSink for QueueSink {
    fn notify(&self, notification: Notification) {
        self.queue.borrow_mut().push_back(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level_up() -> Notification {
        Notification::LevelCompleted(LevelCompleted {
            completed_level: 2,
            best_wpm: 61.4,
            next_level: 3,
            next_level_wpm_target: 43.0,
        })
    }

    #[test]
    fn test_queue_sink_is_fifo() {
        let sink = QueueSink::new();
        sink.notify(level_up());
        sink.notify(Notification::Error("disk full".to_string()));
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.pop(), Some(level_up()));
        assert_eq!(sink.drain(), vec![Notification::Error("disk full".to_string())]);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_level_completed_message() {
        assert_eq!(
            level_up().message(),
            "Level 2 complete! Best 61 wpm. Level 3 target: 43 wpm"
        );
    }
}
