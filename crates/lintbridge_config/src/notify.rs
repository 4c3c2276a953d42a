//! Sinks for non-fatal problems found while loading a configuration.

use parking_lot::Mutex;
use tracing::{error, warn};

/// Receives warnings and errors that do not abort loading.
pub trait Notifier: Send + Sync {
    /// Reports a recoverable problem.
    fn warn(&self, message: &str);

    /// Reports a failure that left part of the configuration unresolved.
    fn error(&self, message: &str);
}

/// Forwards notifications to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn warn(&self, message: &str) {
        warn!("{}", message);
    }

    fn error(&self, message: &str) {
        error!("{}", message);
    }
}

/// Severity of a collected notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Warning,
    Error,
}

/// Keeps notifications in memory, e.g. to show them after loading.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    notices: Mutex<Vec<(NoticeLevel, String)>>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything collected so far.
    pub fn notices(&self) -> Vec<(NoticeLevel, String)> {
        self.notices.lock().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.of_level(NoticeLevel::Warning)
    }

    pub fn errors(&self) -> Vec<String> {
        self.of_level(NoticeLevel::Error)
    }

    fn of_level(&self, level: NoticeLevel) -> Vec<String> {
        self.notices
            .lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, message)| message.clone())
            .collect()
    }
}

impl Notifier for CollectingNotifier {
    fn warn(&self, message: &str) {
        self.notices
            .lock()
            .push((NoticeLevel::Warning, message.to_string()));
    }

    fn error(&self, message: &str) {
        self.notices
            .lock()
            .push((NoticeLevel::Error, message.to_string()));
    }
}
