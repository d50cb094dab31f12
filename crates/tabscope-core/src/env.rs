//! Shared context passed to column accessors and sheet operations.

use std::cell::RefCell;
use std::collections::VecDeque;

use crate::options::Options;

/// Number of status messages kept for the history view.
pub const STATUS_HISTORY: usize = 100;

/// Number of error details kept for the diagnostic view.
pub const ERROR_HISTORY: usize = 10;

/// Options plus the status and error channels.
///
/// Accessors only get `&Env`, so both logs use interior mutability.
#[derive(Debug, Default)]
pub struct Env {
    pub options: Options,
    pub errors: ErrorLog,
    pub status: StatusLog,
}

impl Env {
    pub fn new(options: Options) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Report a one-line outcome on the status line.
    pub fn status(&self, msg: impl Into<String>) {
        self.status.push(msg);
    }
}

/// The most recent failures, oldest first.
#[derive(Debug, Default)]
pub struct ErrorLog {
    entries: RefCell<VecDeque<String>>,
}

impl ErrorLog {
    pub fn record(&self, detail: impl Into<String>) {
        let detail = detail.into();
        tracing::debug!(error = %detail, "recorded error");
        let mut entries = self.entries.borrow_mut();
        entries.push_back(detail);
        while entries.len() > ERROR_HISTORY {
            entries.pop_front();
        }
    }

    pub fn last(&self) -> Option<String> {
        self.entries.borrow().back().cloned()
    }

    pub fn all(&self) -> Vec<String> {
        self.entries.borrow().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

/// Messages for the next status line, plus a history of everything shown.
#[derive(Debug, Default)]
pub struct StatusLog {
    current: RefCell<Vec<String>>,
    history: RefCell<VecDeque<String>>,
}

impl StatusLog {
    pub fn push(&self, msg: impl Into<String>) {
        let msg = msg.into();
        self.current.borrow_mut().push(msg.clone());
        let mut history = self.history.borrow_mut();
        history.push_front(msg);
        history.truncate(STATUS_HISTORY);
    }

    /// Messages pending display, clearing them.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.current.borrow_mut())
    }

    /// History, most recent first.
    pub fn history(&self) -> Vec<String> {
        self.history.borrow().iter().cloned().collect()
    }

    /// The most recently shown message.
    pub fn latest(&self) -> Option<String> {
        self.history.borrow().front().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_log_keeps_most_recent() {
        let log = ErrorLog::default();
        for i in 0..15 {
            log.record(format!("e{}", i));
        }
        assert_eq!(log.len(), ERROR_HISTORY);
        assert_eq!(log.all()[0], "e5");
        assert_eq!(log.last().as_deref(), Some("e14"));
    }

    #[test]
    fn status_history_is_bounded_and_newest_first() {
        let status = StatusLog::default();
        for i in 0..120 {
            status.push(format!("s{}", i));
        }
        let history = status.history();
        assert_eq!(history.len(), STATUS_HISTORY);
        assert_eq!(history[0], "s119");
        assert_eq!(status.latest().as_deref(), Some("s119"));
        assert_eq!(status.take().len(), 120);
        assert!(status.take().is_empty());
    }
}
