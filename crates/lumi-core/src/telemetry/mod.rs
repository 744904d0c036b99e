//! Error reporting.
//!
//! Failed operations are handed to an [`ErrorReporter`] for diagnostics.
//! Reporting is fire-and-forget: nothing the reporter does affects the
//! outcome returned to the caller.

use std::sync::Mutex;

use crate::error::Error;

/// Sink for operation failures.
pub trait ErrorReporter: Send + Sync {
    /// Record `error` raised by `operation`.
    fn report(&self, operation: &str, error: &Error);
}

/// Reports errors as `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, operation: &str, error: &Error) {
        tracing::error!(
            operation,
            code = error.code().unwrap_or("internal"),
            "{} failed: {}",
            operation,
            error
        );
    }
}

/// Keeps reported errors in memory.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    reports: Mutex<Vec<(String, String)>>,
}

impl MemoryReporter {
    /// Create an empty reporter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reported `(operation, message)` pairs in report order.
    pub fn reports(&self) -> Vec<(String, String)> {
        self.reports
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl ErrorReporter for MemoryReporter {
    fn report(&self, operation: &str, error: &Error) {
        self.reports
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push((operation.to_string(), error.to_string()));
    }
}
