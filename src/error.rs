//! Error taxonomy (§7) and the per-object error ring.

use crate::logging::LogLevel;
use crate::ring::Ring;
use std::fmt;

/// The error kinds a chainable mutator or a CCL evaluation can raise.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("inconsistent state: {0}")]
    Inconsistent(String),

    #[error("actor is closed")]
    ResourceClosed,

    #[error("numeric error: {0}")]
    Numeric(String),

    #[error("recursion or call-depth limit exceeded")]
    Recursion,

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    pub fn inconsistent(msg: impl Into<String>) -> Self {
        Error::Inconsistent(msg.into())
    }

    pub fn numeric(msg: impl Into<String>) -> Self {
        Error::Numeric(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }

    /// The log level a fresh occurrence of this error should be recorded at.
    pub fn level(&self) -> LogLevel {
        LogLevel::Warning
    }
}

/// A single entry retained in an object's error ring.
#[derive(Debug, Clone)]
pub struct ErrorEntry {
    pub level: LogLevel,
    pub package: &'static str,
    pub function: &'static str,
    pub message: String,
}

impl fmt::Display for ErrorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}::{}: {}", self.level, self.package, self.function, self.message)
    }
}

/// Bounded error history embedded in every `List`/`Table`, plus the most
/// recent entry for `Err()`/`ClearErr()`.
#[derive(Debug, Clone)]
pub struct ErrorHistory {
    ring: Ring<ErrorEntry>,
    last: Option<ErrorEntry>,
}

impl Default for ErrorHistory {
    fn default() -> Self {
        Self::new(16)
    }
}

impl ErrorHistory {
    pub fn new(capacity: usize) -> Self {
        Self { ring: Ring::new(capacity), last: None }
    }

    /// Record a new entry: pushes to the ring, emits through the global
    /// logger, and updates `last`.
    pub fn record(&mut self, level: LogLevel, package: &'static str, function: &'static str, message: impl Into<String>) {
        let entry = ErrorEntry { level, package, function, message: message.into() };
        crate::logging::emit(level, package, function, &entry.message);
        self.ring.push(entry.clone());
        self.last = Some(entry);
    }

    pub fn last(&self) -> Option<&ErrorEntry> {
        self.last.as_ref()
    }

    pub fn clear_last(&mut self) {
        self.last = None;
    }

    pub fn history(&self) -> Vec<ErrorEntry> {
        self.ring.iter().cloned().collect()
    }
}
