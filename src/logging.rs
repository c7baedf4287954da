//! Four-level logger (§6) with an optional pluggable process-wide handler.
//! Every emitted record also flows through `tracing`, so a host binary can
//! attach `tracing-subscriber` without the core depending on it.

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Fatal,
}

/// A pluggable `(level, package, function, message) -> ()` handler, as
/// described in §6's Config collaborator contract.
pub type ErrorHandler = dyn Fn(LogLevel, &str, &str, &str) + Send + Sync;

/// Emits a record: runs it through `tracing` at the matching level and, if
/// one is registered, through the process-wide handler from `Config`.
pub fn emit(level: LogLevel, package: &str, function: &str, message: &str) {
    match level {
        LogLevel::Debug => tracing::debug!(target: "insyra", package, function, message),
        LogLevel::Info => tracing::info!(target: "insyra", package, function, message),
        LogLevel::Warning => tracing::warn!(target: "insyra", package, function, message),
        LogLevel::Fatal => tracing::error!(target: "insyra", package, function, message),
    }
    if let Some(handler) = crate::config::error_handler() {
        handler(level, package, function, message);
    }
}

#[macro_export]
macro_rules! log_record {
    ($level:expr, $pkg:expr, $func:expr, $($arg:tt)*) => {
        $crate::logging::emit($level, $pkg, $func, &format!($($arg)*))
    };
}
