//! Internal logging system for the IVIS graphics layer
//!
//! This module provides a flexible logging system with:
//! - Customizable logger via Logger trait
//! - Severity levels (Trace, Debug, Info, Warn, Error, Fatal)
//! - Colored console output by default
//! - File and line information for ERROR and FATAL logs

use colored::*;
use std::time::SystemTime;
use chrono::{DateTime, Local};

/// Logger trait for custom logging implementations
///
/// Implement this trait to route graphics diagnostics somewhere else than
/// the console (file, in-game console, crash reporter...).
///
/// # Example
///
/// ```no_run
/// use ivis_gfx::ivis::log::{Logger, LogEntry};
///
/// struct FileLogger {
///     file: std::fs::File,
/// }
///
/// impl Logger for FileLogger {
///     fn log(&self, entry: &LogEntry) {
///         // Write to file...
///     }
/// }
/// ```
pub trait Logger: Send + Sync {
    /// Log an entry
    ///
    /// May run in the middle of a render context operation. Querying
    /// `RenderContext::is_active` from here is fine; driving the context
    /// (creating textures, presenting) is a contract violation.
    fn log(&self, entry: &LogEntry);
}

/// Log entry containing all information about a log message
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Severity level
    pub severity: LogSeverity,

    /// Timestamp when the log was created
    pub timestamp: SystemTime,

    /// Source module (e.g., "ivis::RenderContext", "ivis::gl::Texture")
    pub source: String,

    /// Log message
    pub message: String,

    /// Source file (only for detailed ERROR/FATAL logs)
    pub file: Option<&'static str>,

    /// Source line (only for detailed ERROR/FATAL logs)
    pub line: Option<u32>,
}

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogSeverity {
    /// Very verbose debug information
    Trace,

    /// Development/debugging information
    Debug,

    /// Important informational messages
    Info,

    /// Potential issues
    Warn,

    /// Errors the layer can keep running after
    Error,

    /// Contract violations, the process is about to abort
    Fatal,
}

impl LogSeverity {
    /// Numeric rank, used for the severity threshold
    pub(crate) fn rank(self) -> u8 {
        match self {
            LogSeverity::Trace => 0,
            LogSeverity::Debug => 1,
            LogSeverity::Info => 2,
            LogSeverity::Warn => 3,
            LogSeverity::Error => 4,
            LogSeverity::Fatal => 5,
        }
    }

    pub(crate) fn from_rank(rank: u8) -> Self {
        match rank {
            0 => LogSeverity::Trace,
            1 => LogSeverity::Debug,
            2 => LogSeverity::Info,
            3 => LogSeverity::Warn,
            4 => LogSeverity::Error,
            _ => LogSeverity::Fatal,
        }
    }
}

/// Default logger implementation using colored console output
///
/// Format:
/// - Normal: `[timestamp] [SEVERITY] [source] message`
/// - Error/Fatal: `[timestamp] [ERROR] [source] message (file:line)`
pub struct DefaultLogger;

impl DefaultLogger {
    /// Render an entry as a single line, without colors
    pub fn format_plain(entry: &LogEntry) -> String {
        let datetime: DateTime<Local> = entry.timestamp.into();
        let timestamp = datetime.format("%Y-%m-%d %H:%M:%S%.3f");
        let severity = match entry.severity {
            LogSeverity::Trace => "TRACE",
            LogSeverity::Debug => "DEBUG",
            LogSeverity::Info => "INFO ",
            LogSeverity::Warn => "WARN ",
            LogSeverity::Error => "ERROR",
            LogSeverity::Fatal => "FATAL",
        };

        match (entry.file, entry.line) {
            (Some(file), Some(line)) => format!(
                "[{}] [{}] [{}] {} ({}:{})",
                timestamp, severity, entry.source, entry.message, file, line
            ),
            _ => format!("[{}] [{}] [{}] {}", timestamp, severity, entry.source, entry.message),
        }
    }
}

impl Logger for DefaultLogger {
    fn log(&self, entry: &LogEntry) {
        let datetime: DateTime<Local> = entry.timestamp.into();
        let timestamp = datetime.format("%Y-%m-%d %H:%M:%S%.3f").to_string();

        let severity_str = match entry.severity {
            LogSeverity::Trace => "TRACE".bright_black(),
            LogSeverity::Debug => "DEBUG".cyan(),
            LogSeverity::Info => "INFO ".green(),
            LogSeverity::Warn => "WARN ".yellow(),
            LogSeverity::Error => "ERROR".red().bold(),
            LogSeverity::Fatal => "FATAL".white().on_red().bold(),
        };

        let source = entry.source.bright_blue();

        // Detailed entries (ERROR/FATAL) go to stderr
        if let (Some(file), Some(line)) = (entry.file, entry.line) {
            eprintln!(
                "[{}] [{}] [{}] {} ({}:{})",
                timestamp,
                severity_str,
                source,
                entry.message,
                file,
                line
            );
        } else {
            println!(
                "[{}] [{}] [{}] {}",
                timestamp,
                severity_str,
                source,
                entry.message
            );
        }
    }
}

// ===== LOGGING MACROS =====

/// Log a TRACE message
#[macro_export]
macro_rules! gfx_trace {
    ($source:expr, $($arg:tt)*) => {
        $crate::ivis::RenderContext::log(
            $crate::ivis::log::LogSeverity::Trace,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log a DEBUG message
///
/// # Example
///
/// ```no_run
/// ivis_gfx::gfx_debug!("ivis::negotiation", "Requested {} context", "OpenGL Core");
/// ```
#[macro_export]
macro_rules! gfx_debug {
    ($source:expr, $($arg:tt)*) => {
        $crate::ivis::RenderContext::log(
            $crate::ivis::log::LogSeverity::Debug,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log an INFO message
#[macro_export]
macro_rules! gfx_info {
    ($source:expr, $($arg:tt)*) => {
        $crate::ivis::RenderContext::log(
            $crate::ivis::log::LogSeverity::Info,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log a WARN message
#[macro_export]
macro_rules! gfx_warn {
    ($source:expr, $($arg:tt)*) => {
        $crate::ivis::RenderContext::log(
            $crate::ivis::log::LogSeverity::Warn,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log an ERROR message with file:line information
///
/// # Example
///
/// ```no_run
/// ivis_gfx::gfx_error!("ivis::gl", "Failed to initialize: {}", "no display");
/// ```
#[macro_export]
macro_rules! gfx_error {
    ($source:expr, $($arg:tt)*) => {
        $crate::ivis::RenderContext::log_detailed(
            $crate::ivis::log::LogSeverity::Error,
            $source,
            format!($($arg)*),
            file!(),
            line!()
        )
    };
}

/// Log an ERROR message and build an `Error::BackendError` from it
///
/// Meant for `map_err` / `ok_or_else` closures.
#[macro_export]
macro_rules! gfx_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::ivis::RenderContext::log_detailed(
            $crate::ivis::log::LogSeverity::Error,
            $source,
            message.clone(),
            file!(),
            line!()
        );
        $crate::ivis::Error::BackendError(message)
    }};
}

/// Log an ERROR message and return `Err(Error::BackendError)` from the enclosing function
#[macro_export]
macro_rules! gfx_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::gfx_err!($source, $($arg)*))
    };
}

/// Log a FATAL message with file:line information, then panic
///
/// Reserved for contract violations (programmer errors). Never used for
/// environmental failures, those are returned as `Error`.
#[macro_export]
macro_rules! gfx_fatal {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::ivis::RenderContext::log_detailed(
            $crate::ivis::log::LogSeverity::Fatal,
            $source,
            message.clone(),
            file!(),
            line!()
        );
        panic!("[{}] {}", $source, message)
    }};
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
