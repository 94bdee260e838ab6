//! Unit tests for log.rs
//!
//! Tests LogSeverity ordering and ranks, DefaultLogger formatting and the
//! gfx_* macros routed through RenderContext.

use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};
use crate::RenderContext;
use serial_test::serial;
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

fn entry(severity: LogSeverity, file: Option<&'static str>, line: Option<u32>) -> LogEntry {
    LogEntry {
        severity,
        timestamp: SystemTime::now(),
        source: "ivis::negotiation".to_string(),
        message: "Requested OpenGL ES 3.0 context".to_string(),
        file,
        line,
    }
}

/// Test logger that captures log entries for verification
struct TestLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

fn capture() -> Arc<Mutex<Vec<LogEntry>>> {
    let entries = Arc::new(Mutex::new(Vec::new()));
    RenderContext::set_logger(TestLogger { entries: entries.clone() });
    entries
}

fn captured_from(entries: &Arc<Mutex<Vec<LogEntry>>>, source: &str) -> Vec<LogEntry> {
    entries
        .lock()
        .unwrap()
        .iter()
        .filter(|entry| entry.source == source)
        .cloned()
        .collect()
}

// ============================================================================
// LOG SEVERITY TESTS
// ============================================================================

#[test]
fn test_log_severity_ordering() {
    assert!(LogSeverity::Trace < LogSeverity::Debug);
    assert!(LogSeverity::Debug < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
    assert!(LogSeverity::Error < LogSeverity::Fatal);
}

#[test]
fn test_log_severity_rank_matches_ordering() {
    let all = [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
        LogSeverity::Fatal,
    ];
    for pair in all.windows(2) {
        assert!(pair[0].rank() < pair[1].rank());
    }
    for severity in all {
        assert_eq!(LogSeverity::from_rank(severity.rank()), severity);
    }
    assert_eq!(LogSeverity::from_rank(200), LogSeverity::Fatal);
}

// ============================================================================
// DEFAULT LOGGER TESTS
// ============================================================================

#[test]
fn test_format_plain_without_location() {
    let line = DefaultLogger::format_plain(&entry(LogSeverity::Info, None, None));
    assert!(line.contains("[INFO ]"));
    assert!(line.contains("[ivis::negotiation]"));
    assert!(line.ends_with("Requested OpenGL ES 3.0 context"));
}

#[test]
fn test_format_plain_with_location() {
    let line = DefaultLogger::format_plain(&entry(LogSeverity::Error, Some("negotiator.rs"), Some(42)));
    assert!(line.contains("[ERROR]"));
    assert!(line.ends_with("(negotiator.rs:42)"));
}

#[test]
fn test_format_plain_timestamp_layout() {
    let line = DefaultLogger::format_plain(&entry(LogSeverity::Debug, None, None));
    // [YYYY-MM-DD HH:MM:SS.mmm]
    let timestamp = &line[1..line.find(']').unwrap()];
    assert_eq!(timestamp.len(), 23);
    assert_eq!(&timestamp[4..5], "-");
    assert_eq!(&timestamp[10..11], " ");
    assert_eq!(&timestamp[19..20], ".");
}

#[test]
fn test_default_logger_all_severities() {
    let logger = DefaultLogger;
    for severity in [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
        LogSeverity::Fatal,
    ] {
        // Just verify it doesn't panic, on both output branches
        logger.log(&entry(severity, None, None));
        logger.log(&entry(severity, Some("test.rs"), Some(1)));
    }
}

#[test]
fn test_logger_trait_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<DefaultLogger>();
}

// ============================================================================
// MACRO TESTS
// ============================================================================

#[test]
#[serial]
fn test_simple_macros_have_no_location() {
    let entries = capture();

    crate::gfx_trace!("ivis::macros", "trace {}", 1);
    crate::gfx_debug!("ivis::macros", "debug {}", 2);
    crate::gfx_info!("ivis::macros", "info {}", 3);
    crate::gfx_warn!("ivis::macros", "warn {}", 4);

    RenderContext::reset_logger();

    let captured = captured_from(&entries, "ivis::macros");
    let severities: Vec<LogSeverity> = captured.iter().map(|entry| entry.severity).collect();
    assert_eq!(
        severities,
        vec![LogSeverity::Trace, LogSeverity::Debug, LogSeverity::Info, LogSeverity::Warn]
    );
    assert_eq!(captured[2].message, "info 3");
    assert!(captured.iter().all(|entry| entry.file.is_none() && entry.line.is_none()));
}

#[test]
#[serial]
fn test_error_macro_records_location() {
    let entries = capture();

    crate::gfx_error!("ivis::macros", "Failed to get value for {}", "DOUBLEBUFFER");

    RenderContext::reset_logger();

    let captured = captured_from(&entries, "ivis::macros");
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].severity, LogSeverity::Error);
    assert_eq!(captured[0].file, Some(file!()));
    assert!(captured[0].line.is_some());
}

#[test]
#[serial]
fn test_err_macro_logs_and_builds_backend_error() {
    let entries = capture();

    let error = crate::gfx_err!("ivis::macros", "glGenTextures failed: {}", "out of handles");

    RenderContext::reset_logger();

    assert!(matches!(
        error,
        crate::ivis::Error::BackendError(ref message) if message == "glGenTextures failed: out of handles"
    ));
    assert_eq!(captured_from(&entries, "ivis::macros").len(), 1);
}

#[test]
#[serial]
fn test_bail_macro_returns_error() {
    fn failing() -> crate::ivis::Result<u32> {
        crate::gfx_bail!("ivis::macros", "swap failed");
    }

    let entries = capture();
    let result = failing();
    RenderContext::reset_logger();

    assert!(result.is_err());
    assert_eq!(captured_from(&entries, "ivis::macros")[0].message, "swap failed");
}

#[test]
#[should_panic(expected = "[ivis::macros] contract violated: 3")]
fn test_fatal_macro_panics_with_source_and_message() {
    crate::gfx_fatal!("ivis::macros", "contract violated: {}", 3);
}
