//! Unit tests for RenderContext
//!
//! The render context is thread-local, and the test harness runs each test
//! on its own thread, so lifecycle tests do not interfere with each other.
//! Logger tests touch the process-wide logger and run with #[serial].

use crate::ivis::log::{LogEntry, LogSeverity, Logger};
use crate::ivis::render::{NullBackend, PixelFormat};
use crate::ivis::{Error, RenderContext};
use serial_test::serial;
use std::sync::{Arc, Mutex};

// ============================================================================
// TEST HELPERS
// ============================================================================

/// Test logger that captures log entries for verification
struct TestLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl TestLogger {
    fn new() -> (Self, Arc<Mutex<Vec<LogEntry>>>) {
        let entries = Arc::new(Mutex::new(Vec::new()));
        (Self { entries: entries.clone() }, entries)
    }
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

// ============================================================================
// LIFECYCLE
// ============================================================================

#[test]
fn test_not_active_before_initialize() {
    assert!(!RenderContext::is_active());
}

#[test]
fn test_initialize_then_shutdown() {
    let backend = NullBackend::new();
    let probe = backend.probe();

    RenderContext::initialize(backend).unwrap();
    assert!(RenderContext::is_active());
    assert_eq!(RenderContext::get().backend_name(), "null");

    RenderContext::shutdown().unwrap();
    assert!(!RenderContext::is_active());
    assert!(!probe.is_alive());
}

#[test]
fn test_initialize_twice_is_rejected() {
    RenderContext::initialize(NullBackend::new()).unwrap();

    let result = RenderContext::initialize(NullBackend::new());
    assert!(matches!(result, Err(Error::InitializationFailed(_))));
    assert!(RenderContext::is_active());

    RenderContext::shutdown().unwrap();
}

#[test]
fn test_initialize_after_shutdown_is_rejected() {
    RenderContext::initialize(NullBackend::new()).unwrap();
    RenderContext::shutdown().unwrap();

    let result = RenderContext::initialize(NullBackend::new());
    assert!(matches!(result, Err(Error::InitializationFailed(_))));
    assert!(!RenderContext::is_active());
}

#[test]
fn test_shutdown_without_initialize_is_rejected() {
    let result = RenderContext::shutdown();
    assert!(matches!(result, Err(Error::InitializationFailed(_))));

    // A refused shutdown leaves the context initializable
    RenderContext::initialize(NullBackend::new()).unwrap();
    RenderContext::shutdown().unwrap();
}

#[test]
fn test_shutdown_twice_is_rejected() {
    RenderContext::initialize(NullBackend::new()).unwrap();
    RenderContext::shutdown().unwrap();
    assert!(RenderContext::shutdown().is_err());
}

#[test]
#[should_panic(expected = "no render context is active")]
fn test_get_before_initialize_is_fatal() {
    let _ = RenderContext::get();
}

#[test]
#[should_panic(expected = "no render context is active")]
fn test_get_after_shutdown_is_fatal() {
    RenderContext::initialize(NullBackend::new()).unwrap();
    RenderContext::shutdown().unwrap();
    let _ = RenderContext::get();
}

#[test]
#[should_panic(expected = "create_texture called after the render context was shut down")]
fn test_stale_handle_after_shutdown_is_fatal() {
    RenderContext::initialize(NullBackend::new()).unwrap();
    let context = RenderContext::get();
    RenderContext::shutdown().unwrap();
    let _ = context.create_texture(1, 1, PixelFormat::Rgba, "");
}

#[test]
fn test_context_is_thread_local() {
    RenderContext::initialize(NullBackend::new()).unwrap();

    let seen_elsewhere = std::thread::spawn(RenderContext::is_active).join().unwrap();
    assert!(!seen_elsewhere);

    RenderContext::shutdown().unwrap();
}

// ============================================================================
// TEXTURES
// ============================================================================

#[test]
fn test_create_texture_binds_and_labels() {
    let backend = NullBackend::new();
    let probe = backend.probe();
    RenderContext::initialize(backend).unwrap();

    let context = RenderContext::get();
    let texture = context.create_texture(16, 16, PixelFormat::Rgba, "minimap");

    assert_eq!(probe.bound_texture(), Some(texture.id()));
    assert_eq!(probe.label(texture.id()), Some("minimap".to_string()));
    assert_eq!(texture.internal_format(), PixelFormat::Rgba);

    texture.destroy();
    RenderContext::shutdown().unwrap();
}

#[test]
fn test_empty_label_is_not_attached() {
    let backend = NullBackend::new();
    let probe = backend.probe();
    RenderContext::initialize(backend).unwrap();

    let texture = RenderContext::get().create_texture(8, 8, PixelFormat::Rgb, "");
    assert_eq!(probe.label(texture.id()), None);

    drop(texture);
    RenderContext::shutdown().unwrap();
}

#[test]
fn test_texture_round_trip_through_context() {
    RenderContext::initialize(NullBackend::new()).unwrap();
    let context = RenderContext::get();

    let pixels: Vec<u8> = (0..2 * 2 * 4).map(|i| i as u8).collect();
    let mut texture = context.create_texture(2, 2, PixelFormat::Rgba, "round_trip");
    texture.upload(0, 2, 2, PixelFormat::Rgba, &pixels);

    assert_eq!(texture.read_back(0, PixelFormat::Rgba), Some(pixels));

    texture.destroy();
    RenderContext::shutdown().unwrap();
}

#[test]
fn test_present_reaches_backend() {
    let backend = NullBackend::new();
    let probe = backend.probe();
    RenderContext::initialize(backend).unwrap();

    let context = RenderContext::get();
    context.present().unwrap();
    context.present().unwrap();
    assert_eq!(probe.frames_presented(), 2);

    RenderContext::shutdown().unwrap();
}

#[test]
fn test_texture_dropped_after_shutdown_is_not_released() {
    let backend = NullBackend::new();
    let probe = backend.probe();
    RenderContext::initialize(backend).unwrap();

    let texture = RenderContext::get().create_texture(4, 4, PixelFormat::Rgba, "leaked");
    RenderContext::shutdown().unwrap();
    drop(texture);

    assert!(probe.released().is_empty());
}

// ============================================================================
// LOGGING
// ============================================================================

#[test]
#[serial]
fn test_set_logger_captures_entries() {
    let (logger, entries) = TestLogger::new();
    RenderContext::set_logger(logger);

    RenderContext::log(LogSeverity::Info, "ivis::test", "hello".to_string());
    RenderContext::log_detailed(LogSeverity::Error, "ivis::test", "boom".to_string(), "file.rs", 7);

    RenderContext::reset_logger();

    // Other tests may log concurrently, keep ours only
    let entries: Vec<LogEntry> = entries
        .lock()
        .unwrap()
        .iter()
        .filter(|entry| entry.source == "ivis::test")
        .cloned()
        .collect();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].severity, LogSeverity::Info);
    assert_eq!(entries[0].source, "ivis::test");
    assert_eq!(entries[0].message, "hello");
    assert_eq!(entries[0].file, None);
    assert_eq!(entries[1].file, Some("file.rs"));
    assert_eq!(entries[1].line, Some(7));
}

#[test]
#[serial]
fn test_min_severity_filters_entries() {
    let (logger, entries) = TestLogger::new();
    RenderContext::set_logger(logger);
    RenderContext::set_min_severity(LogSeverity::Warn);
    assert_eq!(RenderContext::min_severity(), LogSeverity::Warn);

    RenderContext::log(LogSeverity::Debug, "ivis::test", "dropped".to_string());
    RenderContext::log(LogSeverity::Warn, "ivis::test", "kept".to_string());
    RenderContext::log(LogSeverity::Error, "ivis::test", "kept too".to_string());

    RenderContext::reset_logger();
    assert_eq!(RenderContext::min_severity(), LogSeverity::Trace);

    let entries = entries.lock().unwrap();
    let messages: Vec<&str> = entries
        .iter()
        .filter(|entry| entry.source == "ivis::test")
        .map(|entry| entry.message.as_str())
        .collect();
    assert_eq!(messages, vec!["kept", "kept too"]);
}

#[test]
#[serial]
fn test_lifecycle_is_logged() {
    let (logger, entries) = TestLogger::new();
    RenderContext::set_logger(logger);

    RenderContext::initialize(NullBackend::new()).unwrap();
    let refused = RenderContext::initialize(NullBackend::new());
    RenderContext::shutdown().unwrap();

    RenderContext::reset_logger();

    assert!(refused.is_err());
    let entries = entries.lock().unwrap();
    assert!(entries.iter().any(|entry| {
        entry.severity == LogSeverity::Info && entry.message.contains("initialized (null backend)")
    }));
    assert!(entries.iter().any(|entry| {
        entry.severity == LogSeverity::Error && entry.message.contains("already active")
    }));
    assert!(entries.iter().any(|entry| entry.message.contains("shut down (null backend)")));
}

#[test]
#[serial]
fn test_fatal_is_logged_before_panicking() {
    let (logger, entries) = TestLogger::new();
    RenderContext::set_logger(logger);

    let result = std::panic::catch_unwind(|| {
        let _ = RenderContext::get();
    });

    RenderContext::reset_logger();

    assert!(result.is_err());
    let entries = entries.lock().unwrap();
    let fatal = entries
        .iter()
        .find(|entry| entry.severity == LogSeverity::Fatal && entry.message.contains("no render context is active"))
        .expect("a fatal entry");
    assert!(fatal.file.is_some());
    assert!(fatal.line.is_some());
}

/// Logger that asks the render context about its state for every entry
struct ReentrantLogger {
    seen: Arc<Mutex<Vec<(String, bool)>>>,
}

impl Logger for ReentrantLogger {
    fn log(&self, entry: &LogEntry) {
        let active = RenderContext::is_active();
        self.seen.lock().unwrap().push((entry.message.clone(), active));
    }
}

#[test]
#[serial]
fn test_logger_can_query_context_during_an_operation() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    RenderContext::set_logger(ReentrantLogger { seen: seen.clone() });

    RenderContext::initialize(NullBackend::new()).unwrap();
    let texture = RenderContext::get().create_texture(2, 2, PixelFormat::Rgba, "reentrant");
    let id = texture.id();
    texture.destroy();
    RenderContext::shutdown().unwrap();

    RenderContext::reset_logger();

    let seen = seen.lock().unwrap();
    let created = format!("Texture {} created", id);
    let (_, active) = seen
        .iter()
        .find(|(message, _)| message.starts_with(&created))
        .expect("texture creation logged");
    assert!(*active);
}

#[test]
#[serial]
#[should_panic(expected = "called from inside another render context operation")]
fn test_nested_context_operation_is_fatal() {
    use crate::ivis::render::{RenderBackend, Texture};

    /// Backend that re-enters the render context while creating a texture
    struct NestingBackend(NullBackend);

    impl RenderBackend for NestingBackend {
        fn name(&self) -> &'static str {
            "nesting"
        }
        fn create_texture(&mut self, width: u32, height: u32, internal_format: PixelFormat) -> Box<dyn Texture> {
            let _ = RenderContext::get().backend_name();
            self.0.create_texture(width, height, internal_format)
        }
        fn supports_labels(&self) -> bool {
            false
        }
        fn label_resource(&mut self, _texture: &dyn Texture, _label: &str) {}
        fn present(&mut self) -> crate::ivis::Result<()> {
            Ok(())
        }
        fn teardown(&mut self) {
            self.0.teardown();
        }
    }

    RenderContext::initialize(NestingBackend(NullBackend::new())).unwrap();
    let _ = RenderContext::get().create_texture(1, 1, PixelFormat::Rgba, "");
}
