/// Graphics layer configuration

use crate::log::LogSeverity;

/// Which backend the render context is built on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// Headless software backend (no window, no GPU)
    Null,
    /// OpenGL / OpenGL ES through the windowing system
    OpenGl,
}

/// Graphics layer configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend to bring up
    pub backend: BackendType,
    /// Skip the desktop profiles and start the context ladder at OpenGL ES 3.0
    pub prefer_embedded: bool,
    /// Request debug contexts (KHR_debug output, object labels)
    pub debug_context: bool,
    /// Request robust buffer access on every context
    pub robust_access: bool,
    /// Synchronize presentation with the display refresh
    pub vsync: bool,
    /// Application name (window title)
    pub app_name: String,
    /// Log entries below this severity are discarded
    pub min_log_severity: LogSeverity,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendType::OpenGl,
            prefer_embedded: false,
            debug_context: cfg!(debug_assertions),
            robust_access: false,
            vsync: true,
            app_name: "IVIS Application".to_string(),
            min_log_severity: LogSeverity::Trace,
        }
    }
}
