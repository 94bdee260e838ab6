/// RenderContext - lifecycle owner of the active render backend
///
/// The backend lives in thread-local storage: GPU contexts are bound to the
/// thread that created them, so only that thread ever sees the context as
/// active. The logger is process-wide.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{OnceLock, RwLock};
use std::time::SystemTime;

use crate::error::{Error, Result};
use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};
use crate::renderer::{PixelFormat, RenderBackend, Texture};
use crate::{gfx_error, gfx_fatal, gfx_info, gfx_trace};

const SOURCE: &str = "ivis::RenderContext";

// ===== INTERNAL STATE =====

/// Lifecycle of the render context on the current thread
enum Lifecycle {
    NotInitialized,
    Active(Box<dyn RenderBackend>),
    ShutDown,
}

thread_local! {
    static LIFECYCLE: RefCell<Lifecycle> = const { RefCell::new(Lifecycle::NotInitialized) };
}

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

/// Entries below this rank are discarded
static MIN_SEVERITY: AtomicU8 = AtomicU8::new(0);

fn logger() -> &'static RwLock<Box<dyn Logger>> {
    LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)))
}

// ===== PUBLIC API =====

/// Handle on the active render context
///
/// Obtained with [`RenderContext::get`] on the thread that initialized the
/// context. The handle cannot leave that thread.
///
/// # Example
///
/// ```no_run
/// use ivis_gfx::ivis::RenderContext;
/// use ivis_gfx::ivis::render::{NullBackend, PixelFormat};
///
/// RenderContext::initialize(NullBackend::new())?;
///
/// let context = RenderContext::get();
/// let mut texture = context.create_texture(64, 64, PixelFormat::Rgba, "terrain");
/// texture.upload(0, 64, 64, PixelFormat::Rgba, &vec![0u8; 64 * 64 * 4]);
/// context.present()?;
///
/// texture.destroy();
/// RenderContext::shutdown()?;
/// # Ok::<(), ivis_gfx::ivis::Error>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RenderContext {
    _not_send: PhantomData<*const ()>,
}

impl RenderContext {
    /// Install `backend` as the active render backend of this thread
    ///
    /// Called once, after context negotiation succeeded.
    ///
    /// # Errors
    ///
    /// Returns `Error::InitializationFailed` if a context is already active,
    /// or was already shut down on this thread.
    pub fn initialize<B: RenderBackend + 'static>(backend: B) -> Result<()> {
        let name = backend.name();
        LIFECYCLE.with(|lifecycle| {
            let mut lifecycle = lifecycle.borrow_mut();
            let refusal = match &*lifecycle {
                Lifecycle::NotInitialized => None,
                Lifecycle::Active(current) => Some(format!(
                    "Render context already active ({} backend), cannot install the {} backend",
                    current.name(), name
                )),
                Lifecycle::ShutDown => Some("Render context was already shut down on this thread".to_string()),
            };
            match refusal {
                Some(message) => Err(Error::InitializationFailed(message)),
                None => {
                    *lifecycle = Lifecycle::Active(Box::new(backend));
                    Ok(())
                }
            }
        })
        .map_err(|error| {
            gfx_error!(SOURCE, "{}", error);
            error
        })?;

        gfx_info!(SOURCE, "Render context initialized ({} backend)", name);
        Ok(())
    }

    /// Tear the active backend down
    ///
    /// Textures still alive keep their handle but must not be used any more.
    ///
    /// # Errors
    ///
    /// Returns `Error::InitializationFailed` if no context is active.
    pub fn shutdown() -> Result<()> {
        let backend = LIFECYCLE.with(|lifecycle| {
            let mut lifecycle = lifecycle.borrow_mut();
            match std::mem::replace(&mut *lifecycle, Lifecycle::ShutDown) {
                Lifecycle::Active(backend) => Ok(backend),
                Lifecycle::NotInitialized => {
                    *lifecycle = Lifecycle::NotInitialized;
                    Err(Error::InitializationFailed("Render context was never initialized".to_string()))
                }
                Lifecycle::ShutDown => {
                    Err(Error::InitializationFailed("Render context already shut down".to_string()))
                }
            }
        });

        let mut backend = backend.map_err(|error| {
            gfx_error!(SOURCE, "{}", error);
            error
        })?;

        backend.teardown();
        gfx_info!(SOURCE, "Render context shut down ({} backend)", backend.name());
        Ok(())
    }

    /// Returns true while a context is active on the current thread
    ///
    /// Safe to call from a logger or backend while a context operation runs.
    pub fn is_active() -> bool {
        // Only a running backend operation holds the lifecycle borrowed
        LIFECYCLE.with(|lifecycle| {
            lifecycle
                .try_borrow()
                .map_or(true, |lifecycle| matches!(&*lifecycle, Lifecycle::Active(_)))
        })
    }

    /// Handle on the active context
    ///
    /// # Panics
    ///
    /// Calling this outside the initialize/shutdown window, or from another
    /// thread than the one that initialized the context, is a contract
    /// violation.
    pub fn get() -> RenderContext {
        if !Self::is_active() {
            gfx_fatal!(SOURCE, "RenderContext::get() called while no render context is active on this thread");
        }
        RenderContext { _not_send: PhantomData }
    }

    fn with_backend<R>(&self, operation: &str, f: impl FnOnce(&mut dyn RenderBackend) -> R) -> R {
        LIFECYCLE
            .with(|lifecycle| {
                let Ok(mut lifecycle) = lifecycle.try_borrow_mut() else {
                    gfx_fatal!(SOURCE, "{} called from inside another render context operation", operation);
                };
                match &mut *lifecycle {
                    Lifecycle::Active(backend) => Some(f(backend.as_mut())),
                    _ => None,
                }
            })
            .unwrap_or_else(|| gfx_fatal!(SOURCE, "{} called after the render context was shut down", operation))
    }

    /// Create a texture, bound and labelled
    ///
    /// `debug_label` is attached when the backend supports labels and the
    /// label is not empty. The caller owns the returned texture.
    pub fn create_texture(
        &self,
        width: u32,
        height: u32,
        internal_format: PixelFormat,
        debug_label: &str,
    ) -> Box<dyn Texture> {
        self.with_backend("create_texture", |backend| {
            let texture = backend.create_texture(width, height, internal_format);
            texture.bind();
            if !debug_label.is_empty() && backend.supports_labels() {
                backend.label_resource(texture.as_ref(), debug_label);
            }
            gfx_trace!(SOURCE, "Texture {} created ({}x{}, {:?}, \"{}\")",
                texture.id(), width, height, internal_format, debug_label);
            texture
        })
    }

    /// Present the back buffer
    ///
    /// # Errors
    ///
    /// Returns the backend error when the swap fails.
    pub fn present(&self) -> Result<()> {
        self.with_backend("present", |backend| backend.present())
    }

    /// Name of the active backend
    pub fn backend_name(&self) -> &'static str {
        self.with_backend("backend_name", |backend| backend.name())
    }

    // ===== LOGGING API =====

    /// Set a custom logger
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ivis_gfx::ivis::{RenderContext, log::{Logger, LogEntry}};
    ///
    /// struct FileLogger;
    /// impl Logger for FileLogger {
    ///     fn log(&self, entry: &LogEntry) {
    ///         // Write to file...
    ///     }
    /// }
    ///
    /// RenderContext::set_logger(FileLogger);
    /// ```
    pub fn set_logger<L: Logger + 'static>(logger_impl: L) {
        if let Ok(mut lock) = logger().write() {
            *lock = Box::new(logger_impl);
        }
    }

    /// Reset logger to default (DefaultLogger) and let every severity through
    pub fn reset_logger() {
        if let Ok(mut lock) = logger().write() {
            *lock = Box::new(DefaultLogger);
        }
        MIN_SEVERITY.store(LogSeverity::Trace.rank(), Ordering::Relaxed);
    }

    /// Discard entries below `severity`
    pub fn set_min_severity(severity: LogSeverity) {
        MIN_SEVERITY.store(severity.rank(), Ordering::Relaxed);
    }

    /// Current severity threshold
    pub fn min_severity() -> LogSeverity {
        LogSeverity::from_rank(MIN_SEVERITY.load(Ordering::Relaxed))
    }

    /// Internal logging method (for simple logs without file:line)
    ///
    /// Used by `gfx_info!`, `gfx_debug!`, etc.
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        Self::dispatch(LogEntry {
            severity,
            timestamp: SystemTime::now(),
            source: source.to_string(),
            message,
            file: None,
            line: None,
        });
    }

    /// Internal logging method with file:line information (ERROR/FATAL)
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        Self::dispatch(LogEntry {
            severity,
            timestamp: SystemTime::now(),
            source: source.to_string(),
            message,
            file: Some(file),
            line: Some(line),
        });
    }

    fn dispatch(entry: LogEntry) {
        if entry.severity.rank() < MIN_SEVERITY.load(Ordering::Relaxed) {
            return;
        }
        if let Ok(lock) = logger().read() {
            lock.log(&entry);
        }
    }
}

#[cfg(test)]
#[path = "render_context_tests.rs"]
mod tests;
