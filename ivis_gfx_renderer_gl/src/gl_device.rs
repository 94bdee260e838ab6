/// GlDevice - GL function table and capabilities shared by all GL objects
///
/// Shared (via `Rc`) by the backend and every texture it created, so a
/// texture can release its handle without going through the render context.

use std::cell::Cell;

use glow::HasContext;
use ivis_gfx::gfx_error;

const SOURCE: &str = "ivis::gl";
const MAX_QUEUED_ERRORS: usize = 16;

/// Shared GL state
pub struct GlDevice {
    /// Loaded GL entry points (context is current on the render thread)
    pub gl: glow::Context,

    /// Object labels available (GL 4.3+ or KHR_debug)
    pub supports_labels: bool,

    /// Context runs an OpenGL ES profile
    pub is_embedded: bool,

    /// Desktop GL can read texture images back, ES cannot
    pub supports_read_back: bool,

    /// False once the render context was shut down
    alive: Cell<bool>,
}

impl GlDevice {
    /// Wrap a loaded GL context and query its capabilities
    pub fn new(gl: glow::Context) -> Self {
        let version = gl.version();
        let is_embedded = version.is_embedded;
        let supports_labels = gl.supports_debug();

        // RGB rows are not 4-byte aligned
        unsafe {
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            gl.pixel_store_i32(glow::PACK_ALIGNMENT, 1);
        }

        Self {
            gl,
            supports_labels,
            is_embedded,
            supports_read_back: !is_embedded,
            alive: Cell::new(true),
        }
    }

    /// Returns true until the owning render context is shut down
    pub fn is_alive(&self) -> bool {
        self.alive.get()
    }

    pub(crate) fn mark_dead(&self) {
        self.alive.set(false);
    }

    /// Drain the GL error queue, logging each error against `operation`
    ///
    /// Returns true when no error was pending.
    pub fn check_errors(&self, operation: &str) -> bool {
        let mut clean = true;
        // Bounded: a lost context may report errors forever
        for _ in 0..MAX_QUEUED_ERRORS {
            let code = unsafe { self.gl.get_error() };
            if code == glow::NO_ERROR {
                break;
            }
            clean = false;
            gfx_error!(SOURCE, "{} failed: {} (0x{:04X})", operation, error_name(code), code);
        }
        clean
    }
}

fn error_name(code: u32) -> &'static str {
    match code {
        glow::INVALID_ENUM => "GL_INVALID_ENUM",
        glow::INVALID_VALUE => "GL_INVALID_VALUE",
        glow::INVALID_OPERATION => "GL_INVALID_OPERATION",
        glow::INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION",
        glow::OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
        _ => "unknown GL error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_names() {
        assert_eq!(error_name(glow::INVALID_ENUM), "GL_INVALID_ENUM");
        assert_eq!(error_name(glow::OUT_OF_MEMORY), "GL_OUT_OF_MEMORY");
        assert_eq!(error_name(0xDEAD), "unknown GL error");
    }
}
