/*!
# IVIS Graphics

Hardware rendering abstraction of the IVIS engine.

This crate provides the backend-agnostic API: pixel formats, textures, the
render context that owns the active backend, and the context negotiation
protocol that picks an OpenGL profile at startup. Backend implementations
(OpenGL, null) provide concrete types behind these traits.

## Architecture

- **RenderContext**: Lifecycle owner of the active backend, texture factory
- **RenderBackend**: Factory trait implemented by each backend
- **Texture**: Exclusively owned GPU texture
- **PixelFormat**: Engine-level pixel formats
- **ContextNegotiator**: Fallback ladder over context profiles (desktop core,
  desktop 2.1, ES 3.0, ES 2.0) with a double buffering gate
- **WindowSystem**: What negotiation needs from the windowing layer
*/

// Internal modules
mod error;
mod config;
mod render_context;
pub mod log;
pub mod renderer;
pub mod negotiation;

pub use render_context::RenderContext;

// Main ivis namespace module
pub mod ivis {
    // Error types
    pub use crate::error::{Error, Result};

    // Render context (lifecycle + logging)
    pub use crate::render_context::RenderContext;

    // Configuration
    pub use crate::config::{BackendType, Config};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};
    }

    // Render sub-module with textures, formats and backends
    pub mod render {
        pub use crate::renderer::*;
    }

    // Context negotiation sub-module
    pub mod negotiation {
        pub use crate::negotiation::{
            AttemptFailure, ContextAttribute, ContextAttributes, ContextFlags, ContextNegotiator,
            ContextRequest, NegotiatedContext, NegotiationState, ProfileKind, RequestLadder,
            WindowSystem,
        };
    }
}
