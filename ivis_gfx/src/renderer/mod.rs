/// Renderer module - backend-facing traits and resource types

// Module declarations
pub mod pixel_format;
pub mod texture;
pub mod render_backend;
pub mod null_backend;

// Re-export from modules
pub use pixel_format::*;
pub use texture::*;
pub use render_backend::*;
pub use null_backend::{NullBackend, NullProbe, NullTexture};
