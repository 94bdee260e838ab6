/// RenderBackend trait - resource factory interface implemented by each backend

use crate::error::Result;
use crate::renderer::{PixelFormat, Texture};

/// Main backend trait
///
/// This is the factory interface `RenderContext` dispatches to. Each
/// concrete backend (OpenGL, null, ...) implements it; callers only ever see
/// `RenderContext` and `dyn Texture`, so adding a backend needs no caller
/// change. Future resource kinds (buffers, pipelines) are added here.
pub trait RenderBackend {
    /// Short backend name, for diagnostics ("opengl", "null", ...)
    fn name(&self) -> &'static str;

    /// Allocate a texture handle
    ///
    /// `width` and `height` are informational at this point, storage is
    /// defined by the first upload. A backend that cannot allocate a handle
    /// treats it as fatal.
    fn create_texture(&mut self, width: u32, height: u32, internal_format: PixelFormat) -> Box<dyn Texture>;

    /// Whether [`RenderBackend::label_resource`] does anything
    fn supports_labels(&self) -> bool;

    /// Attach a debug label to a texture, for external debugging tools
    fn label_resource(&mut self, texture: &dyn Texture, label: &str);

    /// Present the back buffer
    fn present(&mut self) -> Result<()>;

    /// Release backend state
    ///
    /// Called exactly once by `RenderContext::shutdown`. Textures still alive
    /// afterwards must not reach the backend any more.
    fn teardown(&mut self);
}
