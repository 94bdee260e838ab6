/*!
# IVIS Graphics - OpenGL Backend

OpenGL / OpenGL ES implementation of the IVIS graphics layer.

This crate provides the window system used for context negotiation (glutin
over winit), the GL backend built on `glow`, and the startup sequence tying
them to `RenderContext`.
*/

mod gl_format;
mod gl_device;
mod gl_texture;
mod gl_backend;
mod glutin_window_system;
mod bootstrap;

pub use bootstrap::{bootstrap, bootstrap_headless};

// Main ivis namespace module
pub mod ivis {
    pub use crate::bootstrap::{bootstrap, bootstrap_headless};
    pub use crate::gl_backend::GlBackend;
    pub use crate::gl_device::GlDevice;
    pub use crate::gl_format::{to_gl, TEXEL_TYPE};
    pub use crate::gl_texture::GlTexture;
    pub use crate::glutin_window_system::GlutinWindowSystem;
}
