/// WindowSystem trait - what the negotiator needs from the windowing layer

use crate::negotiation::ContextAttributes;

/// Context attribute readable after creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextAttribute {
    /// Non-zero when presentation is double buffered
    DoubleBuffer,
    /// Depth buffer bits
    DepthSize,
    /// Stencil buffer bits
    StencilSize,
}

impl ContextAttribute {
    /// Attribute name, for logs
    pub fn name(self) -> &'static str {
        match self {
            ContextAttribute::DoubleBuffer => "DOUBLEBUFFER",
            ContextAttribute::DepthSize => "DEPTH_SIZE",
            ContextAttribute::StencilSize => "STENCIL_SIZE",
        }
    }
}

/// Windowing collaborator owning the on-screen surface
///
/// All calls happen on the thread that owns the window. Context creation
/// must be retriable with different attributes on the same window.
pub trait WindowSystem {
    /// Live low-level context produced by a successful creation
    type Context;

    /// Attempt one context creation
    ///
    /// On failure, returns the windowing system's error text.
    fn create_raw_context(&mut self, attributes: &ContextAttributes) -> Result<Self::Context, String>;

    /// Read an attribute of a created context
    fn query_attribute(&self, context: &Self::Context, attribute: ContextAttribute) -> Result<i32, String>;

    /// Logical size of the drawing surface, `None` when it cannot be determined
    fn surface_size(&self) -> Option<(u32, u32)>;

    /// Present the back buffer
    fn swap(&self, context: &Self::Context) -> Result<(), String>;
}
