/// GlutinWindowSystem - WindowSystem over glutin + winit
///
/// The window, its GL config and its surface are created once. Each context
/// request builds a fresh glutin context against them and makes it current,
/// so failed requests can be retried on the same window.

use std::sync::Arc;

use glutin::config::GlConfig;
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentGlContext, PossiblyCurrentContext,
    Robustness, Version,
};
use glutin::display::{GetGlDisplay, GlDisplay};
use glutin::surface::{GlSurface, Surface, WindowSurface};
use ivis_gfx::ivis::negotiation::{
    ContextAttribute, ContextAttributes, ContextFlags, ProfileKind, WindowSystem,
};
use raw_window_handle::HasWindowHandle;
use winit::window::Window;

/// Window system backed by a glutin display
pub struct GlutinWindowSystem {
    // Field order matters: the surface goes before its window
    surface: Surface<WindowSurface>,
    gl_config: glutin::config::Config,
    window: Arc<Window>,
}

impl GlutinWindowSystem {
    /// Wrap a window, the GL config it was created with and its surface
    pub fn new(window: Arc<Window>, gl_config: glutin::config::Config, surface: Surface<WindowSurface>) -> Self {
        Self { surface, gl_config, window }
    }

    /// GL config the window was created with
    pub fn gl_config(&self) -> &glutin::config::Config {
        &self.gl_config
    }

    /// Give the surface and window back once negotiation is over
    pub fn into_parts(self) -> (Surface<WindowSurface>, Arc<Window>) {
        (self.surface, self.window)
    }

    fn context_attributes(
        &self,
        attributes: &ContextAttributes,
    ) -> Result<glutin::context::ContextAttributes, String> {
        let version = Version::new(attributes.major, attributes.minor);
        let api = match attributes.profile {
            ProfileKind::Embedded => ContextApi::Gles(Some(version)),
            ProfileKind::Core | ProfileKind::Compatibility => ContextApi::OpenGl(Some(version)),
        };

        let mut builder = ContextAttributesBuilder::new()
            .with_context_api(api)
            .with_debug(attributes.flags.contains(ContextFlags::DEBUG));
        builder = match attributes.profile {
            ProfileKind::Core => builder.with_profile(GlProfile::Core),
            ProfileKind::Compatibility => builder.with_profile(GlProfile::Compatibility),
            ProfileKind::Embedded => builder,
        };
        if attributes.flags.contains(ContextFlags::ROBUST_ACCESS) {
            builder = builder.with_robustness(Robustness::RobustNoResetNotification);
        }
        // FORWARD_COMPATIBLE: glutin sets it itself for core profiles where the platform needs it

        let handle = self.window.window_handle().map_err(|e| e.to_string())?;
        Ok(builder.build(Some(handle.as_raw())))
    }
}

impl WindowSystem for GlutinWindowSystem {
    type Context = PossiblyCurrentContext;

    fn create_raw_context(&mut self, attributes: &ContextAttributes) -> Result<PossiblyCurrentContext, String> {
        let context_attributes = self.context_attributes(attributes)?;
        let display = self.gl_config.display();

        let not_current = unsafe { display.create_context(&self.gl_config, &context_attributes) }
            .map_err(|e| e.to_string())?;
        not_current.make_current(&self.surface).map_err(|e| e.to_string())
    }

    fn query_attribute(&self, _context: &PossiblyCurrentContext, attribute: ContextAttribute) -> Result<i32, String> {
        match attribute {
            ContextAttribute::DoubleBuffer => Ok(if self.surface.is_single_buffered() { 0 } else { 1 }),
            ContextAttribute::DepthSize => Ok(self.gl_config.depth_size() as i32),
            ContextAttribute::StencilSize => Ok(self.gl_config.stencil_size() as i32),
        }
    }

    fn surface_size(&self) -> Option<(u32, u32)> {
        let size = self.window.inner_size().to_logical::<u32>(self.window.scale_factor());
        if size.width == 0 || size.height == 0 {
            None
        } else {
            Some((size.width, size.height))
        }
    }

    fn swap(&self, context: &PossiblyCurrentContext) -> Result<(), String> {
        self.surface.swap_buffers(context).map_err(|e| e.to_string())
    }
}
