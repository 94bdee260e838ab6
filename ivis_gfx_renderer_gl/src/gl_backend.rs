/// GlBackend - OpenGL / OpenGL ES implementation of RenderBackend

use std::num::NonZeroU32;
use std::rc::Rc;
use std::sync::Arc;

use glow::HasContext;
use glutin::context::{PossiblyCurrentContext, PossiblyCurrentGlContext};
use glutin::surface::{GlSurface, Surface, SwapInterval, WindowSurface};
use ivis_gfx::ivis::negotiation::ContextRequest;
use ivis_gfx::ivis::render::{PixelFormat, RenderBackend, Texture};
use ivis_gfx::ivis::Result;
use ivis_gfx::{gfx_bail, gfx_debug, gfx_err, gfx_info, gfx_warn};
use winit::window::Window;

use crate::gl_device::GlDevice;
use crate::gl_texture::GlTexture;

const SOURCE: &str = "ivis::gl";

/// OpenGL backend
///
/// Owns the current GL context, its window surface and the window itself.
/// Field order matters: the surface goes before the window it draws to.
pub struct GlBackend {
    device: Rc<GlDevice>,
    context: Option<PossiblyCurrentContext>,
    surface: Surface<WindowSurface>,
    request: ContextRequest,
    _window: Arc<Window>,
}

impl GlBackend {
    /// Wrap a negotiated, current context
    pub fn new(
        gl: glow::Context,
        context: PossiblyCurrentContext,
        surface: Surface<WindowSurface>,
        window: Arc<Window>,
        request: ContextRequest,
    ) -> Self {
        let device = GlDevice::new(gl);
        Self::log_driver_info(&device, request);

        Self {
            device: Rc::new(device),
            context: Some(context),
            surface,
            request,
            _window: window,
        }
    }

    fn log_driver_info(device: &GlDevice, request: ContextRequest) {
        let gl = &device.gl;
        let (vendor, renderer, version) = unsafe {
            (
                gl.get_parameter_string(glow::VENDOR),
                gl.get_parameter_string(glow::RENDERER),
                gl.get_parameter_string(glow::VERSION),
            )
        };
        gfx_info!(SOURCE, "{} context: {} {} ({})", request.name(), vendor, renderer, version);
        gfx_debug!(SOURCE, "Object labels: {}, texture read-back: {}",
            device.supports_labels, device.supports_read_back);
    }

    /// Request the context was negotiated under
    pub fn request(&self) -> ContextRequest {
        self.request
    }

    /// Shared device, for capability queries
    pub fn device(&self) -> &GlDevice {
        &self.device
    }

    /// Synchronize presentation with the display refresh, or not
    ///
    /// # Errors
    ///
    /// Returns `Error::BackendError` when the windowing system refuses the interval.
    pub fn set_vsync(&self, enabled: bool) -> Result<()> {
        let Some(context) = self.context.as_ref() else {
            gfx_bail!(SOURCE, "set_vsync on a torn down GL backend");
        };
        let interval = if enabled {
            SwapInterval::Wait(NonZeroU32::MIN)
        } else {
            SwapInterval::DontWait
        };
        self.surface
            .set_swap_interval(context, interval)
            .map_err(|e| gfx_err!(SOURCE, "Failed to set swap interval: {}", e))
    }
}

impl RenderBackend for GlBackend {
    fn name(&self) -> &'static str {
        if self.device.is_embedded {
            "opengles"
        } else {
            "opengl"
        }
    }

    fn create_texture(&mut self, width: u32, height: u32, internal_format: PixelFormat) -> Box<dyn Texture> {
        let texture = GlTexture::new(Rc::clone(&self.device), internal_format);
        gfx_debug!(SOURCE, "Created texture {} ({}x{}, {:?})", texture.id(), width, height, internal_format);
        Box::new(texture)
    }

    fn supports_labels(&self) -> bool {
        self.device.supports_labels
    }

    fn label_resource(&mut self, texture: &dyn Texture, label: &str) {
        let Some(name) = NonZeroU32::new(texture.id()) else {
            return;
        };
        unsafe {
            self.device.gl.object_label(glow::TEXTURE, name.get(), Some(label));
        }
        self.device.check_errors("glObjectLabel");
    }

    fn present(&mut self) -> Result<()> {
        let Some(context) = self.context.as_ref() else {
            gfx_bail!(SOURCE, "present on a torn down GL backend");
        };
        self.surface
            .swap_buffers(context)
            .map_err(|e| gfx_err!(SOURCE, "Failed to swap buffers: {}", e))
    }

    fn teardown(&mut self) {
        self.device.mark_dead();
        if let Some(context) = self.context.take() {
            if let Err(e) = context.make_not_current() {
                gfx_warn!(SOURCE, "Failed to release the GL context: {}", e);
            }
        }
        gfx_info!(SOURCE, "{} backend torn down", self.request.name());
    }
}
