/// Startup sequence: window, context negotiation, backend installation

use std::sync::Arc;

use glutin::config::{ConfigTemplateBuilder, GlConfig};
use glutin::display::{GetGlDisplay, GlDisplay};
use glutin_winit::{DisplayBuilder, GlWindow};
use ivis_gfx::ivis::negotiation::{ContextNegotiator, RequestLadder};
use ivis_gfx::ivis::render::NullBackend;
use ivis_gfx::ivis::{BackendType, Config, RenderContext, Result};
use ivis_gfx::{gfx_err, gfx_fatal, gfx_info, gfx_warn};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowAttributes};

use crate::gl_backend::GlBackend;
use crate::glutin_window_system::GlutinWindowSystem;

const SOURCE: &str = "ivis::gl::bootstrap";

/// Event loops a GL display can be built from
///
/// Mirrors the sealed `glutin_winit` event-loop trait, which cannot be named
/// from outside that crate.
pub trait GlutinEventLoop {
    #[doc(hidden)]
    fn build_display<Picker>(
        &self,
        builder: DisplayBuilder,
        template: ConfigTemplateBuilder,
        config_picker: Picker,
    ) -> std::result::Result<(Option<Window>, glutin::config::Config), Box<dyn std::error::Error>>
    where
        Picker: FnOnce(Box<dyn Iterator<Item = glutin::config::Config> + '_>) -> glutin::config::Config;
}

impl GlutinEventLoop for ActiveEventLoop {
    fn build_display<Picker>(
        &self,
        builder: DisplayBuilder,
        template: ConfigTemplateBuilder,
        config_picker: Picker,
    ) -> std::result::Result<(Option<Window>, glutin::config::Config), Box<dyn std::error::Error>>
    where
        Picker: FnOnce(Box<dyn Iterator<Item = glutin::config::Config> + '_>) -> glutin::config::Config,
    {
        builder.build(self, template, config_picker)
    }
}

impl<T> GlutinEventLoop for EventLoop<T> {
    fn build_display<Picker>(
        &self,
        builder: DisplayBuilder,
        template: ConfigTemplateBuilder,
        config_picker: Picker,
    ) -> std::result::Result<(Option<Window>, glutin::config::Config), Box<dyn std::error::Error>>
    where
        Picker: FnOnce(Box<dyn Iterator<Item = glutin::config::Config> + '_>) -> glutin::config::Config,
    {
        builder.build(self, template, config_picker)
    }
}

/// Bring the render context up on the current thread
///
/// Applies the log threshold of `config`, then:
/// - `BackendType::Null`: installs the null backend, no window is created
///   and `None` is returned.
/// - `BackendType::OpenGl`: creates the window (titled `config.app_name`), negotiates a context with
///   the ladder derived from `config`, installs a [`GlBackend`] and returns
///   the window.
///
/// # Errors
///
/// - `Error::NegotiationFailed` / `Error::CapabilityMissing` from negotiation
/// - `Error::BackendError` when the display, window or surface cannot be created
/// - `Error::InitializationFailed` when a render context is already active
///
/// # Example
///
/// ```no_run
/// use ivis_gfx::ivis::{Config, RenderContext};
/// use winit::event_loop::EventLoop;
/// use winit::window::Window;
///
/// let event_loop = EventLoop::new().unwrap();
/// let config = Config::default();
/// let attributes = Window::default_attributes();
/// let window = ivis_gfx_renderer_gl::bootstrap(&event_loop, attributes, &config)?;
/// assert!(window.is_some());
/// RenderContext::get().present()?;
/// # Ok::<(), ivis_gfx::ivis::Error>(())
/// ```
pub fn bootstrap(
    event_loop: &impl GlutinEventLoop,
    window_attributes: WindowAttributes,
    config: &Config,
) -> Result<Option<Arc<Window>>> {
    match config.backend {
        BackendType::Null => bootstrap_headless(config).map(|()| None),
        BackendType::OpenGl => {
            RenderContext::set_min_severity(config.min_log_severity);
            bootstrap_gl(event_loop, window_attributes, config).map(Some)
        }
    }
}

/// Bring the render context up on the null backend, without any window
///
/// Used for dedicated servers and tools. The backend in `config` is ignored.
///
/// # Errors
///
/// Returns `Error::InitializationFailed` when a render context is already active.
pub fn bootstrap_headless(config: &Config) -> Result<()> {
    RenderContext::set_min_severity(config.min_log_severity);
    RenderContext::initialize(NullBackend::new())
}

fn bootstrap_gl(
    event_loop: &impl GlutinEventLoop,
    window_attributes: WindowAttributes,
    config: &Config,
) -> Result<Arc<Window>> {
    let template = ConfigTemplateBuilder::new()
        .with_depth_size(24)
        .with_stencil_size(8)
        .with_single_buffering(false);

    let display_builder =
        DisplayBuilder::new().with_window_attributes(Some(window_attributes.with_title(config.app_name.clone())));
    let (window, gl_config) = event_loop
        .build_display(display_builder, template, |configs| {
            configs
                .max_by_key(|candidate| (candidate.depth_size(), candidate.stencil_size()))
                .unwrap_or_else(|| gfx_fatal!(SOURCE, "Display offered no GL config"))
        })
        .map_err(|e| gfx_err!(SOURCE, "Failed to create the GL display: {}", e))?;

    let window = Arc::new(window.ok_or_else(|| gfx_err!(SOURCE, "Display builder returned no window"))?);

    let surface_attributes = window
        .build_surface_attributes(Default::default())
        .map_err(|e| gfx_err!(SOURCE, "Failed to get the window handle: {}", e))?;
    let surface = unsafe { gl_config.display().create_window_surface(&gl_config, &surface_attributes) }
        .map_err(|e| gfx_err!(SOURCE, "Failed to create the window surface: {}", e))?;

    let mut window_system = GlutinWindowSystem::new(Arc::clone(&window), gl_config.clone(), surface);
    let mut negotiator = ContextNegotiator::new(RequestLadder::from_config(config));
    let negotiated = negotiator.run(&mut window_system)?;
    let (surface, window) = window_system.into_parts();

    let display = gl_config.display();
    let gl = unsafe { glow::Context::from_loader_function_cstr(|name| display.get_proc_address(name)) };

    let backend = GlBackend::new(gl, negotiated.context, surface, Arc::clone(&window), negotiated.request);
    if let Err(e) = backend.set_vsync(config.vsync) {
        gfx_warn!(SOURCE, "Continuing without the requested swap interval: {}", e);
    }
    RenderContext::initialize(backend)?;

    gfx_info!(SOURCE, "Rendering with {}", negotiated.request);
    Ok(window)
}
