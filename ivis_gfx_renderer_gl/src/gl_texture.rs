/// GlTexture - OpenGL implementation of the Texture trait

use std::rc::Rc;

use glow::HasContext;
use ivis_gfx::ivis::render::{full_mip_chain_len, mip_extent, PixelFormat, ResourceId, Texture};
use ivis_gfx::{gfx_error, gfx_fatal, gfx_trace};

use crate::gl_device::GlDevice;
use crate::gl_format::{to_gl, TEXEL_TYPE};

const SOURCE: &str = "ivis::gl::Texture";

/// OpenGL 2D texture
pub struct GlTexture {
    /// Shared GL device (for cleanup)
    device: Rc<GlDevice>,
    /// GL texture object
    handle: glow::Texture,
    internal_format: PixelFormat,
    /// Extent of each defined mip level
    levels: Vec<Option<(u32, u32)>>,
    released: bool,
}

impl GlTexture {
    /// Allocate a texture object
    ///
    /// # Panics
    ///
    /// The driver refusing a texture name is not recoverable.
    pub(crate) fn new(device: Rc<GlDevice>, internal_format: PixelFormat) -> Self {
        if !device.is_alive() {
            gfx_fatal!(SOURCE, "Texture creation after the render context was shut down");
        }
        let handle = unsafe { device.gl.create_texture() }
            .unwrap_or_else(|reason| gfx_fatal!(SOURCE, "glGenTextures failed: {}", reason));

        Self {
            device,
            handle,
            internal_format,
            levels: Vec::new(),
            released: false,
        }
    }

    fn ensure_alive(&self, operation: &str) {
        if !self.device.is_alive() {
            gfx_fatal!(SOURCE,
                "Texture {} used ({}) after its render context was shut down", self.id(), operation);
        }
    }

    fn set_level(&mut self, mip_level: u32, extent: (u32, u32)) {
        let index = mip_level as usize;
        if self.levels.len() <= index {
            self.levels.resize(index + 1, None);
        }
        self.levels[index] = Some(extent);
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        if !self.device.is_alive() {
            gfx_error!(SOURCE,
                "Texture {} outlived its render context, handle not released", self.id());
            return;
        }
        unsafe { self.device.gl.delete_texture(self.handle) };
        gfx_trace!(SOURCE, "Released texture {}", self.id());
    }
}

impl Texture for GlTexture {
    fn bind(&self) {
        self.ensure_alive("bind");
        unsafe { self.device.gl.bind_texture(glow::TEXTURE_2D, Some(self.handle)) };
    }

    fn upload(&mut self, mip_level: u32, width: u32, height: u32, buffer_format: PixelFormat, data: &[u8]) {
        self.bind();
        unsafe {
            self.device.gl.tex_image_2d(
                glow::TEXTURE_2D,
                mip_level as i32,
                to_gl(self.internal_format) as i32,
                width as i32,
                height as i32,
                0,
                to_gl(buffer_format),
                TEXEL_TYPE,
                glow::PixelUnpackData::Slice(Some(data)),
            );
        }
        if self.device.check_errors("glTexImage2D") {
            self.set_level(mip_level, (width, height));
        }
    }

    fn update_subrect(
        &mut self,
        mip_level: u32,
        offset_x: u32,
        offset_y: u32,
        width: u32,
        height: u32,
        buffer_format: PixelFormat,
        data: &[u8],
    ) {
        self.bind();
        unsafe {
            self.device.gl.tex_sub_image_2d(
                glow::TEXTURE_2D,
                mip_level as i32,
                offset_x as i32,
                offset_y as i32,
                width as i32,
                height as i32,
                to_gl(buffer_format),
                TEXEL_TYPE,
                glow::PixelUnpackData::Slice(Some(data)),
            );
        }
        self.device.check_errors("glTexSubImage2D");
    }

    fn generate_mip_levels(&mut self) {
        self.bind();
        let Some(Some((width, height))) = self.levels.first().copied() else {
            gfx_error!(SOURCE, "generate_mip_levels on texture {}: level 0 was never uploaded", self.id());
            return;
        };

        unsafe { self.device.gl.generate_mipmap(glow::TEXTURE_2D) };
        if !self.device.check_errors("glGenerateMipmap") {
            return;
        }

        let chain = full_mip_chain_len(width, height);
        for level in 1..chain {
            self.set_level(level, mip_extent(width, height, level));
        }
        self.levels.truncate(chain as usize);
    }

    fn id(&self) -> ResourceId {
        self.handle.0.get()
    }

    fn internal_format(&self) -> PixelFormat {
        self.internal_format
    }

    fn mip_level_count(&self) -> u32 {
        self.levels.iter().filter(|level| level.is_some()).count() as u32
    }

    fn read_back(&self, mip_level: u32, buffer_format: PixelFormat) -> Option<Vec<u8>> {
        self.ensure_alive("read_back");
        if !self.device.supports_read_back {
            return None;
        }
        let bytes_per_texel = buffer_format.bytes_per_texel()?;
        let (width, height) = self.levels.get(mip_level as usize).copied().flatten()?;

        let mut pixels = vec![0u8; width as usize * height as usize * bytes_per_texel];
        self.bind();
        unsafe {
            self.device.gl.get_tex_image(
                glow::TEXTURE_2D,
                mip_level as i32,
                to_gl(buffer_format),
                TEXEL_TYPE,
                glow::PixelPackData::Slice(Some(&mut pixels)),
            );
        }
        self.device.check_errors("glGetTexImage").then_some(pixels)
    }

    fn destroy(mut self: Box<Self>) {
        self.release();
    }
}

impl Drop for GlTexture {
    fn drop(&mut self) {
        self.release();
    }
}
