/// Texture trait and texture info

use crate::renderer::PixelFormat;

/// Opaque backend handle of a GPU resource
///
/// Only meant for diagnostics and debug tooling, never for aliasing
/// a resource through another object.
pub type ResourceId = u32;

/// GPU texture resource
///
/// Implemented by backend-specific texture types (e.g. `GlTexture`).
///
/// A texture exclusively owns one backend handle. The handle is released
/// exactly once, either by [`Texture::destroy`] or when the value is dropped.
/// Textures are move-only: there is no way to clone or share one.
///
/// Every mutating operation binds the texture first. Backends keep a single
/// implicit "current texture" slot, so callers must not assume that a texture
/// stays bound across calls on another texture.
///
/// Operating on a texture after the render context that created it has been
/// shut down is a contract violation and panics.
pub trait Texture {
    /// Make this texture the current 2D image target of the backend
    fn bind(&self);

    /// Replace the whole image at `mip_level`
    ///
    /// `data` is interpreted as `buffer_format` and stored in the texture's
    /// internal format. It must hold at least
    /// `width * height * buffer_format.bytes_per_texel()` bytes for
    /// uncompressed formats. No validation happens at this layer; the backend
    /// rejects malformed calls.
    fn upload(&mut self, mip_level: u32, width: u32, height: u32, buffer_format: PixelFormat, data: &[u8]);

    /// Replace a rectangle of an existing image at `mip_level`
    ///
    /// The level must have been created by a previous [`Texture::upload`].
    fn update_subrect(
        &mut self,
        mip_level: u32,
        offset_x: u32,
        offset_y: u32,
        width: u32,
        height: u32,
        buffer_format: PixelFormat,
        data: &[u8],
    );

    /// Derive the full mip chain from level 0 with the backend's default filter
    fn generate_mip_levels(&mut self);

    /// Opaque backend handle, for diagnostics only
    fn id(&self) -> ResourceId;

    /// Storage format, fixed at creation
    fn internal_format(&self) -> PixelFormat;

    /// Number of populated mip levels known to this texture
    fn mip_level_count(&self) -> u32;

    /// Read the image at `mip_level` back as `buffer_format`
    ///
    /// Returns `None` when the backend cannot read textures back
    /// (OpenGL ES) or the level does not exist.
    fn read_back(&self, mip_level: u32, buffer_format: PixelFormat) -> Option<Vec<u8>>;

    /// Release the backend handle now
    ///
    /// Consumes the texture, so a second release cannot be expressed.
    fn destroy(self: Box<Self>);
}

/// Size of mip level `level` of an image whose level 0 is `width` x `height`
pub fn mip_extent(width: u32, height: u32, level: u32) -> (u32, u32) {
    let shift = level.min(31);
    ((width >> shift).max(1), (height >> shift).max(1))
}

/// Number of levels of a full mip chain for a `width` x `height` base image
pub fn full_mip_chain_len(width: u32, height: u32) -> u32 {
    let largest = width.max(height).max(1);
    32 - largest.leading_zeros()
}
