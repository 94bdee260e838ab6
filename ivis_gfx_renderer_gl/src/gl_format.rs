/// Engine pixel formats to OpenGL format tokens

use ivis_gfx::ivis::render::PixelFormat;

/// GL token for `format`
///
/// Used both as the internal format of texture storage and as the client
/// format of upload buffers.
pub fn to_gl(format: PixelFormat) -> u32 {
    match format {
        PixelFormat::Rgba => glow::RGBA,
        PixelFormat::Rgb => glow::RGB,
        PixelFormat::CompressedRgba => glow::COMPRESSED_RGBA,
        PixelFormat::CompressedRgb => glow::COMPRESSED_RGB,
    }
}

/// Client component type of every upload and read-back buffer
pub const TEXEL_TYPE: u32 = glow::UNSIGNED_BYTE;

#[cfg(test)]
#[path = "gl_format_tests.rs"]
mod tests;
