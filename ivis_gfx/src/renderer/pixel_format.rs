/// Engine-level pixel formats

use crate::gfx_fatal;

/// Pixel format of texture storage or of an upload buffer
///
/// Closed set. Backends translate it to their own format tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 8-bit RGBA
    Rgba,
    /// 8-bit RGB
    Rgb,
    /// Driver-chosen compressed RGBA
    CompressedRgba,
    /// Driver-chosen compressed RGB
    CompressedRgb,
}

impl PixelFormat {
    /// Every format, in raw-code order
    pub const ALL: [PixelFormat; 4] = [
        PixelFormat::Rgba,
        PixelFormat::Rgb,
        PixelFormat::CompressedRgba,
        PixelFormat::CompressedRgb,
    ];

    /// Stable engine code of this format
    pub fn raw(self) -> u32 {
        match self {
            PixelFormat::Rgba => 0,
            PixelFormat::Rgb => 1,
            PixelFormat::CompressedRgba => 2,
            PixelFormat::CompressedRgb => 3,
        }
    }

    /// Convert an engine code back to a format
    ///
    /// # Panics
    ///
    /// An unknown code is a caller bug, not an environmental condition:
    /// it is logged at FATAL severity and the call panics.
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0 => PixelFormat::Rgba,
            1 => PixelFormat::Rgb,
            2 => PixelFormat::CompressedRgba,
            3 => PixelFormat::CompressedRgb,
            other => gfx_fatal!("ivis::PixelFormat", "Unrecognised pixel format: {}", other),
        }
    }

    /// Size of one texel in an upload buffer of this format
    ///
    /// `None` for compressed formats, whose size is block-based and driver-defined.
    pub fn bytes_per_texel(self) -> Option<usize> {
        match self {
            PixelFormat::Rgba => Some(4),
            PixelFormat::Rgb => Some(3),
            PixelFormat::CompressedRgba | PixelFormat::CompressedRgb => None,
        }
    }

    /// Returns true for driver-compressed formats
    pub fn is_compressed(self) -> bool {
        matches!(self, PixelFormat::CompressedRgba | PixelFormat::CompressedRgb)
    }

    /// Number of color channels
    pub fn channels(self) -> usize {
        match self {
            PixelFormat::Rgba | PixelFormat::CompressedRgba => 4,
            PixelFormat::Rgb | PixelFormat::CompressedRgb => 3,
        }
    }
}

#[cfg(test)]
#[path = "pixel_format_tests.rs"]
mod tests;
