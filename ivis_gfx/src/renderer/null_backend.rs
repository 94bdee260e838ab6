/// Null backend - headless software implementation of RenderBackend
///
/// Keeps every texture level in CPU memory. Used for dedicated servers,
/// headless tools and tests: it mimics the implicit state of a GL-like
/// driver (one "current texture" slot, handles allocated from 1) and rejects
/// malformed calls the way a driver would, by logging and ignoring them.
///
/// The generic compressed formats are stored uncompressed, which a GL
/// driver is also allowed to do.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::error::Result;
use crate::renderer::{
    full_mip_chain_len, PixelFormat, RenderBackend, ResourceId, Texture,
};
use crate::{gfx_debug, gfx_error, gfx_fatal, gfx_trace, gfx_warn};

const SOURCE: &str = "ivis::null";

/// A 32-bit extent never has more levels than this
const MAX_MIP_LEVELS: u32 = 32;

// ============================================================================
// Device state
// ============================================================================

/// State shared by the backend and every texture it created
#[derive(Debug, Default)]
struct NullDevice {
    /// False once the owning render context was shut down
    alive: bool,
    next_id: ResourceId,
    bound: Option<ResourceId>,
    labels: HashMap<ResourceId, String>,
    live: HashSet<ResourceId>,
    released: Vec<ResourceId>,
    frames_presented: u64,
}

type SharedDevice = Rc<RefCell<NullDevice>>;

fn ensure_alive(device: &SharedDevice, operation: &str, id: ResourceId) {
    if !device.borrow().alive {
        gfx_fatal!(SOURCE,
            "Texture {} used ({}) after its render context was shut down", id, operation);
    }
}

// ============================================================================
// Backend
// ============================================================================

/// Headless software backend
pub struct NullBackend {
    device: SharedDevice,
}

impl NullBackend {
    /// Create a live null backend
    pub fn new() -> Self {
        let device = NullDevice {
            alive: true,
            next_id: 1,
            ..Default::default()
        };
        gfx_debug!(SOURCE, "Null backend created");
        Self { device: Rc::new(RefCell::new(device)) }
    }

    /// Read-only view on the device state, usable after the backend moved
    /// into the render context
    pub fn probe(&self) -> NullProbe {
        NullProbe { device: Rc::clone(&self.device) }
    }
}

impl Default for NullBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderBackend for NullBackend {
    fn name(&self) -> &'static str {
        "null"
    }

    fn create_texture(&mut self, width: u32, height: u32, internal_format: PixelFormat) -> Box<dyn Texture> {
        let id = {
            let mut device = self.device.borrow_mut();
            if !device.alive {
                gfx_fatal!(SOURCE, "create_texture called on a torn down null backend");
            }
            let id = device.next_id;
            device.next_id = id
                .checked_add(1)
                .unwrap_or_else(|| gfx_fatal!(SOURCE, "Texture handle space exhausted"));
            device.live.insert(id);
            id
        };

        gfx_trace!(SOURCE, "Created texture {} ({}x{}, {:?})", id, width, height, internal_format);

        Box::new(NullTexture {
            device: Rc::clone(&self.device),
            id,
            internal_format,
            levels: Vec::new(),
            released: false,
        })
    }

    fn supports_labels(&self) -> bool {
        true
    }

    fn label_resource(&mut self, texture: &dyn Texture, label: &str) {
        self.device.borrow_mut().labels.insert(texture.id(), label.to_string());
    }

    fn present(&mut self) -> Result<()> {
        self.device.borrow_mut().frames_presented += 1;
        Ok(())
    }

    fn teardown(&mut self) {
        let mut device = self.device.borrow_mut();
        if !device.live.is_empty() {
            gfx_warn!(SOURCE, "Tearing down with {} texture(s) still alive", device.live.len());
        }
        device.alive = false;
        device.bound = None;
    }
}

/// Inspection handle on a [`NullBackend`]
#[derive(Clone)]
pub struct NullProbe {
    device: SharedDevice,
}

impl NullProbe {
    /// Handle of the currently bound texture
    pub fn bound_texture(&self) -> Option<ResourceId> {
        self.device.borrow().bound
    }

    /// Debug label attached to a texture
    pub fn label(&self, id: ResourceId) -> Option<String> {
        self.device.borrow().labels.get(&id).cloned()
    }

    /// Number of textures created and not yet released
    pub fn live_texture_count(&self) -> usize {
        self.device.borrow().live.len()
    }

    /// Handles released so far, in release order
    pub fn released(&self) -> Vec<ResourceId> {
        self.device.borrow().released.clone()
    }

    /// Number of `present` calls
    pub fn frames_presented(&self) -> u64 {
        self.device.borrow().frames_presented
    }

    /// False once the backend was torn down
    pub fn is_alive(&self) -> bool {
        self.device.borrow().alive
    }
}

// ============================================================================
// Texture
// ============================================================================

/// One stored mip level, texels laid out in the texture's storage channels
#[derive(Debug, Clone)]
struct NullLevel {
    width: u32,
    height: u32,
    texels: Vec<u8>,
}

/// Texture of the null backend
pub struct NullTexture {
    device: SharedDevice,
    id: ResourceId,
    internal_format: PixelFormat,
    levels: Vec<Option<NullLevel>>,
    released: bool,
}

impl NullTexture {
    fn storage_channels(&self) -> usize {
        self.internal_format.channels()
    }

    fn level(&self, mip_level: u32) -> Option<&NullLevel> {
        self.levels.get(mip_level as usize).and_then(Option::as_ref)
    }

    fn set_level(&mut self, mip_level: u32, level: NullLevel) {
        let index = mip_level as usize;
        if self.levels.len() <= index {
            self.levels.resize(index + 1, None);
        }
        self.levels[index] = Some(level);
    }

    /// Convert `count` texels from `from` channels to `to` channels
    fn convert(data: &[u8], count: usize, from: usize, to: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(count * to);
        for texel in data.chunks_exact(from).take(count) {
            for channel in 0..to {
                out.push(if channel < from { texel[channel] } else { 255 });
            }
        }
        out
    }

    /// Validate an incoming buffer, returns its channel count
    fn check_buffer(&self, operation: &str, width: u32, height: u32, buffer_format: PixelFormat, data: &[u8]) -> Option<usize> {
        let Some(bpt) = buffer_format.bytes_per_texel() else {
            gfx_error!(SOURCE, "{} on texture {}: {:?} is not a valid buffer format",
                operation, self.id, buffer_format);
            return None;
        };
        if width == 0 || height == 0 {
            gfx_error!(SOURCE, "{} on texture {}: empty extent {}x{}", operation, self.id, width, height);
            return None;
        }
        let needed = width as usize * height as usize * bpt;
        if data.len() < needed {
            gfx_error!(SOURCE, "{} on texture {}: buffer holds {} bytes, {} needed",
                operation, self.id, data.len(), needed);
            return None;
        }
        Some(bpt)
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        let mut device = self.device.borrow_mut();
        if !device.alive {
            gfx_error!(SOURCE,
                "Texture {} outlived its render context, handle not released", self.id);
            return;
        }
        if device.bound == Some(self.id) {
            device.bound = None;
        }
        device.live.remove(&self.id);
        device.labels.remove(&self.id);
        device.released.push(self.id);
        gfx_trace!(SOURCE, "Released texture {}", self.id);
    }

    fn downsample(source: &NullLevel, channels: usize) -> NullLevel {
        let width = (source.width / 2).max(1);
        let height = (source.height / 2).max(1);
        let mut texels = Vec::with_capacity(width as usize * height as usize * channels);

        for y in 0..height {
            for x in 0..width {
                let x0 = (x * 2).min(source.width - 1);
                let x1 = (x * 2 + 1).min(source.width - 1);
                let y0 = (y * 2).min(source.height - 1);
                let y1 = (y * 2 + 1).min(source.height - 1);
                for channel in 0..channels {
                    let sample = |sx: u32, sy: u32| {
                        source.texels[(sy as usize * source.width as usize + sx as usize) * channels + channel] as u32
                    };
                    let sum = sample(x0, y0) + sample(x1, y0) + sample(x0, y1) + sample(x1, y1);
                    texels.push(((sum + 2) / 4) as u8);
                }
            }
        }

        NullLevel { width, height, texels }
    }
}

impl Texture for NullTexture {
    fn bind(&self) {
        ensure_alive(&self.device, "bind", self.id);
        self.device.borrow_mut().bound = Some(self.id);
    }

    fn upload(&mut self, mip_level: u32, width: u32, height: u32, buffer_format: PixelFormat, data: &[u8]) {
        self.bind();
        if mip_level >= MAX_MIP_LEVELS {
            gfx_error!(SOURCE, "upload on texture {}: mip level {} out of range (max {})",
                self.id, mip_level, MAX_MIP_LEVELS - 1);
            return;
        }
        let Some(bpt) = self.check_buffer("upload", width, height, buffer_format, data) else {
            return;
        };
        let count = width as usize * height as usize;
        let texels = Self::convert(data, count, bpt, self.storage_channels());
        self.set_level(mip_level, NullLevel { width, height, texels });
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
        let Some(bpt) = self.check_buffer("update_subrect", width, height, buffer_format, data) else {
            return;
        };
        let channels = self.storage_channels();
        let id = self.id;

        let Some(Some(level)) = self.levels.get_mut(mip_level as usize) else {
            gfx_error!(SOURCE, "update_subrect on texture {}: mip level {} was never uploaded", id, mip_level);
            return;
        };
        let fits_x = offset_x.checked_add(width).is_some_and(|end| end <= level.width);
        let fits_y = offset_y.checked_add(height).is_some_and(|end| end <= level.height);
        if !fits_x || !fits_y {
            gfx_error!(SOURCE,
                "update_subrect on texture {}: rectangle {}x{}+{}+{} exceeds level {} ({}x{})",
                id, width, height, offset_x, offset_y, mip_level, level.width, level.height);
            return;
        }

        let rows = Self::convert(data, width as usize * height as usize, bpt, channels);
        let row_len = width as usize * channels;
        for (row, src) in rows.chunks_exact(row_len).enumerate() {
            let start = ((offset_y as usize + row) * level.width as usize + offset_x as usize) * channels;
            level.texels[start..start + row_len].copy_from_slice(src);
        }
    }

    fn generate_mip_levels(&mut self) {
        self.bind();
        let Some(base) = self.level(0).cloned() else {
            gfx_error!(SOURCE, "generate_mip_levels on texture {}: level 0 was never uploaded", self.id);
            return;
        };

        let channels = self.storage_channels();
        let chain = full_mip_chain_len(base.width, base.height);
        let mut previous = base;
        for level in 1..chain {
            let next = Self::downsample(&previous, channels);
            self.set_level(level, next.clone());
            previous = next;
        }
        self.levels.truncate(chain as usize);
    }

    fn id(&self) -> ResourceId {
        self.id
    }

    fn internal_format(&self) -> PixelFormat {
        self.internal_format
    }

    fn mip_level_count(&self) -> u32 {
        self.levels.iter().filter(|level| level.is_some()).count() as u32
    }

    fn read_back(&self, mip_level: u32, buffer_format: PixelFormat) -> Option<Vec<u8>> {
        ensure_alive(&self.device, "read_back", self.id);
        let target = buffer_format.bytes_per_texel()?;
        let level = self.level(mip_level)?;
        let count = level.width as usize * level.height as usize;
        Some(Self::convert(&level.texels, count, self.storage_channels(), target))
    }

    fn destroy(mut self: Box<Self>) {
        self.release();
    }
}

impl Drop for NullTexture {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
#[path = "null_backend_tests.rs"]
mod tests;
