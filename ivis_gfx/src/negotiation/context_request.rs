//! Context requests and the fallback ladder
//!
//! A `ContextRequest` names one context configuration the window system can
//! be asked for. The ladder walks them in a fixed preference order, most
//! capable desktop profile first, least capable embedded profile last.

use std::fmt;

use bitflags::bitflags;

use crate::config::Config;

/// Profile kind of a rendering context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileKind {
    /// Desktop core profile (no deprecated functionality)
    Core,
    /// Desktop compatibility profile
    Compatibility,
    /// Embedded (ES) profile
    Embedded,
}

bitflags! {
    /// Context creation flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ContextFlags: u32 {
        /// Debug context (enables driver debug output)
        const DEBUG = 1 << 0;
        /// Forward-compatible context (deprecated functionality removed)
        const FORWARD_COMPATIBLE = 1 << 1;
        /// Robust buffer access
        const ROBUST_ACCESS = 1 << 2;
    }
}

/// One context configuration, in ladder order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextRequest {
    /// OpenGL 3.2+ core profile
    DesktopCore,
    /// OpenGL 2.1 compatibility profile
    DesktopCompat21,
    /// OpenGL ES 3.0
    Embedded30,
    /// OpenGL ES 2.0
    Embedded20,
}

impl ContextRequest {
    /// Every request, in preference order
    pub const LADDER: [ContextRequest; 4] = [
        ContextRequest::DesktopCore,
        ContextRequest::DesktopCompat21,
        ContextRequest::Embedded30,
        ContextRequest::Embedded20,
    ];

    /// Requested (major, minor) version
    pub fn version(self) -> (u8, u8) {
        match self {
            ContextRequest::DesktopCore => (3, 2),
            ContextRequest::DesktopCompat21 => (2, 1),
            ContextRequest::Embedded30 => (3, 0),
            ContextRequest::Embedded20 => (2, 0),
        }
    }

    /// Requested profile kind
    pub fn profile(self) -> ProfileKind {
        match self {
            ContextRequest::DesktopCore => ProfileKind::Core,
            ContextRequest::DesktopCompat21 => ProfileKind::Compatibility,
            ContextRequest::Embedded30 | ContextRequest::Embedded20 => ProfileKind::Embedded,
        }
    }

    /// Flags this request always carries
    pub fn flags(self) -> ContextFlags {
        match self {
            ContextRequest::DesktopCore => ContextFlags::FORWARD_COMPATIBLE,
            _ => ContextFlags::empty(),
        }
    }

    /// Returns true for embedded (ES) profiles
    pub fn is_embedded(self) -> bool {
        self.profile() == ProfileKind::Embedded
    }

    /// Human readable name
    pub fn name(self) -> &'static str {
        match self {
            ContextRequest::DesktopCore => "OpenGL Core",
            ContextRequest::DesktopCompat21 => "OpenGL 2.1 Compatibility",
            ContextRequest::Embedded30 => "OpenGL ES 3.0",
            ContextRequest::Embedded20 => "OpenGL ES 2.0",
        }
    }

    /// Full attribute set handed to the window system
    pub fn attributes(self, extra_flags: ContextFlags) -> ContextAttributes {
        let (major, minor) = self.version();
        ContextAttributes {
            request: self,
            major,
            minor,
            profile: self.profile(),
            flags: self.flags() | extra_flags,
        }
    }
}

impl fmt::Display for ContextRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Attributes of one context creation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextAttributes {
    /// Request these attributes were derived from
    pub request: ContextRequest,
    /// Major version
    pub major: u8,
    /// Minor version
    pub minor: u8,
    /// Profile kind
    pub profile: ProfileKind,
    /// Creation flags
    pub flags: ContextFlags,
}

// ============================================================================
// Ladder
// ============================================================================

/// Ordered list of requests plus a cursor
///
/// The ladder only moves forward. Once the cursor runs past the last entry
/// it is exhausted for good.
#[derive(Debug, Clone)]
pub struct RequestLadder {
    requests: Vec<ContextRequest>,
    cursor: usize,
    extra_flags: ContextFlags,
}

impl RequestLadder {
    /// Full ladder, starting at the most capable desktop profile
    pub fn new() -> Self {
        Self::from_requests(ContextRequest::LADDER.to_vec())
    }

    /// Ladder restricted to embedded profiles
    pub fn embedded_only() -> Self {
        Self::from_requests(
            ContextRequest::LADDER
                .iter()
                .copied()
                .filter(|request| request.is_embedded())
                .collect(),
        )
    }

    /// Ladder matching a configuration
    pub fn from_config(config: &Config) -> Self {
        let ladder = if config.prefer_embedded {
            Self::embedded_only()
        } else {
            Self::new()
        };
        let mut flags = ContextFlags::empty();
        flags.set(ContextFlags::DEBUG, config.debug_context);
        flags.set(ContextFlags::ROBUST_ACCESS, config.robust_access);
        ladder.with_extra_flags(flags)
    }

    /// Ladder over an explicit list; order is kept as given
    pub fn from_requests(requests: Vec<ContextRequest>) -> Self {
        Self {
            requests,
            cursor: 0,
            extra_flags: ContextFlags::empty(),
        }
    }

    /// Add flags to every request of the ladder
    pub fn with_extra_flags(mut self, flags: ContextFlags) -> Self {
        self.extra_flags |= flags;
        self
    }

    /// Request under the cursor, `None` once exhausted
    pub fn current(&self) -> Option<ContextRequest> {
        self.requests.get(self.cursor).copied()
    }

    /// Attributes for the request under the cursor
    pub fn current_attributes(&self) -> Option<ContextAttributes> {
        self.current().map(|request| request.attributes(self.extra_flags))
    }

    /// Move to the next request and return it
    pub fn advance(&mut self) -> Option<ContextRequest> {
        if self.cursor < self.requests.len() {
            self.cursor += 1;
        }
        self.current()
    }

    /// Returns true once every request was consumed
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.requests.len()
    }

    /// Every request of the ladder, in order
    pub fn requests(&self) -> &[ContextRequest] {
        &self.requests
    }

    /// Number of requests
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// Returns true for a ladder without any request
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

impl Default for RequestLadder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "context_request_tests.rs"]
mod tests;
