//! Error types for the IVIS graphics layer
//!
//! Only environmental failures are represented here. Contract violations
//! (programmer errors) never produce an `Error`, they go through `gfx_fatal!`.

use std::fmt;

use crate::negotiation::{AttemptFailure, ContextRequest};

/// Result type for graphics layer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Graphics layer errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (GL, windowing system, ...)
    BackendError(String),

    /// Initialization failed (render context, backend)
    InitializationFailed(String),

    /// Every context request of the ladder was refused
    NegotiationFailed {
        /// One entry per attempted request, in attempt order
        attempts: Vec<AttemptFailure>,
    },

    /// A context was created but lacks a mandatory capability
    CapabilityMissing {
        /// Request the context was created under
        request: ContextRequest,
        /// What was missing, and how it was detected
        detail: String,
    },
}

impl Error {
    /// Concatenated per-attempt log of a failed negotiation, one line per attempt
    ///
    /// Empty for every other variant.
    pub fn attempt_log(&self) -> String {
        match self {
            Error::NegotiationFailed { attempts } => attempts
                .iter()
                .map(|attempt| format!("{}\n", attempt))
                .collect(),
            _ => String::new(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::NegotiationFailed { attempts } => {
                write!(f, "No rendering context could be created ({} attempts)", attempts.len())?;
                for attempt in attempts {
                    write!(f, "\n  {}", attempt)?;
                }
                Ok(())
            }
            Error::CapabilityMissing { request, detail } => {
                write!(f, "{} context lacks a required capability: {}", request.name(), detail)
            }
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
