/// ContextNegotiator - one-shot startup protocol picking a context profile
///
/// Walks a `RequestLadder` against a `WindowSystem` until a context is
/// created or the ladder is exhausted, then checks the mandatory
/// capability (double buffered presentation) and logs diagnostics.

use std::fmt;

use crate::error::{Error, Result};
use crate::negotiation::{ContextAttribute, ContextRequest, RequestLadder, WindowSystem};
use crate::{gfx_debug, gfx_error, gfx_fatal, gfx_info};

const SOURCE: &str = "ivis::negotiation";

/// State of the negotiation protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationState {
    /// `run` was not called yet
    NotStarted,
    /// Creation under this request is in progress
    Attempting(ContextRequest),
    /// A context was created under this request (terminal)
    ///
    /// Reached before capability validation: `run` can still fail with
    /// `Error::CapabilityMissing` from this state.
    Succeeded(ContextRequest),
    /// Every request failed (terminal)
    Exhausted,
}

impl NegotiationState {
    /// Returns true for `Succeeded` and `Exhausted`
    pub fn is_terminal(&self) -> bool {
        matches!(self, NegotiationState::Succeeded(_) | NegotiationState::Exhausted)
    }
}

/// One refused context creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptFailure {
    /// Request that was refused
    pub request: ContextRequest,
    /// Error text reported by the window system
    pub reason: String,
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to create an {} context! [{}]", self.request.name(), self.reason)
    }
}

/// Successful negotiation result
#[derive(Debug)]
pub struct NegotiatedContext<C> {
    /// Live context
    pub context: C,
    /// Request the context was created under
    pub request: ContextRequest,
    /// Attempts refused before this one, in order
    pub failed_attempts: Vec<AttemptFailure>,
    /// Double buffering as reported, `None` when the query failed (embedded only)
    pub double_buffered: Option<bool>,
    /// Depth buffer bits, when readable
    pub depth_bits: Option<i32>,
    /// Stencil buffer bits, when readable
    pub stencil_bits: Option<i32>,
    /// Logical surface size, when known
    pub surface_size: Option<(u32, u32)>,
}

impl<C> NegotiatedContext<C> {
    /// Returns true when the context runs an embedded profile
    pub fn is_embedded(&self) -> bool {
        self.request.is_embedded()
    }
}

/// Context negotiation protocol
///
/// # Example
///
/// ```no_run
/// use ivis_gfx::ivis::negotiation::{ContextNegotiator, RequestLadder};
/// # fn demo<W: ivis_gfx::ivis::negotiation::WindowSystem>(window_system: &mut W) -> ivis_gfx::ivis::Result<()> {
/// let mut negotiator = ContextNegotiator::new(RequestLadder::new());
/// let negotiated = negotiator.run(window_system)?;
/// println!("running on {}", negotiated.request);
/// # Ok(())
/// # }
/// ```
pub struct ContextNegotiator {
    ladder: RequestLadder,
    state: NegotiationState,
    issued: Vec<ContextRequest>,
    failures: Vec<AttemptFailure>,
}

impl ContextNegotiator {
    /// Create a negotiator over `ladder`
    pub fn new(ladder: RequestLadder) -> Self {
        Self {
            ladder,
            state: NegotiationState::NotStarted,
            issued: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Current protocol state
    pub fn state(&self) -> NegotiationState {
        self.state
    }

    /// Requests handed to the window system so far, in order
    pub fn issued_requests(&self) -> &[ContextRequest] {
        &self.issued
    }

    /// Refused attempts so far, in order
    pub fn failures(&self) -> &[AttemptFailure] {
        &self.failures
    }

    /// Run the protocol
    ///
    /// # Errors
    ///
    /// - `Error::NegotiationFailed` when every request was refused, listing
    ///   each attempt in order
    /// - `Error::CapabilityMissing` when a desktop context lacks double
    ///   buffering (embedded contexts only log it)
    ///
    /// # Panics
    ///
    /// A negotiator runs once. Calling `run` again is a contract violation.
    pub fn run<W: WindowSystem>(&mut self, window_system: &mut W) -> Result<NegotiatedContext<W::Context>> {
        if self.state != NegotiationState::NotStarted {
            gfx_fatal!(SOURCE, "Context negotiation already ran (state: {:?})", self.state);
        }

        let (request, context) = loop {
            let Some(attributes) = self.ladder.current_attributes() else {
                self.state = NegotiationState::Exhausted;
                let error = Error::NegotiationFailed { attempts: self.failures.clone() };
                gfx_error!(SOURCE, "{}", error);
                return Err(error);
            };

            let request = attributes.request;
            self.state = NegotiationState::Attempting(request);
            self.issued.push(request);

            match window_system.create_raw_context(&attributes) {
                Ok(context) => {
                    self.state = NegotiationState::Succeeded(request);
                    break (request, context);
                }
                Err(reason) => {
                    let failure = AttemptFailure { request, reason };
                    gfx_debug!(SOURCE, "{}", failure);
                    self.failures.push(failure);
                    self.ladder.advance();
                }
            }
        };

        if !self.failures.is_empty() {
            let log: Vec<String> = self.failures.iter().map(ToString::to_string).collect();
            gfx_debug!(SOURCE, "Context creation succeeded after {} refused attempt(s):\n{}",
                self.failures.len(), log.join("\n"));
        }
        gfx_info!(SOURCE, "Requested {} context", request.name());

        let double_buffered = Self::check_double_buffering(window_system, &context, request)?;

        let depth_bits = Self::read_diagnostic(window_system, &context, ContextAttribute::DepthSize);
        let stencil_bits = Self::read_diagnostic(window_system, &context, ContextAttribute::StencilSize);

        let surface_size = window_system.surface_size();
        match surface_size {
            Some((width, height)) => gfx_info!(SOURCE, "Logical surface size: {} x {}", width, height),
            None => gfx_info!(SOURCE, "Logical surface size: unknown"),
        }

        Ok(NegotiatedContext {
            context,
            request,
            failed_attempts: self.failures.clone(),
            double_buffered,
            depth_bits,
            stencil_bits,
            surface_size,
        })
    }

    /// Desktop profiles must be double buffered, embedded ones only log the shortfall
    fn check_double_buffering<W: WindowSystem>(
        window_system: &W,
        context: &W::Context,
        request: ContextRequest,
    ) -> Result<Option<bool>> {
        let (detail, reported) = match window_system.query_attribute(context, ContextAttribute::DoubleBuffer) {
            Ok(0) => ("context did not give double buffering (DOUBLEBUFFER = 0)".to_string(), Some(false)),
            Ok(_) => return Ok(Some(true)),
            Err(reason) => (format!("failed to get value for DOUBLEBUFFER ({})", reason), None),
        };

        if request.is_embedded() {
            gfx_error!(SOURCE,
                "{} context: {}. Double buffering is required, rendering may fail if it is not actually enabled",
                request.name(), detail);
            Ok(reported)
        } else {
            gfx_error!(SOURCE, "{} context: {}. Double buffering is required", request.name(), detail);
            Err(Error::CapabilityMissing { request, detail })
        }
    }

    fn read_diagnostic<W: WindowSystem>(
        window_system: &W,
        context: &W::Context,
        attribute: ContextAttribute,
    ) -> Option<i32> {
        match window_system.query_attribute(context, attribute) {
            Ok(value) => {
                gfx_debug!(SOURCE, "Current value for {}: ({})", attribute.name(), value);
                Some(value)
            }
            Err(reason) => {
                gfx_debug!(SOURCE, "Failed to get value for {} ({})", attribute.name(), reason);
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "negotiator_tests.rs"]
mod tests;
