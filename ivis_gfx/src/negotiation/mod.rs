/// Context negotiation: request ladder, window system seam and the protocol

pub mod context_request;
pub mod window_system;
pub mod negotiator;

#[cfg(test)]
pub mod scripted_window_system;

pub use context_request::*;
pub use window_system::*;
pub use negotiator::*;
