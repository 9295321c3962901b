//! Error types for the sigma-protocol engine.

use std::time::Duration;

/// Main error types for the library.
///
/// A proof that fails its verification equation is *not* an error: every
/// verification entry point returns `Ok(false)` for that outcome.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid group parameters were provided.
    #[error("Invalid group parameters: {0}")]
    InvalidParams(String),

    /// A scalar value is invalid or out of range.
    #[error("Invalid scalar: {0}")]
    InvalidScalar(String),

    /// A group element is invalid or not in the correct subgroup.
    #[error("Invalid group element: {0}")]
    InvalidGroupElement(String),

    /// The requested protocol variant does not exist.
    #[error("Unknown protocol variant: {0}")]
    UnknownVariant(String),

    /// A move arrived out of order, twice, malformed, or for the wrong
    /// session. The session it belongs to is aborted.
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    /// Shamir reconstruction was attempted with fewer shares than the
    /// threshold requires.
    #[error("Insufficient shares: need {threshold}, got {provided}")]
    InsufficientShares { threshold: usize, provided: usize },

    /// The counterpart is unreachable or the connection failed.
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The counterpart did not answer within the move timeout.
    #[error("Timed out after {0:?} waiting for the counterpart")]
    Timeout(Duration),
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;
