//! Error types for the coincast crate

use std::time::Duration;
use thiserror::Error;

/// Custom error types for the coincast crate
///
/// Each variant maps to a distinct category at the transport boundary, so a
/// client can tell "try a different input" apart from "try again later".
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Too few usable history points after cleaning. Not retryable.
    #[error("insufficient data: {have} usable point(s) after cleaning, need at least {need}")]
    InsufficientData { have: usize, need: usize },

    /// Requested horizon is outside the allowed set. Caller bug, not retryable.
    #[error("invalid horizon {requested}: must be one of {allowed:?}")]
    InvalidHorizon {
        requested: usize,
        allowed: &'static [usize],
    },

    /// Non-finite input reached a model. Indicates upstream data corruption.
    #[error("model fit error: {0}")]
    Fit(String),

    /// Transient upstream failure (rate limit, outage). Retryable by the caller.
    #[error("upstream market data unavailable: {reason}")]
    UpstreamUnavailable {
        reason: String,
        /// Retry-after hint from the provider, when known.
        retry_after: Option<Duration>,
    },

    /// The provider does not know the requested coin identifier.
    #[error("unknown coin: {0}")]
    UnknownCoin(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;
