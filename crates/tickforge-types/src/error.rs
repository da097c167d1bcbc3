//! Error types for tickforge.

use thiserror::Error;

use crate::Timeframe;

/// Result type alias for tickforge operations.
pub type Result<T> = std::result::Result<T, TickforgeError>;

/// Errors that can occur while configuring or driving bar generators.
#[derive(Error, Debug)]
pub enum TickforgeError {
    /// The target timeframe is not an exact multiple of the source timeframe.
    #[error("Invalid timeframe pairing: {to} is not a multiple of {from}")]
    InvalidTimeframe {
        /// Source timeframe.
        from: Timeframe,
        /// Target timeframe.
        to: Timeframe,
    },

    /// A candle of the wrong timeframe was fed to a cascading generator.
    #[error("Timeframe mismatch: generator expects {expected} candles, got {found}")]
    TimeframeMismatch {
        /// Timeframe the generator was configured with.
        expected: Timeframe,
        /// Timeframe of the candle that was received.
        found: Timeframe,
    },

    /// A timeframe was requested that the cascade does not contain.
    #[error("Timeframe {0} is not part of the cascade")]
    UnknownTimeframe(Timeframe),

    /// A bar specification string or document could not be understood.
    #[error("Invalid bar spec: {0}")]
    InvalidBarSpec(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
