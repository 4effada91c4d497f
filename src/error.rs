//! Error types for the termrate protocol core.
//!
//! Every public operation either completes or fails atomically with one of
//! the variants below; no partial state mutation survives a failure.

use thiserror::Error;

/// Result type alias for termrate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the termrate protocol core
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // ═══════════════════════════════════════════════════════════════════
    // Oracle Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Query timestamp precedes all stored observations
    #[error("Insufficient history: queried {queried}s precedes oldest observation at {oldest}s")]
    InsufficientHistory {
        /// Queried timestamp (UNIX seconds)
        queried: u64,
        /// Oldest stored observation timestamp (UNIX seconds)
        oldest: u64,
    },

    /// Underlying yield source returned an invalid (zero) reading
    #[error("Yield source unavailable for asset {asset}")]
    SourceUnavailable {
        /// Asset whose index could not be read
        asset: String,
    },

    /// Write attempted before the minimum update interval elapsed,
    /// or out of order with respect to the newest observation
    #[error("Throttled: {elapsed}s since last observation, minimum {min_interval}s")]
    ThrottleViolation {
        /// Seconds elapsed since the newest observation (zero when the
        /// attempted write precedes it)
        elapsed: u64,
        /// Configured minimum update interval in seconds
        min_interval: u64,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Term Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Term boundaries malformed (start not strictly before end)
    #[error("Invalid term: start {start}s must precede end {end}s")]
    InvalidTerm {
        /// Term start or query-window start (UNIX seconds)
        start: u64,
        /// Term end or query-window end (UNIX seconds)
        end: u64,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Authorization Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Configuration mutation attempted by a non-owner caller
    #[error("Not authorized: {0}")]
    Unauthorized(String),

    // ═══════════════════════════════════════════════════════════════════
    // Validation Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Invalid input parameter
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// Parameter name
        name: String,
        /// Reason for invalidity
        reason: String,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Internal Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Math function evaluated outside its domain
    #[error("Math domain error in {operation}")]
    MathDomain {
        /// Operation that failed
        operation: String,
    },
}

impl Error {
    /// Returns true if this error is recoverable by retrying later
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::ThrottleViolation { .. } | Error::SourceUnavailable { .. }
        )
    }

    /// Returns true if this is a critical error requiring immediate attention
    pub fn is_critical(&self) -> bool {
        matches!(self, Error::MathDomain { .. })
    }

    /// Returns the error code for external systems
    pub fn code(&self) -> u32 {
        match self {
            // Oracle errors: 1xxx
            Error::InsufficientHistory { .. } => 1001,
            Error::SourceUnavailable { .. } => 1002,
            Error::ThrottleViolation { .. } => 1003,

            // Term errors: 2xxx
            Error::InvalidTerm { .. } => 2001,

            // Authorization errors: 4xxx
            Error::Unauthorized(_) => 4001,

            // Validation errors: 5xxx
            Error::InvalidParameter { .. } => 5001,

            // Internal errors: 9xxx
            Error::MathDomain { .. } => 9001,
        }
    }
}
