//! # Error Types — Core Validation Failures
//!
//! Defines the error type for `veil-core` constructors and parsers. All
//! errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! Component-level errors (registry chain violations, coordinator timing
//! violations) live in their own crates next to the code that raises them.

use thiserror::Error;

/// Errors raised by core type constructors and parsers.
#[derive(Error, Debug)]
pub enum CoreError {
    /// An address string could not be parsed.
    #[error("invalid address {input:?}: {reason}")]
    InvalidAddress {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A digest string could not be parsed.
    #[error("invalid digest {input:?}: {reason}")]
    InvalidDigest {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A timestamp string was rejected.
    #[error("invalid timestamp {input:?}: {reason}")]
    InvalidTimestamp {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A clock was asked to move backwards.
    #[error("clock may not move backwards: current tick {current}, requested {requested}")]
    ClockRegression {
        /// The clock's current tick.
        current: u64,
        /// The earlier tick that was requested.
        requested: u64,
    },
}
