//! Error types for flowmark
//!
//! The packet path itself never returns errors: every per-packet failure is
//! folded into a [`crate::classify::Verdict`]. The types here cover the seams
//! around the pipeline: configuration loading, the packet buffer's bounded
//! growth, and control-plane plumbing.

use std::io;

use thiserror::Error;

/// Top-level error type for flowmark
#[derive(Debug, Error)]
pub enum FlowmarkError {
    /// Configuration errors (file parsing, validation)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Packet buffer growth errors
    #[error("Growth error: {0}")]
    Growth(#[from] GrowthError),

    /// I/O errors not covered by other categories
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl FlowmarkError {
    /// Check if this error is recoverable (can retry operation)
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Config(_) => false,
            // A growth failure is final for the packet at hand, but the
            // pipeline itself stays healthy.
            Self::Growth(_) => true,
            Self::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::TimedOut
                    | io::ErrorKind::Interrupted
                    | io::ErrorKind::WouldBlock
            ),
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File not found or inaccessible
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Validation error (invalid values, missing required fields)
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    /// Environment variable error
    #[error("Environment variable error: {name}: {reason}")]
    EnvError { name: String, reason: String },

    /// I/O error while reading config
    #[error("I/O error reading configuration: {0}")]
    IoError(#[from] io::Error),
}

impl ConfigError {
    /// Config errors are generally not recoverable without user intervention
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        false
    }
}

/// Packet buffer growth errors
///
/// Emitted by [`crate::packet::PacketBuf::insert_gap`] when a requested
/// splice cannot be honored. The marker translates these into the configured
/// [`crate::mark::GrowthPolicy`]; they never escape the pipeline as errors.
#[derive(Debug, Error)]
pub enum GrowthError {
    /// The buffer's room cannot accommodate the grown packet
    #[error("Buffer has no room to grow: need {needed} bytes, room is {room}")]
    NoRoom { needed: usize, room: usize },

    /// The splice offset lies beyond the current packet length
    #[error("Growth offset {offset} out of bounds (packet length {len})")]
    OffsetOutOfBounds { offset: usize, len: usize },
}
