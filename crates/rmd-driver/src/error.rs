//! Error types for the motor driver

use rmd_protocol::FrameError;
use thiserror::Error;

/// Errors from the byte transport layer
#[derive(Debug, Error)]
pub enum TransportError {
    /// Failed to open the serial device
    #[error("failed to open {port}: {source}")]
    Open {
        port: String,
        source: serialport::Error,
    },

    /// I/O error during a read or write
    #[error("serial I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serial port control error
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),
}

/// Errors surfaced by motor operations
#[derive(Debug, Error)]
pub enum MotorError {
    /// A command round trip is already in flight
    #[error("a command is already in flight")]
    Busy,

    /// Speed magnitude exceeds the controller limit
    #[error("speed {0} deg/s exceeds the controller limit")]
    SpeedOutOfRange(f64),

    /// Positioning commands require a nonzero speed
    #[error("speed must be nonzero for positioning commands")]
    ZeroSpeed,

    /// Angle outside the single-loop range
    #[error("angle {0}° is outside the range 0..=359.99")]
    AngleOutOfRange(f64),

    /// Fewer bytes written than the frame holds
    #[error("short write: {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },

    /// Reply shorter than the command's fixed response length
    #[error("short read: {got} of {expected} bytes")]
    ShortRead { got: usize, expected: usize },

    /// Reply failed to decode
    #[error("malformed response: {0}")]
    Frame(#[from] FrameError),

    /// Transport failure
    #[error(transparent)]
    Transport(#[from] TransportError),
}
