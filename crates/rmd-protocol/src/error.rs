//! Error types for protocol encoding and decoding

use thiserror::Error;

/// Errors that can occur while decoding controller frames
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Response shorter than the field being decoded requires
    #[error("response truncated: expected {expected} bytes, got {got}")]
    Truncated { expected: usize, got: usize },

    /// Frame does not start with the head marker
    #[error("bad frame head: 0x{0:02X}")]
    BadHead(u8),

    /// Frame length disagrees with the declared data length
    #[error("frame length {got} does not match declared {expected}")]
    LengthMismatch { expected: usize, got: usize },

    /// Opcode byte not in the documented command set
    #[error("unknown opcode: 0x{0:02X}")]
    UnknownOpcode(u8),

    /// Checksum byte does not match the computed sum
    #[error("checksum mismatch: expected 0x{expected:02X}, got 0x{actual:02X}")]
    ChecksumMismatch { expected: u8, actual: u8 },
}
