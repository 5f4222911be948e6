//! RMD Servo Protocol Library
//!
//! This crate provides encoding and decoding for the serial wire protocol
//! spoken by RMD series servo motor controllers.
//!
//! # Frame Format
//! ```text
//! [HEAD] [CMD] [ID] [LEN] [HCHK] [data ...] [DCHK]
//! ```
//!
//! - `HEAD`: frame head marker, always `0x3E`
//! - `CMD`: command opcode (see [`Opcode`])
//! - `ID`: motor id on the bus
//! - `LEN`: number of data bytes following the header
//! - `HCHK`: low byte of the sum of the four preceding bytes
//! - `data`: command-specific payload, multi-byte fields little-endian
//! - `DCHK`: low byte of the sum of the data bytes, present only when LEN > 0
//!
//! Replies from the controller use the same framing. Angles and speeds
//! travel as fixed-point integers scaled by 100 (0.01° / 0.01°/s per LSB).

pub mod command;
pub mod error;
pub mod frame;
pub mod identity;

pub use command::Opcode;
pub use error::FrameError;
pub use frame::{checksum, read_i64_data, read_u16_data, validate, Frame, FrameBuilder};
pub use identity::{identify_command, identify_reply_checksum, MotorInfo};

/// Baud rate the controller's serial port runs at.
pub const BAUD_RATE: u32 = 115_200;

/// Maximum speed the controller accepts, in degrees per second.
pub const MAX_SPEED: f64 = 20_000.0;
