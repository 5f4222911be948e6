//! Command frame construction and response decoding.
//!
//! A [`FrameBuilder`] is created fresh for every outgoing command; `finish`
//! fills in the length and both checksum bytes and yields an immutable
//! [`Frame`] ready for transmission. Replies reuse the same layout, so the
//! offset constants and the decode helpers below apply to both directions.

use crate::command::Opcode;
use crate::error::FrameError;

/// Frame head marker byte
pub const FRAME_HEAD: u8 = 0x3E;

/// Offset of the head marker
pub const IDX_FRAME_HEAD: usize = 0;
/// Offset of the command opcode
pub const IDX_COMMAND: usize = 1;
/// Offset of the motor id
pub const IDX_ID: usize = 2;
/// Offset of the data length byte
pub const IDX_DATA_LEN: usize = 3;
/// Offset of the header checksum
pub const IDX_HEAD_CHECKSUM: usize = 4;
/// Offset of the first data byte
pub const IDX_DATA_START: usize = 5;
/// Length of the frame header (also the full length of a data-less frame)
pub const HEADER_LEN: usize = 5;

/// Low byte of the sum of `bytes`, the checksum used throughout the protocol.
///
/// Overflow wraps mod 256, matching the 8-bit accumulator in the controller
/// firmware.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |sum, b| sum.wrapping_add(*b))
}

/// Integer types that can be appended to a frame as little-endian bytes.
///
/// The wire format is little-endian regardless of host byte order;
/// `to_le_bytes` performs the swap only where the host differs.
pub trait WireField {
    /// Append `self` to `buf` in wire byte order
    fn put_le(self, buf: &mut Vec<u8>);
}

macro_rules! impl_wire_field {
    ($($ty:ty),*) => {
        $(
            impl WireField for $ty {
                fn put_le(self, buf: &mut Vec<u8>) {
                    buf.extend_from_slice(&self.to_le_bytes());
                }
            }
        )*
    };
}

impl_wire_field!(u8, i8, u16, i16, u32, i32, u64, i64);

/// Builder for one outgoing command frame.
pub struct FrameBuilder {
    buf: Vec<u8>,
}

impl FrameBuilder {
    /// Start a frame for `opcode` addressed to `motor_id`.
    ///
    /// The length and checksum slots are zeroed here and computed in
    /// [`finish`](Self::finish); they are never carried over from a
    /// previously built frame.
    pub fn new(opcode: Opcode, motor_id: u8) -> Self {
        let mut buf = Vec::with_capacity(16);
        buf.extend_from_slice(&[FRAME_HEAD, opcode as u8, motor_id, 0, 0]);
        Self { buf }
    }

    /// Append a data field in little-endian wire order.
    pub fn append<T: WireField>(mut self, value: T) -> Self {
        value.put_le(&mut self.buf);
        self
    }

    /// Compute the data length and both checksums, yielding the finished frame.
    pub fn finish(mut self) -> Frame {
        if self.buf.len() > HEADER_LEN {
            let data_len = self.buf.len() - HEADER_LEN;
            self.buf[IDX_DATA_LEN] = data_len as u8;
            let data_checksum = checksum(&self.buf[IDX_DATA_START..]);
            self.buf.push(data_checksum);
        } else {
            self.buf[IDX_DATA_LEN] = 0;
        }
        self.buf[IDX_HEAD_CHECKSUM] = checksum(&self.buf[..IDX_HEAD_CHECKSUM]);
        Frame { bytes: self.buf }
    }
}

/// A finished command frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    bytes: Vec<u8>,
}

impl Frame {
    /// The opcode byte, if the frame is non-empty.
    pub fn opcode(&self) -> Option<u8> {
        self.bytes.get(IDX_COMMAND).copied()
    }

    /// Raw frame bytes as transmitted.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Total frame length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True for a default-constructed frame that was never built.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// Validate the framing of a received byte sequence: head marker, declared
/// data length, header checksum, and data checksum when data is present.
///
/// The driver's command path deliberately accepts replies by byte count
/// alone; this is for receivers that want the full check.
pub fn validate(frame: &[u8]) -> Result<(), FrameError> {
    if frame.len() < HEADER_LEN {
        return Err(FrameError::Truncated {
            expected: HEADER_LEN,
            got: frame.len(),
        });
    }
    if frame[IDX_FRAME_HEAD] != FRAME_HEAD {
        return Err(FrameError::BadHead(frame[IDX_FRAME_HEAD]));
    }
    let expected = checksum(&frame[..IDX_HEAD_CHECKSUM]);
    if frame[IDX_HEAD_CHECKSUM] != expected {
        return Err(FrameError::ChecksumMismatch {
            expected,
            actual: frame[IDX_HEAD_CHECKSUM],
        });
    }

    let data_len = frame[IDX_DATA_LEN] as usize;
    let total = if data_len == 0 {
        HEADER_LEN
    } else {
        HEADER_LEN + data_len + 1
    };
    if frame.len() != total {
        return Err(FrameError::LengthMismatch {
            expected: total,
            got: frame.len(),
        });
    }
    if data_len > 0 {
        let expected = checksum(&frame[IDX_DATA_START..total - 1]);
        if frame[total - 1] != expected {
            return Err(FrameError::ChecksumMismatch {
                expected,
                actual: frame[total - 1],
            });
        }
    }
    Ok(())
}

/// Decode a little-endian `u16` from the data region of a reply.
pub fn read_u16_data(reply: &[u8]) -> Result<u16, FrameError> {
    let end = IDX_DATA_START + 2;
    let bytes = reply
        .get(IDX_DATA_START..end)
        .ok_or(FrameError::Truncated {
            expected: end,
            got: reply.len(),
        })?;
    Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
}

/// Decode a little-endian `i64` from the data region of a reply.
pub fn read_i64_data(reply: &[u8]) -> Result<i64, FrameError> {
    let end = IDX_DATA_START + 8;
    let bytes = reply
        .get(IDX_DATA_START..end)
        .ok_or(FrameError::Truncated {
            expected: end,
            got: reply.len(),
        })?;
    let mut raw = [0u8; 8];
    raw.copy_from_slice(bytes);
    Ok(i64::from_le_bytes(raw))
}
