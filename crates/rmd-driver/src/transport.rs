//! Byte transport over a serial device.

use std::io::{Read, Write};
use std::time::Duration;

use serialport::{ClearBuffer, SerialPort};

use crate::error::TransportError;

/// Blocking byte transport the driver talks through.
///
/// `read` fills as much of `buf` as arrives before the implementation's
/// timeout elapses and returns the count actually read; a timeout is not an
/// error, it just yields a short count. The driver layers its own
/// expected-length checks on top.
pub trait Transport {
    /// Write `bytes`, returning how many were accepted.
    fn write(&mut self, bytes: &[u8]) -> Result<usize, TransportError>;

    /// Read up to `buf.len()` bytes, blocking until the buffer is full or the
    /// timeout elapses. Returns the count read.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError>;

    /// Discard any bytes already received but not yet read.
    fn clear_input(&mut self) -> Result<(), TransportError>;
}

/// [`Transport`] implementation over a real serial port.
///
/// The port is opened by [`open`](Self::open) and closed when the value is
/// dropped.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
}

impl SerialTransport {
    /// Open `path` at `baud_rate` with the given per-read timeout.
    pub fn open(path: &str, baud_rate: u32, timeout: Duration) -> Result<Self, TransportError> {
        let port = serialport::new(path, baud_rate)
            .timeout(timeout)
            .open()
            .map_err(|source| TransportError::Open {
                port: path.to_string(),
                source,
            })?;
        Ok(Self { port })
    }
}

impl Transport for SerialTransport {
    fn write(&mut self, bytes: &[u8]) -> Result<usize, TransportError> {
        let written = self.port.write(bytes)?;
        self.port.flush()?;
        Ok(written)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.port.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => break,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(filled)
    }

    fn clear_input(&mut self) -> Result<(), TransportError> {
        self.port.clear(ClearBuffer::Input)?;
        Ok(())
    }
}
