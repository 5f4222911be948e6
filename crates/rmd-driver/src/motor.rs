//! Single-motor controller.
//!
//! Implements the command/response sequencing on top of a [`Transport`]:
//! build a frame, transmit it, block for the command's fixed-length reply,
//! interpret. One command is outstanding at a time; the busy guard turns
//! reentrant calls into [`MotorError::Busy`] instead of queueing them.

use std::time::Duration;

use rmd_protocol::{
    frame::{read_i64_data, read_u16_data},
    Frame, FrameBuilder, Opcode, BAUD_RATE, MAX_SPEED,
};
use tracing::warn;

use crate::error::MotorError;
use crate::transport::{SerialTransport, Transport};

/// Speed used until a caller supplies one, in degrees per second.
pub const DEFAULT_SPEED: f64 = 180.0;

/// Per-read timeout for the serial transport.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(50);

/// Upper bound of the single-loop angle range, degrees.
const SINGLE_LOOP_MAX: f64 = 359.99;

// Fixed reply lengths. Motion commands echo a 13-byte status frame,
// start/pause/shutdown echo the bare 5-byte header.
const ACTION_REPLY_LEN: usize = 13;
const CONTROL_REPLY_LEN: usize = 5;
const SINGLE_ANGLE_REPLY_LEN: usize = 8;
const MULTI_ANGLE_REPLY_LEN: usize = 14;

/// Controller for one motor on a serial link.
///
/// Owns its transport exclusively. Speed arguments are `Option<f64>` in
/// degrees per second: `None` reuses the remembered speed (the last nonzero
/// speed a caller supplied, initially [`DEFAULT_SPEED`]); a supplied zero is
/// sent on the wire but never overwrites the remembered value, a quirk of
/// the controller firmware that callers rely on.
///
/// The busy guard only rejects reentrant calls within one logical session.
/// It is not a lock: multi-threaded callers must wrap the motor in a mutex.
pub struct Motor<T: Transport> {
    transport: T,
    motor_id: u8,
    /// Remembered speed in deg/s, never zero
    speed: f64,
    busy: bool,
    /// Last built command frame, reused by back-to-back pose polls
    tx: Frame,
    /// Reply buffer, cleared before every read
    rx: Vec<u8>,
}

impl Motor<SerialTransport> {
    /// Open the serial device at `path` and drive motor `motor_id` on it.
    pub fn open(path: &str, motor_id: u8) -> Result<Self, MotorError> {
        let transport = SerialTransport::open(path, BAUD_RATE, DEFAULT_TIMEOUT)?;
        Ok(Self::new(transport, motor_id))
    }
}

impl<T: Transport> Motor<T> {
    /// Wrap an already-open transport.
    pub fn new(transport: T, motor_id: u8) -> Self {
        Self {
            transport,
            motor_id,
            speed: DEFAULT_SPEED,
            busy: false,
            tx: Frame::default(),
            rx: Vec::new(),
        }
    }

    /// Id of the motor this controller addresses.
    pub fn motor_id(&self) -> u8 {
        self.motor_id
    }

    /// The remembered speed in degrees per second.
    pub fn remembered_speed(&self) -> f64 {
        self.speed
    }

    /// Access the underlying transport, mainly for simulation-backed tests.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Stop the motor, keeping the driver section powered.
    pub fn pause(&mut self) -> Result<(), MotorError> {
        self.control(Opcode::MotorPause)
    }

    /// Resume motion after a pause.
    pub fn resume(&mut self) -> Result<(), MotorError> {
        self.control(Opcode::MotorStart)
    }

    /// Stop the motor and power the driver section down.
    pub fn shutdown(&mut self) -> Result<(), MotorError> {
        self.control(Opcode::MotorShutdown)
    }

    /// Rotate continuously at `speed` (sign selects direction).
    pub fn rotate(&mut self, speed: Option<f64>) -> Result<(), MotorError> {
        if self.busy {
            return Err(MotorError::Busy);
        }
        let speed = self.resolve_speed(speed);
        if speed.abs() > MAX_SPEED {
            return Err(MotorError::SpeedOutOfRange(speed));
        }
        self.remember_speed(speed);

        self.busy = true;
        let frame = FrameBuilder::new(Opcode::WriteSpeed, self.motor_id)
            .append((speed * 100.0) as i32)
            .finish();
        let result = self.exchange(frame, ACTION_REPLY_LEN);
        self.busy = false;
        result
    }

    /// Rotate to an absolute single-loop angle, `0 <= degree <= 359.99`.
    ///
    /// A negative `speed` makes the controller approach the target backwards.
    pub fn rotate_to(&mut self, degree: f64, speed: Option<f64>) -> Result<(), MotorError> {
        if self.busy {
            return Err(MotorError::Busy);
        }
        let speed = self.resolve_speed(speed);
        if speed == 0.0 {
            return Err(MotorError::ZeroSpeed);
        }
        if speed.abs() > MAX_SPEED {
            return Err(MotorError::SpeedOutOfRange(speed));
        }
        if !(0.0..=SINGLE_LOOP_MAX).contains(&degree) {
            return Err(MotorError::AngleOutOfRange(degree));
        }
        self.remember_speed(speed);

        self.busy = true;
        let direction: u8 = if speed < 0.0 { 1 } else { 0 };
        let frame = FrameBuilder::new(Opcode::SingleLoopAngleSpeed, self.motor_id)
            .append(direction)
            .append((degree * 100.0) as u16)
            .append(0u8)
            .append((speed.abs() * 100.0) as u32)
            .finish();
        let result = self.exchange(frame, ACTION_REPLY_LEN);
        self.busy = false;
        result
    }

    /// Rotate by a relative angle, nominally `-360 <= degree <= 360`.
    pub fn rotate_more(&mut self, degree: f64, speed: Option<f64>) -> Result<(), MotorError> {
        if self.busy {
            return Err(MotorError::Busy);
        }
        let speed = self.resolve_speed(speed);
        if speed.abs() > MAX_SPEED {
            return Err(MotorError::SpeedOutOfRange(speed));
        }
        self.remember_speed(speed);

        self.busy = true;
        let frame = FrameBuilder::new(Opcode::IncrementAngleSpeed, self.motor_id)
            .append((degree * 100.0) as i32)
            .append((speed.abs() * 100.0) as u32)
            .finish();
        let result = self.exchange(frame, ACTION_REPLY_LEN);
        self.busy = false;
        result
    }

    /// Rotate to an absolute multi-loop angle.
    ///
    /// Multi-loop position is cumulative from power-on: commanding 0° after
    /// four full turns winds the motor back four turns. There is no upper
    /// bound on `degree`.
    pub fn rotate_multi_to(&mut self, degree: f64, speed: Option<f64>) -> Result<(), MotorError> {
        if self.busy {
            return Err(MotorError::Busy);
        }
        let speed = self.resolve_speed(speed);
        if speed == 0.0 {
            return Err(MotorError::ZeroSpeed);
        }
        if speed.abs() > MAX_SPEED {
            return Err(MotorError::SpeedOutOfRange(speed));
        }
        self.remember_speed(speed);

        self.busy = true;
        let frame = FrameBuilder::new(Opcode::MultiLoopAngleSpeed, self.motor_id)
            .append((degree * 100.0) as i64)
            .append((speed.abs() * 100.0) as u32)
            .finish();
        let result = self.exchange(frame, ACTION_REPLY_LEN);
        self.busy = false;
        result
    }

    /// Rotate by a relative angle in multi-loop mode.
    ///
    /// The incremental command moves relative to the current position in
    /// either loop mode, so this shares the single-loop encoding.
    pub fn rotate_multi_more(&mut self, degree: f64, speed: Option<f64>) -> Result<(), MotorError> {
        self.rotate_more(degree, speed)
    }

    /// Read the single-loop angle in degrees (0–360).
    pub fn current_pose(&mut self) -> Result<f64, MotorError> {
        if self.busy {
            return Err(MotorError::Busy);
        }
        self.busy = true;
        // Back-to-back polls reuse the frame built last time around.
        if self.tx.opcode() != Some(Opcode::ReadSingleLoopAngle as u8) {
            self.tx = FrameBuilder::new(Opcode::ReadSingleLoopAngle, self.motor_id).finish();
        }
        let result = self.resend(SINGLE_ANGLE_REPLY_LEN);
        self.busy = false;
        result?;
        Ok(f64::from(read_u16_data(&self.rx)?) / 100.0)
    }

    /// Read the cumulative multi-loop angle in degrees.
    pub fn current_multi_pose(&mut self) -> Result<f64, MotorError> {
        if self.busy {
            return Err(MotorError::Busy);
        }
        self.busy = true;
        if self.tx.opcode() != Some(Opcode::ReadMultiLoopAngle as u8) {
            self.tx = FrameBuilder::new(Opcode::ReadMultiLoopAngle, self.motor_id).finish();
        }
        let result = self.resend(MULTI_ANGLE_REPLY_LEN);
        self.busy = false;
        result?;
        Ok(read_i64_data(&self.rx)? as f64 / 100.0)
    }

    fn control(&mut self, opcode: Opcode) -> Result<(), MotorError> {
        if self.busy {
            return Err(MotorError::Busy);
        }
        self.busy = true;
        let frame = FrameBuilder::new(opcode, self.motor_id).finish();
        let result = self.exchange(frame, CONTROL_REPLY_LEN);
        self.busy = false;
        result
    }

    fn resolve_speed(&self, speed: Option<f64>) -> f64 {
        speed.unwrap_or(self.speed)
    }

    fn remember_speed(&mut self, speed: f64) {
        if speed != 0.0 {
            self.speed = speed;
        }
    }

    fn exchange(&mut self, frame: Frame, reply_len: usize) -> Result<(), MotorError> {
        self.tx = frame;
        self.resend(reply_len)
    }

    /// Transmit the stored frame and read exactly `reply_len` bytes into the
    /// reply buffer.
    fn resend(&mut self, reply_len: usize) -> Result<(), MotorError> {
        let expected = self.tx.len();
        let written = self.transport.write(self.tx.as_bytes())?;
        if written != expected {
            warn!(written, expected, "short write to motor");
            return Err(MotorError::ShortWrite { written, expected });
        }

        self.rx.clear();
        self.rx.resize(reply_len, 0);
        let got = self.transport.read(&mut self.rx)?;
        if got != reply_len {
            warn!(got, expected = reply_len, "short read from motor");
            self.rx.truncate(got);
            return Err(MotorError::ShortRead {
                got,
                expected: reply_len,
            });
        }
        Ok(())
    }
}
