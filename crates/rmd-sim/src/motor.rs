//! Virtual motor simulation.

use std::collections::VecDeque;

use rmd_driver::{Transport, TransportError};
use rmd_protocol::{
    frame::{validate, IDX_COMMAND, IDX_DATA_LEN, IDX_DATA_START, IDX_ID},
    FrameBuilder, Opcode,
};
use serde::{Deserialize, Serialize};

const CENTIDEGREES_PER_LOOP: i64 = 36_000;

/// Configuration for creating a virtual motor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirtualMotorConfig {
    /// Id the motor answers to
    pub motor_id: u8,
    /// Driver board name reported by identification
    pub driver_name: String,
    /// Motor model name reported by identification
    pub motor_name: String,
    /// Hardware revision byte
    pub hardware_version: u8,
    /// Firmware revision byte
    pub firmware_version: u8,
    /// Starting multi-loop angle in degrees
    pub initial_angle: f64,
}

impl Default for VirtualMotorConfig {
    fn default() -> Self {
        Self {
            motor_id: 1,
            driver_name: "RMDS-V3".to_string(),
            motor_name: "RMD-S-4005".to_string(),
            hardware_version: 2,
            firmware_version: 7,
            initial_angle: 0.0,
        }
    }
}

/// A simulated motor controller on the other end of the wire.
#[derive(Debug)]
pub struct VirtualMotor {
    config: VirtualMotorConfig,
    /// Cumulative position since "power-on", centidegrees
    multi_angle: i64,
    /// Last commanded speed, centidegrees per second
    speed: i32,
    running: bool,
    /// Reply bytes waiting to be read by the host
    pending: VecDeque<u8>,
}

impl VirtualMotor {
    /// Create a motor answering to `motor_id` with default identity
    pub fn new(motor_id: u8) -> Self {
        Self::from_config(VirtualMotorConfig {
            motor_id,
            ..VirtualMotorConfig::default()
        })
    }

    /// Create a motor from configuration
    pub fn from_config(config: VirtualMotorConfig) -> Self {
        let multi_angle = (config.initial_angle * 100.0) as i64;
        Self {
            config,
            multi_angle,
            speed: 0,
            running: false,
            pending: VecDeque::new(),
        }
    }

    /// Cumulative multi-loop angle in degrees
    pub fn multi_angle(&self) -> f64 {
        self.multi_angle as f64 / 100.0
    }

    /// Single-loop angle in degrees (0–360)
    pub fn single_angle(&self) -> f64 {
        f64::from(self.single_angle_centi()) / 100.0
    }

    /// Last commanded speed in degrees per second
    pub fn speed(&self) -> f64 {
        f64::from(self.speed) / 100.0
    }

    /// Whether the motor section is running
    pub fn is_running(&self) -> bool {
        self.running
    }

    fn single_angle_centi(&self) -> u16 {
        let wrapped = self.multi_angle % CENTIDEGREES_PER_LOOP;
        ((wrapped + CENTIDEGREES_PER_LOOP) % CENTIDEGREES_PER_LOOP) as u16
    }

    /// Validate one command frame and queue the reply it earns, if any.
    fn handle_frame(&mut self, frame: &[u8]) {
        if validate(frame).is_err() || frame[IDX_ID] != self.config.motor_id {
            return;
        }

        let data_len = frame[IDX_DATA_LEN] as usize;
        let data = &frame[IDX_DATA_START..IDX_DATA_START + data_len];

        let Ok(opcode) = Opcode::try_from(frame[IDX_COMMAND]) else {
            return;
        };

        match opcode {
            Opcode::MotorStart => {
                self.running = true;
                self.queue_echo(opcode);
            }
            Opcode::MotorPause | Opcode::MotorShutdown => {
                self.running = false;
                self.queue_echo(opcode);
            }
            Opcode::WriteSpeed if data.len() == 4 => {
                self.speed = i32::from_le_bytes([data[0], data[1], data[2], data[3]]);
                self.running = self.speed != 0;
                self.queue_status(opcode);
            }
            Opcode::SingleLoopAngleSpeed if data.len() == 8 => {
                let reverse = data[0] == 1;
                let target = i64::from(u16::from_le_bytes([data[1], data[2]]));
                self.speed = u32::from_le_bytes([data[4], data[5], data[6], data[7]]) as i32;
                self.seek_single_loop(target, reverse);
                self.queue_status(opcode);
            }
            Opcode::IncrementAngleSpeed if data.len() == 8 => {
                let delta = i32::from_le_bytes([data[0], data[1], data[2], data[3]]);
                self.speed = u32::from_le_bytes([data[4], data[5], data[6], data[7]]) as i32;
                self.multi_angle += i64::from(delta);
                self.queue_status(opcode);
            }
            Opcode::MultiLoopAngleSpeed if data.len() == 12 => {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(&data[..8]);
                self.speed = u32::from_le_bytes([data[8], data[9], data[10], data[11]]) as i32;
                self.multi_angle = i64::from_le_bytes(raw);
                self.queue_status(opcode);
            }
            Opcode::ReadSingleLoopAngle => {
                let reply = FrameBuilder::new(opcode, self.config.motor_id)
                    .append(self.single_angle_centi())
                    .finish();
                self.queue(reply.as_bytes());
            }
            Opcode::ReadMultiLoopAngle => {
                let reply = FrameBuilder::new(opcode, self.config.motor_id)
                    .append(self.multi_angle)
                    .finish();
                self.queue(reply.as_bytes());
            }
            Opcode::ReadInfo => self.queue_info(),
            // Everything else stays silent, like a command the firmware
            // does not implement.
            _ => {}
        }
    }

    /// Move to an absolute single-loop target, approaching in the
    /// commanded direction.
    fn seek_single_loop(&mut self, target_centi: i64, reverse: bool) {
        let mut delta = target_centi - i64::from(self.single_angle_centi());
        if reverse && delta > 0 {
            delta -= CENTIDEGREES_PER_LOOP;
        }
        if !reverse && delta < 0 {
            delta += CENTIDEGREES_PER_LOOP;
        }
        self.multi_angle += delta;
    }

    fn queue_echo(&mut self, opcode: Opcode) {
        let reply = FrameBuilder::new(opcode, self.config.motor_id).finish();
        self.queue(reply.as_bytes());
    }

    /// The 13-byte status frame motion commands are answered with:
    /// temperature, torque current, speed, encoder position.
    fn queue_status(&mut self, opcode: Opcode) {
        let reply = FrameBuilder::new(opcode, self.config.motor_id)
            .append(25i8)
            .append(100i16)
            .append((self.speed / 100).clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16)
            .append(self.single_angle_centi())
            .finish();
        self.queue(reply.as_bytes());
    }

    fn queue_info(&mut self) {
        let mut builder = FrameBuilder::new(Opcode::ReadInfo, self.config.motor_id);
        for byte in name_field(&self.config.driver_name) {
            builder = builder.append(byte);
        }
        for byte in name_field(&self.config.motor_name) {
            builder = builder.append(byte);
        }
        let reply = builder
            .append(self.config.hardware_version)
            .append(self.config.firmware_version)
            .finish();
        self.queue(reply.as_bytes());
    }

    fn queue(&mut self, bytes: &[u8]) {
        self.pending.extend(bytes);
    }
}

/// NUL-pad (or truncate) a name to its fixed 20-byte field.
fn name_field(name: &str) -> [u8; rmd_protocol::identity::NAME_LEN] {
    let mut field = [0u8; rmd_protocol::identity::NAME_LEN];
    let bytes = name.as_bytes();
    let n = bytes.len().min(field.len());
    field[..n].copy_from_slice(&bytes[..n]);
    field
}

impl Transport for VirtualMotor {
    fn write(&mut self, bytes: &[u8]) -> Result<usize, TransportError> {
        self.handle_frame(bytes);
        Ok(bytes.len())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.pending.pop_front() {
                Some(byte) => {
                    buf[filled] = byte;
                    filled += 1;
                }
                None => break,
            }
        }
        Ok(filled)
    }

    fn clear_input(&mut self) -> Result<(), TransportError> {
        self.pending.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmd_protocol::frame::IDX_HEAD_CHECKSUM;
    use rmd_protocol::identity::IDENTIFY_REPLY_LEN;

    fn raw_frame(motor: &mut VirtualMotor, frame: &[u8]) -> Vec<u8> {
        motor.write(frame).unwrap();
        let mut buf = vec![0u8; 64];
        let n = motor.read(&mut buf).unwrap();
        buf.truncate(n);
        buf
    }

    #[test]
    fn pause_is_echoed_and_stops_the_motor() {
        let mut motor = VirtualMotor::new(1);
        let frame = FrameBuilder::new(Opcode::MotorPause, 1).finish();

        let reply = raw_frame(&mut motor, frame.as_bytes());
        assert_eq!(reply, frame.as_bytes());
        assert!(!motor.is_running());
    }

    #[test]
    fn misaddressed_frame_gets_no_reply() {
        let mut motor = VirtualMotor::new(2);
        let frame = FrameBuilder::new(Opcode::MotorPause, 1).finish();
        assert!(raw_frame(&mut motor, frame.as_bytes()).is_empty());
    }

    #[test]
    fn corrupted_header_checksum_gets_no_reply() {
        let mut motor = VirtualMotor::new(1);
        let mut bytes = FrameBuilder::new(Opcode::MotorPause, 1).finish().as_bytes().to_vec();
        bytes[IDX_HEAD_CHECKSUM] = bytes[IDX_HEAD_CHECKSUM].wrapping_add(1);
        assert!(raw_frame(&mut motor, &bytes).is_empty());
    }

    #[test]
    fn corrupted_data_checksum_gets_no_reply() {
        let mut motor = VirtualMotor::new(1);
        let mut bytes = FrameBuilder::new(Opcode::WriteSpeed, 1)
            .append(1000i32)
            .finish()
            .as_bytes()
            .to_vec();
        let last = bytes.len() - 1;
        bytes[last] = bytes[last].wrapping_add(1);
        assert!(raw_frame(&mut motor, &bytes).is_empty());
    }

    #[test]
    fn increment_command_moves_the_angle() {
        let mut motor = VirtualMotor::new(1);
        let frame = FrameBuilder::new(Opcode::IncrementAngleSpeed, 1)
            .append(-9_000i32)
            .append(10_000u32)
            .finish();

        let reply = raw_frame(&mut motor, frame.as_bytes());
        assert_eq!(reply.len(), 13);
        assert_eq!(motor.multi_angle(), -90.0);
        assert_eq!(motor.single_angle(), 270.0);
    }

    #[test]
    fn info_reply_is_full_length() {
        let mut motor = VirtualMotor::new(1);
        let frame = FrameBuilder::new(Opcode::ReadInfo, 1).finish();
        let reply = raw_frame(&mut motor, frame.as_bytes());
        assert_eq!(reply.len(), IDENTIFY_REPLY_LEN);
    }
}
