//! Command opcodes understood by RMD series controllers.

use crate::error::FrameError;

/// Single-byte command opcodes.
///
/// Read commands report controller state; write commands change it. The
/// `...Default` position variants run at the speed limit configured in the
/// controller, the `...Speed` variants carry an explicit speed field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    /// Resume motion after a pause
    MotorStart = 0x88,
    /// Stop motion, keeping the driver section powered
    MotorPause = 0x81,
    /// Stop motion and power the driver section down
    MotorShutdown = 0x80,
    /// Read the position-loop PID parameters
    ReadPid = 0x30,
    /// Write PID parameters to RAM (lost on power cycle)
    WritePidRam = 0x31,
    /// Write PID parameters to ROM
    WritePidRom = 0x32,
    /// Read the acceleration setting
    ReadAccel = 0x33,
    /// Write the acceleration setting
    WriteAccel = 0x34,
    /// Read the encoder value
    ReadEncoder = 0x90,
    /// Write an encoder offset as the zero point to ROM
    WriteEncoderZero = 0x91,
    /// Write the current position as the zero point to ROM
    WriteCurrentAsZero = 0x19,
    /// Read the cumulative multi-loop angle
    ReadMultiLoopAngle = 0x92,
    /// Read the single-loop angle (one revolution, 0–360°)
    ReadSingleLoopAngle = 0x94,
    /// Write the power-on default angle
    WriteDefaultAngle = 0x95,
    /// Read motor state 1 (temperature, voltage, error flags)
    ReadState1 = 0x9A,
    /// Clear the error flag
    ClearError = 0x9B,
    /// Read motor state 2 (temperature, current, speed, encoder)
    ReadState2 = 0x9C,
    /// Read motor state 3 (temperature, phase currents)
    ReadState3 = 0x9D,
    /// Open-loop power output
    WritePower = 0xA0,
    /// Closed-loop speed control
    WriteSpeed = 0xA2,
    /// Multi-loop position, default speed
    MultiLoopAngleDefault = 0xA3,
    /// Multi-loop position, explicit speed
    MultiLoopAngleSpeed = 0xA4,
    /// Single-loop position, default speed
    SingleLoopAngleDefault = 0xA5,
    /// Single-loop position, explicit speed
    SingleLoopAngleSpeed = 0xA6,
    /// Incremental position, default speed
    IncrementAngleDefault = 0xA7,
    /// Incremental position, explicit speed
    IncrementAngleSpeed = 0xA8,
    /// Read driver and motor identification
    ReadInfo = 0x12,
}

impl TryFrom<u8> for Opcode {
    type Error = FrameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x88 => Ok(Self::MotorStart),
            0x81 => Ok(Self::MotorPause),
            0x80 => Ok(Self::MotorShutdown),
            0x30 => Ok(Self::ReadPid),
            0x31 => Ok(Self::WritePidRam),
            0x32 => Ok(Self::WritePidRom),
            0x33 => Ok(Self::ReadAccel),
            0x34 => Ok(Self::WriteAccel),
            0x90 => Ok(Self::ReadEncoder),
            0x91 => Ok(Self::WriteEncoderZero),
            0x19 => Ok(Self::WriteCurrentAsZero),
            0x92 => Ok(Self::ReadMultiLoopAngle),
            0x94 => Ok(Self::ReadSingleLoopAngle),
            0x95 => Ok(Self::WriteDefaultAngle),
            0x9A => Ok(Self::ReadState1),
            0x9B => Ok(Self::ClearError),
            0x9C => Ok(Self::ReadState2),
            0x9D => Ok(Self::ReadState3),
            0xA0 => Ok(Self::WritePower),
            0xA2 => Ok(Self::WriteSpeed),
            0xA3 => Ok(Self::MultiLoopAngleDefault),
            0xA4 => Ok(Self::MultiLoopAngleSpeed),
            0xA5 => Ok(Self::SingleLoopAngleDefault),
            0xA6 => Ok(Self::SingleLoopAngleSpeed),
            0xA7 => Ok(Self::IncrementAngleDefault),
            0xA8 => Ok(Self::IncrementAngleSpeed),
            0x12 => Ok(Self::ReadInfo),
            other => Err(FrameError::UnknownOpcode(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcode_byte_roundtrip() {
        let opcodes = [
            Opcode::MotorStart,
            Opcode::MotorPause,
            Opcode::MotorShutdown,
            Opcode::WriteSpeed,
            Opcode::SingleLoopAngleSpeed,
            Opcode::IncrementAngleSpeed,
            Opcode::MultiLoopAngleSpeed,
            Opcode::ReadSingleLoopAngle,
            Opcode::ReadMultiLoopAngle,
            Opcode::ReadInfo,
        ];

        for op in opcodes {
            assert_eq!(Opcode::try_from(op as u8).unwrap(), op);
        }
    }

    #[test]
    fn unknown_opcode_rejected() {
        assert!(matches!(
            Opcode::try_from(0xFF),
            Err(FrameError::UnknownOpcode(0xFF))
        ));
    }
}
