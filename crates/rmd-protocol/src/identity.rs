//! Motor identification handshake.
//!
//! A read-info command is a bare header frame; the controller answers with a
//! 48-byte reply carrying two 20-byte NUL-padded name fields and two version
//! bytes. Discovery accepts a port by checking the reply's header checksum,
//! which is fully determined by the motor id and the fixed reply length.

use crate::command::Opcode;
use crate::error::FrameError;
use crate::frame::{checksum, Frame, FrameBuilder, FRAME_HEAD, IDX_DATA_START};

/// Total length of an identification reply.
pub const IDENTIFY_REPLY_LEN: usize = 48;

/// Length of each name field in the reply.
pub const NAME_LEN: usize = 20;

/// Data length byte carried by an identification reply
/// (two names + hardware version + firmware version).
const INFO_DATA_LEN: u8 = 0x2A;

/// Build the read-info command frame for `motor_id`.
pub fn identify_command(motor_id: u8) -> Frame {
    FrameBuilder::new(Opcode::ReadInfo, motor_id).finish()
}

/// Header checksum an identification reply for `motor_id` must carry.
pub fn identify_reply_checksum(motor_id: u8) -> u8 {
    checksum(&[FRAME_HEAD, Opcode::ReadInfo as u8, motor_id, INFO_DATA_LEN])
}

/// Identity reported by a controller.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotorInfo {
    /// Driver board name
    pub driver_name: String,
    /// Motor model name
    pub motor_name: String,
    /// Hardware revision
    pub hardware_version: u8,
    /// Firmware revision
    pub firmware_version: u8,
}

impl MotorInfo {
    /// Parse the identity fields out of a full 48-byte reply.
    pub fn parse(reply: &[u8]) -> Result<Self, FrameError> {
        if reply.len() != IDENTIFY_REPLY_LEN {
            return Err(FrameError::Truncated {
                expected: IDENTIFY_REPLY_LEN,
                got: reply.len(),
            });
        }

        let driver_end = IDX_DATA_START + NAME_LEN;
        let motor_end = driver_end + NAME_LEN;

        Ok(Self {
            driver_name: parse_name(&reply[IDX_DATA_START..driver_end]),
            motor_name: parse_name(&reply[driver_end..motor_end]),
            hardware_version: reply[motor_end],
            firmware_version: reply[motor_end + 1],
        })
    }
}

fn parse_name(field: &[u8]) -> String {
    String::from_utf8_lossy(field)
        .trim_end_matches('\0')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info_reply(motor_id: u8) -> Vec<u8> {
        let mut reply = vec![
            FRAME_HEAD,
            Opcode::ReadInfo as u8,
            motor_id,
            INFO_DATA_LEN,
            identify_reply_checksum(motor_id),
        ];
        reply.extend_from_slice(b"RMDS-V3\0\0\0\0\0\0\0\0\0\0\0\0\0");
        reply.extend_from_slice(b"RMD-S-4005\0\0\0\0\0\0\0\0\0\0");
        reply.push(2); // hardware
        reply.push(7); // firmware
        reply.push(checksum(&reply[IDX_DATA_START..]));
        reply
    }

    #[test]
    fn identify_command_bytes() {
        let frame = identify_command(1);
        assert_eq!(frame.as_bytes(), &[0x3E, 0x12, 0x01, 0x00, 0x51]);
    }

    #[test]
    fn reply_checksum_matches_fixed_offset() {
        // 0x3E + 0x12 + id + 0x2A = 0x50 + id + 0x2A
        for id in [0u8, 1, 5, 0xF0] {
            assert_eq!(
                identify_reply_checksum(id),
                0x50u8.wrapping_add(id).wrapping_add(0x2A)
            );
        }
    }

    #[test]
    fn parse_extracts_identity_fields() {
        let reply = info_reply(1);
        assert_eq!(reply.len(), IDENTIFY_REPLY_LEN);

        let info = MotorInfo::parse(&reply).unwrap();
        assert_eq!(info.driver_name, "RMDS-V3");
        assert_eq!(info.motor_name, "RMD-S-4005");
        assert_eq!(info.hardware_version, 2);
        assert_eq!(info.firmware_version, 7);
    }

    #[test]
    fn parse_rejects_short_reply() {
        let reply = info_reply(1);
        assert!(matches!(
            MotorInfo::parse(&reply[..40]),
            Err(FrameError::Truncated { expected: 48, got: 40 })
        ));
    }
}
