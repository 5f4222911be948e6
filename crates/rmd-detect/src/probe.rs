//! Identification probing for motor discovery.
//!
//! Each candidate port gets the 5-byte read-info command and up to 48 reply
//! bytes to identify itself. Arbitrary unrelated serial devices sit behind
//! some candidates, so anything that goes wrong on one candidate just moves
//! the scan along to the next.

use std::time::Duration;

use rmd_protocol::{
    frame::IDX_HEAD_CHECKSUM,
    identity::{identify_command, identify_reply_checksum, MotorInfo, IDENTIFY_REPLY_LEN},
    BAUD_RATE,
};
use rmd_driver::{SerialTransport, Transport};
use tracing::{debug, info, trace};

use crate::error::DetectError;
use crate::scanner::PortScanner;

/// Result of a successful scan
#[derive(Debug, Clone)]
pub struct DiscoveredMotor {
    /// Device path the motor answered on
    pub port: String,
    /// Identity it reported
    pub info: MotorInfo,
}

/// Configuration for probing
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Timeout for each candidate's reply
    pub timeout: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(1),
        }
    }
}

/// Motor identification prober
pub struct MotorProber {
    config: ProbeConfig,
}

impl MotorProber {
    /// Create a prober with default configuration
    pub fn new() -> Self {
        Self {
            config: ProbeConfig::default(),
        }
    }

    /// Create a prober with custom configuration
    pub fn with_config(config: ProbeConfig) -> Self {
        Self { config }
    }

    /// Run the identification handshake over an already-open transport.
    ///
    /// Accepts iff exactly [`IDENTIFY_REPLY_LEN`] bytes arrive and the
    /// reply's header checksum matches the one the read-info reply for
    /// `motor_id` must carry.
    pub fn probe<T: Transport>(&self, transport: &mut T, motor_id: u8) -> Option<MotorInfo> {
        let command = identify_command(motor_id);

        transport.clear_input().ok()?;
        let written = transport.write(command.as_bytes()).ok()?;
        if written != command.len() {
            trace!(written, "short write during probe");
            return None;
        }

        let mut reply = [0u8; IDENTIFY_REPLY_LEN];
        let got = transport.read(&mut reply).ok()?;
        if got != IDENTIFY_REPLY_LEN {
            trace!(got, "probe reply too short");
            return None;
        }
        if reply[IDX_HEAD_CHECKSUM] != identify_reply_checksum(motor_id) {
            trace!("probe reply checksum mismatch");
            return None;
        }

        MotorInfo::parse(&reply).ok()
    }

    /// Scan candidate ports and return the first one hosting motor
    /// `motor_id`.
    ///
    /// Candidates are opened one at a time; each port is released before the
    /// next is tried.
    pub fn find_motor(&self, motor_id: u8) -> Result<Option<DiscoveredMotor>, DetectError> {
        let scanner = PortScanner::new();
        for port in scanner.candidate_ports()? {
            debug!(%port, "probing candidate");

            let mut transport = match SerialTransport::open(&port, BAUD_RATE, self.config.timeout)
            {
                Ok(transport) => transport,
                Err(e) => {
                    debug!(%port, "skipping candidate: {e}");
                    continue;
                }
            };

            if let Some(info) = self.probe(&mut transport, motor_id) {
                info!(
                    %port,
                    driver = %info.driver_name,
                    motor = %info.motor_name,
                    hardware = info.hardware_version,
                    firmware = info.firmware_version,
                    "identified motor"
                );
                return Ok(Some(DiscoveredMotor { port, info }));
            }
        }

        Ok(None)
    }
}

impl Default for MotorProber {
    fn default() -> Self {
        Self::new()
    }
}

/// Scan with default settings for motor `motor_id`.
///
/// This is a convenience wrapper for callers that do not need to tune the
/// probe timeout.
pub fn find_motor(motor_id: u8) -> Result<Option<DiscoveredMotor>, DetectError> {
    MotorProber::new().find_motor(motor_id)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use rmd_driver::TransportError;

    use super::*;

    struct ScriptedTransport {
        written: Vec<Vec<u8>>,
        replies: VecDeque<Vec<u8>>,
    }

    impl ScriptedTransport {
        fn new(replies: &[Vec<u8>]) -> Self {
            Self {
                written: Vec::new(),
                replies: replies.iter().cloned().collect(),
            }
        }
    }

    impl Transport for ScriptedTransport {
        fn write(&mut self, bytes: &[u8]) -> Result<usize, TransportError> {
            self.written.push(bytes.to_vec());
            Ok(bytes.len())
        }

        fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
            match self.replies.pop_front() {
                Some(reply) => {
                    let n = reply.len().min(buf.len());
                    buf[..n].copy_from_slice(&reply[..n]);
                    Ok(n)
                }
                None => Ok(0),
            }
        }

        fn clear_input(&mut self) -> Result<(), TransportError> {
            Ok(())
        }
    }

    fn valid_reply(motor_id: u8) -> Vec<u8> {
        let mut reply = vec![
            0x3E,
            0x12,
            motor_id,
            0x2A,
            identify_reply_checksum(motor_id),
        ];
        reply.extend_from_slice(b"RMDS-V3\0\0\0\0\0\0\0\0\0\0\0\0\0");
        reply.extend_from_slice(b"RMD-S-4005\0\0\0\0\0\0\0\0\0\0");
        reply.push(1);
        reply.push(4);
        reply.push(rmd_protocol::checksum(&reply[5..]));
        reply
    }

    #[test]
    fn probe_sends_the_identify_command() {
        let mut transport = ScriptedTransport::new(&[valid_reply(1)]);
        let info = MotorProber::new().probe(&mut transport, 1).unwrap();

        assert_eq!(transport.written[0], &[0x3E, 0x12, 0x01, 0x00, 0x51]);
        assert_eq!(info.motor_name, "RMD-S-4005");
        assert_eq!(info.hardware_version, 1);
        assert_eq!(info.firmware_version, 4);
    }

    #[test]
    fn probe_rejects_short_reply() {
        let mut transport = ScriptedTransport::new(&[valid_reply(1)[..20].to_vec()]);
        assert!(MotorProber::new().probe(&mut transport, 1).is_none());
    }

    #[test]
    fn probe_rejects_checksum_mismatch() {
        let mut reply = valid_reply(1);
        reply[IDX_HEAD_CHECKSUM] = reply[IDX_HEAD_CHECKSUM].wrapping_add(1);

        let mut transport = ScriptedTransport::new(&[reply]);
        assert!(MotorProber::new().probe(&mut transport, 1).is_none());
    }

    #[test]
    fn probe_rejects_silent_device() {
        let mut transport = ScriptedTransport::new(&[]);
        assert!(MotorProber::new().probe(&mut transport, 1).is_none());
    }

    #[test]
    fn probe_is_id_specific() {
        // A reply built for id 2 must not be accepted when probing for id 1.
        let mut transport = ScriptedTransport::new(&[valid_reply(2)]);
        assert!(MotorProber::new().probe(&mut transport, 1).is_none());
    }
}
