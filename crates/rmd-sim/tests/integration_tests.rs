//! Integration tests for the RMD driver stack
//!
//! These tests drive the full path (controller, frame codec, transport
//! trait) against a simulated motor, covering:
//! - absolute and relative positioning in both loop modes
//! - pose readback and the remembered-speed behavior
//! - pause/resume/shutdown echoes
//! - identification probing against well- and mis-matched motors

use rmd_detect::MotorProber;
use rmd_driver::{Motor, MotorError};
use rmd_sim::{VirtualMotor, VirtualMotorConfig};

mod helpers {
    use super::*;

    /// A motor driver wired to a simulated motor with the given id
    pub fn motor_pair(motor_id: u8) -> Motor<VirtualMotor> {
        Motor::new(VirtualMotor::new(motor_id), motor_id)
    }
}

#[test]
fn absolute_move_reads_back_through_both_pose_queries() {
    let mut motor = helpers::motor_pair(1);

    motor.rotate_to(90.0, Some(100.0)).unwrap();
    assert_eq!(motor.current_pose().unwrap(), 90.0);
    assert_eq!(motor.current_multi_pose().unwrap(), 90.0);
}

#[test]
fn relative_moves_accumulate_past_one_revolution() {
    let mut motor = helpers::motor_pair(1);

    for _ in 0..5 {
        motor.rotate_more(90.0, Some(200.0)).unwrap();
    }

    assert_eq!(motor.current_multi_pose().unwrap(), 450.0);
    assert_eq!(motor.current_pose().unwrap(), 90.0);
}

#[test]
fn multi_loop_target_can_be_negative() {
    let mut motor = helpers::motor_pair(1);

    motor.rotate_multi_to(-450.0, Some(300.0)).unwrap();
    assert_eq!(motor.current_multi_pose().unwrap(), -450.0);
    assert_eq!(motor.current_pose().unwrap(), 270.0);
}

#[test]
fn multi_loop_relative_move_tracks_the_increment() {
    let mut motor = helpers::motor_pair(1);

    motor.rotate_multi_more(720.0, Some(100.0)).unwrap();
    motor.rotate_multi_more(45.0, None).unwrap();
    assert_eq!(motor.current_multi_pose().unwrap(), 765.0);
}

#[test]
fn reverse_approach_winds_backwards() {
    let mut motor = helpers::motor_pair(1);

    motor.rotate_to(270.0, Some(-100.0)).unwrap();
    assert_eq!(motor.current_pose().unwrap(), 270.0);
    assert_eq!(motor.current_multi_pose().unwrap(), -90.0);
}

#[test]
fn control_commands_round_trip() {
    let mut motor = helpers::motor_pair(1);

    motor.rotate(Some(60.0)).unwrap();
    assert!(motor.transport_mut().is_running());

    motor.pause().unwrap();
    assert!(!motor.transport_mut().is_running());

    motor.resume().unwrap();
    assert!(motor.transport_mut().is_running());

    motor.shutdown().unwrap();
    assert!(!motor.transport_mut().is_running());
}

#[test]
fn remembered_speed_reaches_the_wire() {
    let mut motor = helpers::motor_pair(1);

    motor.rotate(Some(250.0)).unwrap();
    motor.rotate(Some(0.0)).unwrap();
    motor.rotate(None).unwrap();

    // The remembered 250 deg/s must win over the zero sent in between.
    assert_eq!(motor.remembered_speed(), 250.0);
    assert_eq!(motor.transport_mut().speed(), 250.0);
}

#[test]
fn mismatched_motor_id_is_a_read_failure() {
    // Driver addresses id 1, but the device on the wire is id 2: every
    // command times out with no reply bytes.
    let mut motor = Motor::new(VirtualMotor::new(2), 1);

    assert!(matches!(
        motor.rotate_to(90.0, Some(100.0)),
        Err(MotorError::ShortRead { got: 0, .. })
    ));
}

#[test]
fn prober_identifies_a_configured_motor() {
    let mut sim = VirtualMotor::from_config(VirtualMotorConfig {
        motor_id: 3,
        driver_name: "RMDS-V3".to_string(),
        motor_name: "RMD-S-4010".to_string(),
        hardware_version: 1,
        firmware_version: 9,
        initial_angle: 0.0,
    });

    let info = MotorProber::new().probe(&mut sim, 3).unwrap();
    assert_eq!(info.driver_name, "RMDS-V3");
    assert_eq!(info.motor_name, "RMD-S-4010");
    assert_eq!(info.hardware_version, 1);
    assert_eq!(info.firmware_version, 9);
}

#[test]
fn prober_rejects_a_motor_with_another_id() {
    let mut sim = VirtualMotor::new(2);
    assert!(MotorProber::new().probe(&mut sim, 1).is_none());
}

#[test]
fn prober_leaves_the_motor_usable_by_the_driver() {
    let mut sim = VirtualMotor::new(1);
    assert!(MotorProber::new().probe(&mut sim, 1).is_some());

    let mut motor = Motor::new(sim, 1);
    motor.rotate_to(45.0, Some(90.0)).unwrap();
    assert_eq!(motor.current_pose().unwrap(), 45.0);
}
