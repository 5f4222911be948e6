//! Simulation layer for testing the RMD driver stack without hardware.
//!
//! [`VirtualMotor`] implements the driver's transport trait and behaves like
//! one controller on the wire: it validates incoming frames, tracks motion
//! state, and queues protocol-accurate replies. Frames it would not act on
//! (wrong id, bad checksum) get no reply at all, which the driver observes
//! as a read timeout, exactly like real hardware.

pub mod motor;

pub use motor::{VirtualMotor, VirtualMotorConfig};
