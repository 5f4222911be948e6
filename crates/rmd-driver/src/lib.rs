//! Blocking driver for RMD series servo motors on a serial link.
//!
//! [`Motor`] owns one [`Transport`] exclusively and sequences commands one at
//! a time: every operation transmits a frame, blocks for the expected-length
//! reply (bounded by the transport timeout), and returns a typed result. A
//! busy guard rejects reentrant calls instead of queueing them.
//!
//! # Example
//!
//! ```rust,no_run
//! use rmd_driver::Motor;
//!
//! let mut motor = Motor::open("/dev/ttyUSB0", 1).unwrap();
//! motor.rotate_to(90.0, Some(100.0)).unwrap();
//! let angle = motor.current_pose().unwrap();
//! println!("at {angle:.2}°");
//! ```

pub mod error;
pub mod motor;
pub mod transport;

pub use error::{MotorError, TransportError};
pub use motor::{Motor, DEFAULT_SPEED, DEFAULT_TIMEOUT};
pub use transport::{SerialTransport, Transport};
