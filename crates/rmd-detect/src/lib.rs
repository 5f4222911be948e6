//! Motor Port Detection Library
//!
//! This crate finds which serial device an RMD servo controller is attached
//! to: enumerate candidate ports, filter by access permissions, then run the
//! identification handshake against each candidate until one answers
//! correctly.
//!
//! # Example
//!
//! ```rust,no_run
//! use rmd_detect::find_motor;
//!
//! if let Some(found) = find_motor(1).unwrap() {
//!     println!("motor {} on {}", found.info.motor_name, found.port);
//! }
//! ```

pub mod error;
pub mod probe;
pub mod scanner;

pub use error::DetectError;
pub use probe::{find_motor, DiscoveredMotor, MotorProber, ProbeConfig};
pub use scanner::{PortScanner, ScannerConfig};
