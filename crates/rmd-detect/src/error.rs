//! Error types for motor detection

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during detection
#[derive(Debug, Error)]
pub enum DetectError {
    /// Failed to list the serial device directory
    #[error("failed to enumerate {dir}: {source}")]
    Enumeration {
        dir: PathBuf,
        source: std::io::Error,
    },
}
