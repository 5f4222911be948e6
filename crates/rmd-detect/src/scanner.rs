//! Candidate serial device enumeration.
//!
//! The controller shows up as a USB serial adapter, so candidates are the
//! `ttyUSB<n>` nodes under `/dev`. Nodes the current user could not open
//! anyway (missing read+write for owner, group and others) are filtered out
//! before any probing happens.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use tracing::debug;

use crate::error::DetectError;

/// Serial device scanner configuration
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Directory holding the device nodes
    pub device_dir: PathBuf,
    /// Device name prefix; the rest of the name must be digits
    pub name_prefix: String,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            device_dir: PathBuf::from("/dev"),
            name_prefix: "ttyUSB".to_string(),
        }
    }
}

/// Enumerates serial device nodes that are worth probing.
pub struct PortScanner {
    config: ScannerConfig,
}

impl PortScanner {
    /// Create a scanner with the default configuration
    pub fn new() -> Self {
        Self {
            config: ScannerConfig::default(),
        }
    }

    /// Create a scanner with custom configuration
    pub fn with_config(config: ScannerConfig) -> Self {
        Self { config }
    }

    /// List candidate device paths, name-filtered, permission-filtered and
    /// sorted for a deterministic probe order.
    pub fn candidate_ports(&self) -> Result<Vec<String>, DetectError> {
        let entries = fs::read_dir(&self.config.device_dir).map_err(|source| {
            DetectError::Enumeration {
                dir: self.config.device_dir.clone(),
                source,
            }
        })?;

        let mut candidates = Vec::new();
        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if !matches_pattern(name, &self.config.name_prefix) {
                continue;
            }

            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            if !grants_rw_to_all(metadata.permissions().mode()) {
                debug!(device = name, "skipping candidate without rw access");
                continue;
            }

            let Some(path) = entry.path().to_str().map(str::to_string) else {
                continue;
            };
            candidates.push(path);
        }

        candidates.sort();
        Ok(candidates)
    }
}

impl Default for PortScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// True when `name` is the prefix followed only by digits.
fn matches_pattern(name: &str, prefix: &str) -> bool {
    match name.strip_prefix(prefix) {
        Some(rest) => rest.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

/// True when the mode bits grant read and write to owner, group and others.
fn grants_rw_to_all(mode: u32) -> bool {
    const RW_ALL: u32 = 0o666;
    mode & RW_ALL == RW_ALL
}
