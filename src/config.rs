//! Runtime configuration for the Atelier service
//!
//! Resolution order for every setting: CLI argument, then environment
//! variable, then built-in default. The data directory holds the feedback
//! file and the voice clip directory side by side:
//!
//! ```text
//! <data_dir>/feedback.json
//! <data_dir>/voice/*.webm
//! ```

use crate::error::{AtelierError, Result};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "ATELIER_DATA_DIR";
/// Environment variable overriding the bind address
pub const ADDR_ENV: &str = "ATELIER_ADDR";

/// Resolved service configuration
#[derive(Debug, Clone)]
pub struct AtelierConfig {
    /// Directory holding the feedback file and voice clips
    pub data_dir: PathBuf,
    /// HTTP bind address
    pub addr: SocketAddr,
}

impl AtelierConfig {
    /// Resolve configuration from CLI arguments, environment, and defaults
    pub fn resolve(cli_data_dir: Option<PathBuf>, cli_addr: Option<String>) -> Result<Self> {
        let data_dir = cli_data_dir
            .or_else(|| std::env::var(DATA_DIR_ENV).ok().map(PathBuf::from))
            .unwrap_or_else(default_data_dir);

        let addr = match cli_addr.or_else(|| std::env::var(ADDR_ENV).ok()) {
            Some(raw) => raw.parse().map_err(|_| {
                AtelierError::Config(format!("Invalid bind address: {raw}"))
            })?,
            None => default_addr(),
        };

        Ok(Self { data_dir, addr })
    }

    /// Path of the JSON array holding all feedback records
    pub fn feedback_file(&self) -> PathBuf {
        self.data_dir.join("feedback.json")
    }

    /// Directory holding uploaded voice clips
    pub fn voice_dir(&self) -> PathBuf {
        self.data_dir.join("voice")
    }
}

impl Default for AtelierConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            addr: default_addr(),
        }
    }
}

/// Default data directory using the XDG local-data standard
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("atelier")
}

fn default_addr() -> SocketAddr {
    ([127, 0, 0, 1], 3000).into()
}
