//! Configuration module
//!
//! Console settings with TOML persistence, plus the platform config
//! directory lookup used by the demo binary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::engine::EngineOptions;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Could not read or write the config file
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config could not be serialized
    #[error("config encode error: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// Console configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Prompt printed at startup and after every completed command
    pub prompt: String,
    /// Outbound ring buffer capacity in bytes
    pub tx_buffer_size: usize,
    /// Line buffer capacity in bytes
    pub line_size: usize,
    /// Bytes pulled from the transport per poll tick
    pub rx_chunk_size: usize,
    /// Maximum tokens per command line
    pub max_tokens: usize,
    /// Deadline for bounded-wait prints, in milliseconds
    pub safe_print_timeout_ms: u64,
    /// Poll interval of the demo loop, in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            prompt: "\r\n> ".to_string(),
            tx_buffer_size: 256,
            line_size: 128,
            rx_chunk_size: 64,
            max_tokens: 10,
            safe_print_timeout_ms: 100,
            poll_interval_ms: 1,
        }
    }
}

impl ConsoleConfig {
    /// Load from the platform config dir, falling back to defaults
    /// when no file exists yet.
    pub fn load() -> Result<Self, ConfigError> {
        match config_dir().map(|dir| dir.join("config.toml")) {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Save to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Translate into engine options.
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            prompt: self.prompt.clone(),
            tx_buffer_size: self.tx_buffer_size,
            line_size: self.line_size,
            rx_chunk_size: self.rx_chunk_size,
            max_tokens: self.max_tokens,
            safe_print_timeout: Duration::from_millis(self.safe_print_timeout_ms),
        }
    }
}

/// Get the application configuration directory
pub fn config_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "devcon", "Devcon").map(|dirs| dirs.config_dir().to_path_buf())
}
