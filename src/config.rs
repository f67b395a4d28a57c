//! Configuration management
//!
//! Config is read from `--config PATH` or `hdlc-monitor.toml` in the working
//! directory. Every section and field is optional.

use crate::constants::{
    CONFIG_FILE_NAME, DEFAULT_ADDRESS, DEFAULT_BAUD_RATE, DEFAULT_BUFFER_SIZE,
    DEFAULT_FRAME_TIMEOUT_MS,
};
use crate::error::{MonitorError, Result};
use crate::hdlc::MIN_CONTENT_SIZE;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

// =============================================================================
// Device Configuration
// =============================================================================

/// USB device detection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Display name for the device
    pub name: String,
    /// USB Vendor ID
    pub vid: u16,
    /// List of accepted USB Product IDs
    pub pid_list: Vec<u16>,
    /// Port name substring used when USB info is unavailable
    #[serde(default)]
    pub name_hint: Option<String>,
}

// =============================================================================
// Application Configuration
// =============================================================================

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub link: LinkConfig,
    pub decoder: DecoderConfig,
    pub logs: LogsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Serial port name (empty = auto-detect using `device`)
    pub serial_port: String,
    /// Baud rate for UART links (ignored by USB CDC devices)
    pub baud_rate: u32,
    /// Device used for auto-detection when `serial_port` is empty
    pub device: Option<DeviceConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Reassembly buffer size; frames above this are reported as too large
    pub buffer_size: usize,
    /// Abandon a partial frame after this much silence (0 = never)
    pub frame_timeout_ms: u64,
    /// Address for outgoing frames
    pub address: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogsConfig {
    /// Enable debug-level tracing
    pub verbose: bool,
    /// Print corrupt / oversize frames alongside decoded ones
    pub show_errors: bool,
    /// Print a statistics summary on exit
    pub summary: bool,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            serial_port: String::new(),
            baud_rate: DEFAULT_BAUD_RATE,
            device: None,
        }
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            frame_timeout_ms: DEFAULT_FRAME_TIMEOUT_MS,
            address: DEFAULT_ADDRESS,
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            show_errors: true,
            summary: true,
        }
    }
}

impl DecoderConfig {
    /// Staleness timeout, if enabled
    pub fn frame_timeout(&self) -> Option<Duration> {
        (self.frame_timeout_ms > 0).then(|| Duration::from_millis(self.frame_timeout_ms))
    }
}

impl Config {
    /// Check values the decoder and transports depend on
    pub fn validate(&self) -> Result<()> {
        if self.decoder.buffer_size < MIN_CONTENT_SIZE {
            return Err(MonitorError::ConfigValidation {
                field: "decoder.buffer_size",
                reason: format!("must be at least {}", MIN_CONTENT_SIZE),
            });
        }
        if self.link.baud_rate == 0 {
            return Err(MonitorError::ConfigValidation {
                field: "link.baud_rate",
                reason: "must be non-zero".into(),
            });
        }
        if let Some(device) = &self.link.device {
            if device.pid_list.is_empty() && device.name_hint.is_none() {
                return Err(MonitorError::ConfigValidation {
                    field: "link.device",
                    reason: format!("'{}' needs pid_list or name_hint", device.name),
                });
            }
        }
        Ok(())
    }
}

/// Default config file path (working directory)
pub fn default_path() -> PathBuf {
    PathBuf::from(CONFIG_FILE_NAME)
}

/// Read and parse a config file
pub fn load_from(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|e| MonitorError::ConfigRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&content).map_err(|e| MonitorError::ConfigParse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load config from an explicit path, or the default file if present
///
/// An explicit path must load. The default file falls back to defaults
/// with a warning when it is missing or invalid.
pub fn load(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        return load_from(path);
    }

    let path = default_path();
    if !path.exists() {
        return Ok(Config::default());
    }

    match load_from(&path) {
        Ok(config) => Ok(config),
        Err(e) => {
            warn!("{}, using defaults", e);
            Ok(Config::default())
        }
    }
}

/// Save config to file
pub fn save(config: &Config, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config).map_err(|e| MonitorError::ConfigValidation {
        field: "config",
        reason: e.to_string(),
    })?;
    fs::write(path, content).map_err(|e| MonitorError::ConfigRead {
        path: path.to_path_buf(),
        source: e,
    })
}

// ============================================================================
// Tests
// ============================================================================
