//! Centralized error types for the monitor
//!
//! Link-level decode results use [`crate::hdlc::DecodeError`]; everything
//! around the decoder (ports, files, config) is a `MonitorError`.
//! Use `Result<T>` as shorthand for `std::result::Result<T, MonitorError>`.

use std::fmt;
use std::path::PathBuf;

/// All monitor errors
#[derive(Debug)]
pub enum MonitorError {
    // === Transport ===
    /// Failed to open serial port
    SerialOpen {
        port: String,
        source: std::io::Error,
    },
    /// Failed to open a capture file
    InputOpen {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Transport stopped before data could be written
    TransportClosed,
    /// Writer stopped before the whole frame reached the port
    WriteIncomplete { written: usize, expected: usize },

    // === Config ===
    /// Failed to read or write the config file
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Config file is not valid TOML for `Config`
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// Invalid config value
    ConfigValidation { field: &'static str, reason: String },

    // === Input ===
    /// Hex argument could not be parsed
    InvalidHex { source: hex::FromHexError },

    // === Detection ===
    /// No device found matching configuration
    NoDeviceFound,
    /// Multiple devices found matching configuration
    MultipleDevicesFound { count: usize },

    // === Runtime ===
    /// Tokio runtime creation failed
    Runtime { source: std::io::Error },
}

impl std::error::Error for MonitorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::SerialOpen { source, .. }
            | Self::InputOpen { source, .. }
            | Self::ConfigRead { source, .. }
            | Self::Runtime { source } => Some(source),
            Self::ConfigParse { source, .. } => Some(source),
            Self::InvalidHex { source } => Some(source),
            _ => None,
        }
    }
}

impl fmt::Display for MonitorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SerialOpen { port, .. } => write!(f, "Cannot open serial port: {}", port),
            Self::InputOpen { path, .. } => write!(f, "Cannot open input: {}", path.display()),
            Self::TransportClosed => write!(f, "Transport closed"),
            Self::WriteIncomplete { written, expected } => {
                write!(f, "Incomplete write: {} of {} bytes", written, expected)
            }
            Self::ConfigRead { path, .. } => write!(f, "Cannot access config: {}", path.display()),
            Self::ConfigParse { path, source } => {
                write!(f, "Invalid config {}: {}", path.display(), source)
            }
            Self::ConfigValidation { field, reason } => {
                write!(f, "Invalid {}: {}", field, reason)
            }
            Self::InvalidHex { source } => write!(f, "Invalid hex input: {}", source),
            Self::NoDeviceFound => write!(f, "No device found"),
            Self::MultipleDevicesFound { count } => {
                write!(f, "Multiple devices found ({})", count)
            }
            Self::Runtime { .. } => write!(f, "Failed to create runtime"),
        }
    }
}

impl From<hex::FromHexError> for MonitorError {
    fn from(source: hex::FromHexError) -> Self {
        Self::InvalidHex { source }
    }
}

/// Alias for Result with MonitorError
pub type Result<T> = std::result::Result<T, MonitorError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_display() {
        let err = MonitorError::ConfigValidation {
            field: "decoder.buffer_size",
            reason: "must be at least 6".into(),
        };
        assert_eq!(err.to_string(), "Invalid decoder.buffer_size: must be at least 6");
        assert_eq!(
            MonitorError::MultipleDevicesFound { count: 2 }.to_string(),
            "Multiple devices found (2)"
        );
        assert_eq!(
            MonitorError::WriteIncomplete {
                written: 3,
                expected: 11
            }
            .to_string(),
            "Incomplete write: 3 of 11 bytes"
        );
    }

    #[test]
    fn test_source_chain() {
        let err = MonitorError::SerialOpen {
            port: "/dev/ttyUSB0".into(),
            source: std::io::Error::other("busy"),
        };
        assert_eq!(err.source().map(|s| s.to_string()), Some("busy".into()));
        assert!(MonitorError::NoDeviceFound.source().is_none());
    }

    #[test]
    fn test_from_hex_error() {
        let err: MonitorError = hex::decode("zz").unwrap_err().into();
        assert!(matches!(err, MonitorError::InvalidHex { .. }));
    }
}
