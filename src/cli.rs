//! Command-line interface definition using clap
//!
//! Provides structured argument parsing with automatic help generation.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

// =============================================================================
// CLI Definition
// =============================================================================

/// HDLC link monitor: decode framed traffic from a serial port or capture
#[derive(Parser, Debug, Default)]
#[command(name = "hdlc-monitor")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: ./hdlc-monitor.toml if present)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Serial port to use (overrides config)
    #[arg(long, value_name = "PORT", global = true)]
    pub port: Option<String>,

    /// Serial baud rate (overrides config)
    #[arg(long, value_name = "BAUD", global = true)]
    pub baud: Option<u32>,

    /// Reassembly buffer size in bytes (overrides config)
    #[arg(long, value_name = "BYTES", global = true)]
    pub buffer_size: Option<usize>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Decode a live link or a capture (default)
    Monitor {
        /// Replay a capture file instead of a serial port ("-" for stdin)
        #[arg(long, value_name = "FILE")]
        input: Option<String>,

        /// Abandon a partial frame after this many milliseconds of silence
        #[arg(long, value_name = "MS")]
        frame_timeout: Option<u64>,
    },
    /// Decode a hex-encoded byte stream and print every result
    Decode {
        /// Raw wire bytes as hex
        hex: String,
    },
    /// Encode a frame and print the wire bytes as hex
    Encode {
        /// Frame address
        #[arg(long, default_value_t = crate::constants::DEFAULT_ADDRESS)]
        address: u64,

        /// Control byte (default: unnumbered information)
        #[arg(long, default_value_t = crate::hdlc::UI_FRAME_CONTROL)]
        control: u8,

        /// Payload as hex
        payload: String,
    },
    /// Encode a UI frame and write it to the serial port
    Send {
        /// Frame address (overrides config)
        #[arg(long)]
        address: Option<u64>,

        /// Payload as hex
        payload: String,
    },
    /// List available serial ports
    Ports,
    /// Write the effective configuration (file plus overrides) as TOML
    WriteConfig {
        /// Destination (default: ./hdlc-monitor.toml)
        path: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Subcommand, defaulting to `monitor`
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Monitor {
            input: None,
            frame_timeout: None,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
