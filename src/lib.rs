//! HDLC link framing and a serial link monitor
//!
//! - [`hdlc`]: sans-I/O streaming decoder, frame parser and encoder
//! - [`codec`]: decoder wrapped for byte-chunk transports
//! - [`transport`]: serial port and capture replay
//! - [`monitor`]: decode session, statistics and reporting

pub mod cli;
pub mod codec;
pub mod commands;
pub mod config;
pub mod constants;
pub mod error;
pub mod hdlc;
pub mod logging;
pub mod monitor;
pub mod transport;
