//! Serial transport for UART / USB CDC links
//!
//! Uses blocking threads for low-latency I/O:
//! - Reader thread: reads from serial port, sends to channel
//! - Writer thread: receives from channel, writes to serial port
//!
//! The reader stops when:
//! - `shutdown` flag is set
//! - Serial port disconnects (detected via consecutive read errors)
//!
//! The writer stops once every `tx` sender is dropped or a write fails.

use super::{Transport, TransportChannels};
use crate::config::DeviceConfig;
use crate::constants::{
    CHANNEL_CAPACITY, READ_CHUNK_SIZE, SERIAL_DISCONNECT_THRESHOLD, SERIAL_READ_TIMEOUT_MS,
};
use crate::error::{MonitorError, Result};
use bytes::Bytes;
use serialport::{SerialPortInfo, SerialPortType};
use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

/// Serial transport
///
/// # Example
///
/// ```ignore
/// let port = SerialTransport::detect(&device_config)?;
/// let channels = SerialTransport::new(&port, 115_200).spawn(shutdown)?;
/// ```
pub struct SerialTransport {
    port_name: String,
    baud_rate: u32,
}

impl SerialTransport {
    /// Create a new serial transport for the specified port
    pub fn new(port_name: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            port_name: port_name.into(),
            baud_rate,
        }
    }

    /// Detect a USB device matching the given configuration
    ///
    /// Searches available serial ports for a device matching the VID/PID
    /// specified in the config. Falls back to name matching if
    /// VID/PID info is not available.
    ///
    /// # Errors
    ///
    /// - `NoDeviceFound` - No matching device found
    /// - `MultipleDevicesFound` - More than one matching device found
    pub fn detect(config: &DeviceConfig) -> Result<String> {
        let ports = serialport::available_ports().unwrap_or_default();
        select_port(&ports, config)
    }

    /// Open the serial port
    pub fn open(port_name: &str, baud_rate: u32) -> Result<Box<dyn serialport::SerialPort>> {
        serialport::new(port_name, baud_rate)
            .timeout(Duration::from_millis(SERIAL_READ_TIMEOUT_MS))
            .open()
            .map_err(|e| MonitorError::SerialOpen {
                port: port_name.to_string(),
                source: std::io::Error::other(e.to_string()),
            })
    }
}

/// Pick the single port matching `config`
fn select_port(ports: &[SerialPortInfo], config: &DeviceConfig) -> Result<String> {
    let matching: Vec<_> = ports.iter().filter(|p| matches_device(p, config)).collect();

    match matching.len() {
        0 => Err(MonitorError::NoDeviceFound),
        1 => Ok(matching[0].port_name.clone()),
        n => Err(MonitorError::MultipleDevicesFound { count: n }),
    }
}

/// Check if a serial port matches the device configuration
fn matches_device(port: &SerialPortInfo, config: &DeviceConfig) -> bool {
    match &port.port_type {
        SerialPortType::UsbPort(usb) => usb.vid == config.vid && config.pid_list.contains(&usb.pid),
        _ => config
            .name_hint
            .as_deref()
            .map(|hint| port.port_name.contains(hint))
            .unwrap_or(false),
    }
}

impl Transport for SerialTransport {
    fn spawn(self, shutdown: Arc<AtomicBool>) -> Result<TransportChannels> {
        let (in_tx, in_rx) = mpsc::channel::<Bytes>(CHANNEL_CAPACITY);
        let (out_tx, mut out_rx) = mpsc::channel::<Bytes>(CHANNEL_CAPACITY);

        let port_read = Self::open(&self.port_name, self.baud_rate)?;
        let port_write = port_read.try_clone().map_err(|e| MonitorError::SerialOpen {
            port: self.port_name.clone(),
            source: std::io::Error::other(e.to_string()),
        })?;
        debug!(port = %self.port_name, baud = self.baud_rate, "serial port open");

        // Reader thread (blocking)
        let port_name = self.port_name.clone();
        std::thread::spawn(move || {
            let mut port = port_read;
            let mut buf = [0u8; READ_CHUNK_SIZE];
            let mut consecutive_errors = 0u32;

            while !shutdown.load(Ordering::Relaxed) {
                match port.read(&mut buf) {
                    Ok(n) if n > 0 => {
                        consecutive_errors = 0;
                        if in_tx
                            .blocking_send(Bytes::copy_from_slice(&buf[..n]))
                            .is_err()
                        {
                            // Receiver dropped
                            break;
                        }
                    }
                    Ok(_) => {
                        consecutive_errors += 1;
                        if consecutive_errors > SERIAL_DISCONNECT_THRESHOLD {
                            warn!(port = %port_name, "serial port stopped responding");
                            break;
                        }
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::TimedOut => {
                        consecutive_errors = 0;
                    }
                    Err(e) => {
                        warn!(port = %port_name, "serial read failed: {}", e);
                        break;
                    }
                }
            }
        });

        // Writer thread (blocking)
        // Drains the channel until every sender is gone, so queued frames
        // are never dropped on shutdown.
        let (done_tx, done_rx) = oneshot::channel();
        std::thread::spawn(move || {
            let mut port = port_write;
            let mut written = 0usize;

            while let Some(data) = out_rx.blocking_recv() {
                if let Err(e) = port.write_all(&data).and_then(|_| port.flush()) {
                    warn!("serial write failed: {}", e);
                    break;
                }
                written += data.len();
            }
            let _ = done_tx.send(written);
        });

        Ok(TransportChannels {
            rx: in_rx,
            tx: out_tx,
            writer_done: Some(done_rx),
        })
    }
}
