//! HDLC Monitor - decode HDLC-framed traffic from a serial link
//!
//! Usage:
//!   hdlc-monitor                          Monitor the configured serial port
//!   hdlc-monitor monitor --input cap.bin  Replay a capture ("-" for stdin)
//!   hdlc-monitor decode <HEX>             Decode wire bytes given as hex
//!   hdlc-monitor encode [--address A] <HEX>
//!   hdlc-monitor send [--address A] <HEX> Write a UI frame to the port
//!   hdlc-monitor ports                    List serial ports
//!   hdlc-monitor write-config [PATH]      Save the effective config

use anyhow::Result;
use bytes::Bytes;
use hdlc_link::cli::{Cli, Command};
use hdlc_link::codec::Event;
use hdlc_link::config::{self, Config};
use hdlc_link::constants::CHANNEL_CAPACITY;
use hdlc_link::error::MonitorError;
use hdlc_link::monitor::{self, report, Input, Stats};
use hdlc_link::{commands, logging};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    let mut config = config::load(cli.config.as_deref())?;
    apply_overrides(&mut config, &cli);
    logging::init_tracing(cli.verbose || config.logs.verbose);
    config.validate()?;

    match cli.command() {
        Command::Decode { hex } => {
            for line in commands::decode_hex(&hex, config.decoder.buffer_size)? {
                println!("{}", line);
            }
            Ok(())
        }
        Command::Encode {
            address,
            control,
            payload,
        } => {
            println!("{}", commands::encode_hex(address, control, &payload)?);
            Ok(())
        }
        Command::Ports => list_ports(),
        Command::WriteConfig { path } => {
            let path = path.unwrap_or_else(config::default_path);
            config::save(&config, &path)?;
            eprintln!("Wrote {}", path.display());
            Ok(())
        }
        Command::Send { address, payload } => {
            let payload = commands::parse_hex(&payload)?;
            if let Some(address) = address {
                config.decoder.address = address;
            }
            runtime()?.block_on(send(&config, payload))
        }
        Command::Monitor {
            input,
            frame_timeout,
        } => {
            if let Some(ms) = frame_timeout {
                config.decoder.frame_timeout_ms = ms;
            }
            runtime()?.block_on(run_monitor(&config, input.as_deref()))
        }
    }
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(port) = &cli.port {
        config.link.serial_port = port.clone();
    }
    if let Some(baud) = cli.baud {
        config.link.baud_rate = baud;
    }
    if let Some(size) = cli.buffer_size {
        config.decoder.buffer_size = size;
    }
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
        .map_err(|source| MonitorError::Runtime { source }.into())
}

fn list_ports() -> Result<()> {
    let ports = serialport::available_ports()?;
    if ports.is_empty() {
        eprintln!("No serial ports found");
    }
    for port in ports {
        match port.port_type {
            serialport::SerialPortType::UsbPort(usb) => println!(
                "{}  USB {:04x}:{:04x} {}",
                port.port_name,
                usb.vid,
                usb.pid,
                usb.product.unwrap_or_default()
            ),
            _ => println!("{}", port.port_name),
        }
    }
    Ok(())
}

/// Install ctrl-c / SIGTERM handlers that set the shutdown flag
fn install_shutdown_handler(shutdown: Arc<AtomicBool>) {
    #[cfg(unix)]
    {
        tokio::spawn(async move {
            use tokio::signal::unix::{signal, SignalKind};
            let (Ok(mut sigterm), Ok(mut sigint)) =
                (signal(SignalKind::terminate()), signal(SignalKind::interrupt()))
            else {
                warn!("Cannot install signal handlers");
                return;
            };

            tokio::select! {
                _ = sigterm.recv() => {},
                _ = sigint.recv() => {},
            }
            shutdown.store(true, Ordering::SeqCst);
        });
    }

    #[cfg(not(unix))]
    {
        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            shutdown.store(true, Ordering::SeqCst);
        });
    }
}

async fn run_monitor(config: &Config, replay: Option<&str>) -> Result<()> {
    let input = Input::resolve(config, replay)?;

    let shutdown = Arc::new(AtomicBool::new(false));
    install_shutdown_handler(shutdown.clone());

    let stats = Arc::new(Stats::new());
    let (event_tx, event_rx) = mpsc::channel::<Event>(CHANNEL_CAPACITY);
    let printer = report::spawn_printer(event_rx, config.logs.show_errors);

    info!("Monitoring {:?}", input);
    let channels = input.spawn(shutdown.clone())?;
    monitor::run(config, channels, shutdown, stats.clone(), event_tx, None).await?;
    report::join_printer(printer).await;

    if config.logs.summary {
        eprintln!("{} ({:.1} KB/s)", stats.snapshot(), stats.rx_rate());
    }
    Ok(())
}

async fn send(config: &Config, payload: Vec<u8>) -> Result<()> {
    let input = Input::resolve(config, None)?;
    let target = match &input {
        Input::Serial { port, .. } => port.clone(),
        Input::Replay(_) => return Err(MonitorError::NoDeviceFound.into()),
    };

    let shutdown = Arc::new(AtomicBool::new(false));
    let channels = input.spawn(shutdown.clone())?;
    let result = monitor::send(config, channels, shutdown.clone(), Bytes::from(payload)).await;
    // Stop the reader thread
    shutdown.store(true, Ordering::SeqCst);

    let written = result?;
    eprintln!("Sent {} bytes to {}", written, target);
    Ok(())
}
