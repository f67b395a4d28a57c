//! Human-readable rendering of decode events

use crate::codec::Event;
use chrono::{DateTime, Local};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

/// Timestamp format used in monitor output (HH:MM:SS.mmm)
pub fn timestamp(at: DateTime<Local>) -> String {
    at.format("%H:%M:%S%.3f").to_string()
}

/// One output line for `event`
pub fn format_event(event: &Event, at: DateTime<Local>) -> String {
    let ts = timestamp(at);
    match event {
        Event::Frame(frame) => format!(
            "{} addr={} ctrl=0x{:02X} len={} {}",
            ts,
            frame.address,
            frame.control,
            frame.payload.len(),
            hex::encode_upper(&frame.payload)
        ),
        Event::Error(e) => format!("{} ! {}", ts, e),
    }
}

/// Print events on stdout until the channel closes
///
/// Decode errors are skipped unless `show_errors` is set.
pub fn spawn_printer(mut events: mpsc::Receiver<Event>, show_errors: bool) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            if matches!(event, Event::Error(_)) && !show_errors {
                continue;
            }
            println!("{}", format_event(&event, Local::now()));
        }
    })
}

/// Wait for the printer task; returns false (and logs) if it panicked
pub async fn join_printer(printer: JoinHandle<()>) -> bool {
    match printer.await {
        Ok(()) => true,
        Err(e) => {
            warn!("Event printer failed: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hdlc::{DataLoss, DecodedFrame};
    use bytes::Bytes;
    use chrono::TimeZone;

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 1, 12, 34, 56).unwrap()
    }

    #[test]
    fn test_format_frame() {
        let event = Event::Frame(DecodedFrame {
            address: 1,
            control: 2,
            payload: Bytes::from_static(&[0xAA, 0xBB, 0xCC]),
        });
        assert_eq!(
            format_event(&event, at()),
            "12:34:56.000 addr=1 ctrl=0x02 len=3 AABBCC"
        );
    }

    #[test]
    fn test_format_error() {
        let event = Event::Error(DataLoss::EscapedFlag.into());
        assert_eq!(
            format_event(&event, at()),
            "12:34:56.000 ! Data loss: escaped flag byte"
        );
    }

    #[tokio::test]
    async fn test_printer_finishes_when_channel_closes() {
        let (tx, rx) = mpsc::channel(4);
        let printer = spawn_printer(rx, false);
        tx.send(Event::Error(DataLoss::EscapedFlag.into())).await.unwrap();
        drop(tx);
        assert!(join_printer(printer).await);
    }

    #[tokio::test]
    async fn test_join_printer_reports_panic() {
        let printer = tokio::spawn(async { panic!("printer crashed") });
        assert!(!join_printer(printer).await);
    }
}
