//! Integration tests for the monitor session
//!
//! Drives the complete decode path through a mock transport.

use bytes::Bytes;
use hdlc_link::codec::{Event, HdlcCodec};
use hdlc_link::config::Config;
use hdlc_link::error::MonitorError;
use hdlc_link::hdlc::{encode_frame, encode_ui_frame, DataLoss, DecodeError, DecodedFrame};
use hdlc_link::monitor::{self, MonitorSession, Stats};
use hdlc_link::transport::TransportChannels;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

// =============================================================================
// Mock Transport
// =============================================================================

/// Mock transport: the test feeds the rx side and inspects the tx side
struct MockTransport {
    /// Bytes "received from the wire"
    wire_in: mpsc::Sender<Bytes>,
    /// Bytes the session wrote to the wire
    wire_out: mpsc::Receiver<Bytes>,
}

impl MockTransport {
    fn new() -> (Self, TransportChannels) {
        let (wire_in, rx) = mpsc::channel::<Bytes>(16);
        let (tx, wire_out) = mpsc::channel::<Bytes>(16);
        let channels = TransportChannels {
            rx,
            tx,
            writer_done: None,
        };
        (Self { wire_in, wire_out }, channels)
    }

    async fn feed(&self, data: &[u8]) {
        self.wire_in
            .send(Bytes::copy_from_slice(data))
            .await
            .expect("session stopped reading");
    }
}

fn frame(address: u64, control: u8, payload: &[u8]) -> Vec<u8> {
    let mut wire = Vec::new();
    encode_frame(address, control, payload, &mut wire);
    wire
}

fn decoded(address: u64, control: u8, payload: &'static [u8]) -> Event {
    Event::Frame(DecodedFrame {
        address,
        control,
        payload: Bytes::from_static(payload),
    })
}

async fn next_event(events: &mut mpsc::Receiver<Event>) -> Event {
    tokio::time::timeout(Duration::from_secs(2), events.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_frames_split_across_chunks() {
    let (mock, channels) = MockTransport::new();
    let stats = Arc::new(Stats::new());
    let (event_tx, mut events) = mpsc::channel(16);
    let shutdown = Arc::new(AtomicBool::new(false));

    let session = MonitorSession::new(channels, HdlcCodec::new(64, 1), stats.clone(), event_tx);
    let handle = tokio::spawn(session.run(shutdown));

    let mut wire = frame(1, 2, &[0xAA, 0xBB, 0xCC]);
    wire.extend(frame(7, 3, b"\x7E\x7D"));
    for chunk in wire.chunks(3) {
        mock.feed(chunk).await;
    }

    assert_eq!(next_event(&mut events).await, decoded(1, 2, &[0xAA, 0xBB, 0xCC]));
    assert_eq!(next_event(&mut events).await, decoded(7, 3, b"\x7E\x7D"));

    drop(mock);
    handle.await.unwrap().unwrap();

    let snap = stats.snapshot();
    assert_eq!(snap.frames, 2);
    assert_eq!(snap.rx_bytes, wire.len() as u64);
    assert_eq!(snap.data_loss, 0);
}

#[tokio::test]
async fn test_errors_are_forwarded_and_counted() {
    let (mock, channels) = MockTransport::new();
    let stats = Arc::new(Stats::new());
    let (event_tx, mut events) = mpsc::channel(16);
    let shutdown = Arc::new(AtomicBool::new(false));

    let session = MonitorSession::new(channels, HdlcCodec::new(16, 1), stats.clone(), event_tx);
    let handle = tokio::spawn(session.run(shutdown));

    let mut corrupt = frame(1, 2, &[0xAA, 0xBB, 0xCC]);
    corrupt[3] ^= 0x01;
    mock.feed(&corrupt).await;
    assert!(matches!(
        next_event(&mut events).await,
        Event::Error(DecodeError::DataLoss(DataLoss::ChecksumMismatch { .. }))
    ));

    mock.feed(&frame(1, 3, &[0u8; 32])).await;
    assert!(matches!(
        next_event(&mut events).await,
        Event::Error(DecodeError::ResourceExhausted { capacity: 16, .. })
    ));

    mock.feed(&frame(1, 3, b"ok")).await;
    assert_eq!(next_event(&mut events).await, decoded(1, 3, b"ok"));

    drop(mock);
    handle.await.unwrap().unwrap();

    let snap = stats.snapshot();
    assert_eq!(snap.frames, 1);
    assert_eq!(snap.data_loss, 1);
    assert_eq!(snap.oversize, 1);
}

#[tokio::test]
async fn test_frame_timeout_drops_partial_frame() {
    let (mock, channels) = MockTransport::new();
    let stats = Arc::new(Stats::new());
    let (event_tx, mut events) = mpsc::channel(16);
    let shutdown = Arc::new(AtomicBool::new(false));

    let session = MonitorSession::new(channels, HdlcCodec::new(64, 1), stats.clone(), event_tx)
        .with_frame_timeout(Some(Duration::from_millis(20)));
    let handle = tokio::spawn(session.run(shutdown));

    let wire = frame(1, 2, &[0xAA, 0xBB, 0xCC]);
    mock.feed(&wire[..3]).await;
    tokio::time::sleep(Duration::from_millis(200)).await;

    // The tail arrives after the partial frame was abandoned
    mock.feed(&wire[3..]).await;
    assert_eq!(
        next_event(&mut events).await,
        Event::Error(DecodeError::DataLoss(DataLoss::Noise {
            discarded: wire.len() - 4
        }))
    );

    mock.feed(&wire).await;
    assert_eq!(next_event(&mut events).await, decoded(1, 2, &[0xAA, 0xBB, 0xCC]));

    drop(mock);
    handle.await.unwrap().unwrap();
    assert_eq!(stats.snapshot().timeouts, 1);
}

#[tokio::test]
async fn test_outgoing_payloads_are_encoded() {
    let (mut mock, channels) = MockTransport::new();
    let stats = Arc::new(Stats::new());
    let (event_tx, _events) = mpsc::channel(16);
    let (out_tx, out_rx) = mpsc::channel(4);
    let shutdown = Arc::new(AtomicBool::new(false));

    let session = MonitorSession::new(channels, HdlcCodec::new(64, 42), stats.clone(), event_tx)
        .with_outgoing(out_rx);
    let handle = tokio::spawn(session.run(shutdown));

    out_tx.send(Bytes::from_static(b"ping")).await.unwrap();
    let written = tokio::time::timeout(Duration::from_secs(2), mock.wire_out.recv())
        .await
        .unwrap()
        .unwrap();

    let mut expected = Vec::new();
    encode_ui_frame(42, b"ping", &mut expected);
    assert_eq!(written.as_ref(), expected.as_slice());

    drop(mock);
    handle.await.unwrap().unwrap();
    assert_eq!(stats.snapshot().tx_bytes, expected.len() as u64);
}

#[tokio::test]
async fn test_shutdown_flag_stops_session() {
    let (_mock, channels) = MockTransport::new();
    let (event_tx, _events) = mpsc::channel(16);
    let shutdown = Arc::new(AtomicBool::new(false));

    let session = MonitorSession::new(channels, HdlcCodec::default(), Arc::new(Stats::new()), event_tx);
    let handle = tokio::spawn(session.run(shutdown.clone()));

    shutdown.store(true, Ordering::SeqCst);
    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("session did not stop")
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_dropped_event_receiver_stops_session() {
    let (mock, channels) = MockTransport::new();
    let (event_tx, events) = mpsc::channel(16);
    let shutdown = Arc::new(AtomicBool::new(false));

    let session = MonitorSession::new(channels, HdlcCodec::default(), Arc::new(Stats::new()), event_tx);
    let handle = tokio::spawn(session.run(shutdown));

    drop(events);
    mock.feed(&frame(1, 3, b"lost")).await;

    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("session did not stop")
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_session_stops_after_outgoing_drained() {
    let (mut mock, channels) = MockTransport::new();
    let stats = Arc::new(Stats::new());
    let (event_tx, _events) = mpsc::channel(16);
    let (out_tx, out_rx) = mpsc::channel(4);
    let shutdown = Arc::new(AtomicBool::new(false));

    out_tx.send(Bytes::from_static(b"one")).await.unwrap();
    out_tx.send(Bytes::from_static(b"two")).await.unwrap();
    drop(out_tx);

    let session = MonitorSession::new(channels, HdlcCodec::new(64, 1), stats.clone(), event_tx)
        .with_outgoing(out_rx);

    // Transport stays open: only the closed outgoing channel ends the session
    tokio::time::timeout(Duration::from_secs(2), session.run(shutdown))
        .await
        .expect("session did not stop")
        .unwrap();

    let mut written = Vec::new();
    while let Some(chunk) = mock.wire_out.recv().await {
        written.extend_from_slice(&chunk);
    }
    let mut expected = Vec::new();
    encode_ui_frame(1, b"one", &mut expected);
    encode_ui_frame(1, b"two", &mut expected);
    assert_eq!(written, expected);
    assert_eq!(stats.snapshot().tx_bytes, expected.len() as u64);
    drop(mock);
}

/// Writer that records everything and reports `report(len)` when it stops
fn spawn_writer(
    mut wire_out: mpsc::Receiver<Bytes>,
    report: fn(usize) -> usize,
) -> (oneshot::Receiver<usize>, tokio::task::JoinHandle<Vec<u8>>) {
    let (done_tx, done_rx) = oneshot::channel();
    let handle = tokio::spawn(async move {
        // Slow writer: delivery must not depend on timing
        tokio::time::sleep(Duration::from_millis(100)).await;
        let mut written = Vec::new();
        while let Some(chunk) = wire_out.recv().await {
            written.extend_from_slice(&chunk);
        }
        let _ = done_tx.send(report(written.len()));
        written
    });
    (done_rx, handle)
}

#[tokio::test]
async fn test_send_waits_for_writer() {
    let (mock, mut channels) = MockTransport::new();
    let MockTransport { wire_in, wire_out } = mock;
    let (done, writer) = spawn_writer(wire_out, |len| len);
    channels.writer_done = Some(done);

    let mut config = Config::default();
    config.decoder.address = 9;
    let shutdown = Arc::new(AtomicBool::new(false));

    let sent = monitor::send(&config, channels, shutdown, Bytes::from_static(b"hello"))
        .await
        .unwrap();

    let mut expected = Vec::new();
    encode_ui_frame(9, b"hello", &mut expected);
    assert_eq!(sent, expected.len());
    assert_eq!(writer.await.unwrap(), expected);
    drop(wire_in);
}

#[tokio::test]
async fn test_send_reports_incomplete_write() {
    let (mock, mut channels) = MockTransport::new();
    let MockTransport { wire_in, wire_out } = mock;
    let (done, _writer) = spawn_writer(wire_out, |len| len / 2);
    channels.writer_done = Some(done);

    let result = monitor::send(
        &Config::default(),
        channels,
        Arc::new(AtomicBool::new(false)),
        Bytes::from_static(b"hello"),
    )
    .await;

    assert!(matches!(
        result,
        Err(MonitorError::WriteIncomplete { written, expected }) if written < expected
    ));
    drop(wire_in);
}

#[tokio::test]
async fn test_send_to_closed_transport_fails() {
    let (mock, channels) = MockTransport::new();
    let MockTransport { wire_in, wire_out } = mock;
    drop(wire_out);

    let result = monitor::send(
        &Config::default(),
        channels,
        Arc::new(AtomicBool::new(false)),
        Bytes::from_static(b"lost"),
    )
    .await;

    assert!(matches!(result, Err(MonitorError::TransportClosed)));
    drop(wire_in);
}
