// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for on-demand decode coordination

use qr_scanner::constants::scanner::MAX_ABANDONED_DETECTIONS;
use qr_scanner::errors::DetectionError;
use qr_scanner::{
    CameraFrame, CodeDetector, DecodeCoordinator, DecodeResult, FrameBuffer, Symbology,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Returns "HELLO" for frames with any dark pixel, nothing otherwise
struct DarkPixelDetector {
    calls: AtomicUsize,
}

impl DarkPixelDetector {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }
}

impl CodeDetector for DarkPixelDetector {
    fn detect(&self, frame: &CameraFrame) -> Result<Option<String>, DetectionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let has_dark = frame.data.chunks_exact(4).any(|px| px[0] < 128);
        Ok(has_dark.then(|| "HELLO".to_string()))
    }

    fn symbologies(&self) -> &[Symbology] {
        &[Symbology::Qr]
    }
}

/// Blocks inside `detect` until the test releases it
struct GatedDetector {
    entered: Mutex<Sender<()>>,
    release: Mutex<Receiver<()>>,
    calls: AtomicUsize,
}

impl CodeDetector for GatedDetector {
    fn detect(&self, _frame: &CameraFrame) -> Result<Option<String>, DetectionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.entered.lock().unwrap().send(()).unwrap();
        self.release.lock().unwrap().recv().unwrap();
        Ok(Some("HELLO".to_string()))
    }

    fn symbologies(&self) -> &[Symbology] {
        &[Symbology::Qr]
    }
}

/// Takes longer than any timeout used below
struct SlowDetector;

impl CodeDetector for SlowDetector {
    fn detect(&self, _frame: &CameraFrame) -> Result<Option<String>, DetectionError> {
        std::thread::sleep(Duration::from_millis(300));
        Ok(None)
    }

    fn symbologies(&self) -> &[Symbology] {
        &[Symbology::Qr]
    }
}

fn frame_filled(value: u8) -> CameraFrame {
    CameraFrame::from_rgba(8, 8, vec![value; 8 * 8 * 4]).unwrap()
}

#[tokio::test]
async fn test_empty_buffer_fails_without_detection() {
    let detector = DarkPixelDetector::new();
    let shared: Arc<dyn CodeDetector> = detector.clone();
    let coordinator = DecodeCoordinator::new(Arc::new(FrameBuffer::new()), shared, None);

    let result = coordinator.decode_once().await.unwrap();
    assert_eq!(result, DecodeResult::Failed("no frame available".into()));
    assert_eq!(result.message(), "No frame.");
    assert_eq!(detector.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_frame_with_code_yields_payload() {
    let buffer = Arc::new(FrameBuffer::new());
    buffer.set(frame_filled(0));
    let coordinator = DecodeCoordinator::new(buffer, DarkPixelDetector::new(), None);

    let result = coordinator.decode_once().await.unwrap();
    assert_eq!(result, DecodeResult::Payload("HELLO".into()));
    assert_eq!(result.message(), "HELLO");
}

#[tokio::test]
async fn test_frame_without_code_yields_not_found() {
    let buffer = Arc::new(FrameBuffer::new());
    buffer.set(frame_filled(255));
    let coordinator = DecodeCoordinator::new(buffer, DarkPixelDetector::new(), None);

    let result = coordinator.decode_once().await.unwrap();
    assert_eq!(result, DecodeResult::NotFound);
    assert_eq!(result.message(), "No barcode found.");
}

#[tokio::test]
async fn test_decode_uses_latest_frame() {
    let buffer = Arc::new(FrameBuffer::new());
    let coordinator =
        DecodeCoordinator::new(Arc::clone(&buffer), DarkPixelDetector::new(), None);

    buffer.set(frame_filled(0));
    buffer.set(frame_filled(255));
    assert_eq!(coordinator.decode_once().await, Some(DecodeResult::NotFound));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_trigger_during_decode_is_ignored() {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let detector = Arc::new(GatedDetector {
        entered: Mutex::new(entered_tx),
        release: Mutex::new(release_rx),
        calls: AtomicUsize::new(0),
    });

    let buffer = Arc::new(FrameBuffer::new());
    buffer.set(frame_filled(0));
    let shared: Arc<dyn CodeDetector> = detector.clone();
    let coordinator = Arc::new(DecodeCoordinator::new(buffer, shared, None));

    let first = tokio::spawn({
        let coordinator = Arc::clone(&coordinator);
        async move { coordinator.decode_once().await }
    });

    // Wait until the first decode is inside the detector
    tokio::task::spawn_blocking(move || entered_rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(coordinator.is_decoding());

    assert_eq!(coordinator.decode_once().await, None);

    release_tx.send(()).unwrap();
    assert_eq!(
        first.await.unwrap(),
        Some(DecodeResult::Payload("HELLO".into()))
    );
    assert_eq!(detector.calls.load(Ordering::SeqCst), 1);
    assert!(!coordinator.is_decoding());
}

#[tokio::test]
async fn test_timeout_reports_failure_and_releases_guard() {
    let buffer = Arc::new(FrameBuffer::new());
    buffer.set(frame_filled(0));
    let coordinator = DecodeCoordinator::new(
        buffer,
        Arc::new(SlowDetector),
        Some(Duration::from_millis(50)),
    );

    let result = coordinator.decode_once().await.unwrap();
    assert_eq!(
        result,
        DecodeResult::Failed("detection timed out after 50 ms".into())
    );
    assert!(!coordinator.is_decoding());

    // A new trigger is accepted while the abandoned detection still runs
    assert!(coordinator.decode_once().await.is_some());
}

/// Sleeps like `SlowDetector` and counts its calls
struct CountingSlowDetector {
    calls: AtomicUsize,
}

impl CodeDetector for CountingSlowDetector {
    fn detect(&self, _frame: &CameraFrame) -> Result<Option<String>, DetectionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(300));
        Ok(None)
    }

    fn symbologies(&self) -> &[Symbology] {
        &[Symbology::Qr]
    }
}

#[tokio::test]
async fn test_unresponsive_detector_is_not_piled_up() {
    let buffer = Arc::new(FrameBuffer::new());
    buffer.set(frame_filled(0));
    let detector = Arc::new(CountingSlowDetector {
        calls: AtomicUsize::new(0),
    });
    let shared: Arc<dyn CodeDetector> = detector.clone();
    let coordinator = DecodeCoordinator::new(buffer, shared, Some(Duration::from_millis(20)));

    for _ in 0..MAX_ABANDONED_DETECTIONS {
        assert_eq!(
            coordinator.decode_once().await,
            Some(DecodeResult::Failed("detection timed out after 20 ms".into()))
        );
    }
    assert_eq!(coordinator.abandoned_detections(), MAX_ABANDONED_DETECTIONS);

    // The cap is reached: the trigger fails without another detector call
    let refused = coordinator.decode_once().await.unwrap();
    assert!(
        matches!(refused, DecodeResult::Failed(ref r) if r.starts_with("detector unresponsive"))
    );
    assert_eq!(detector.calls.load(Ordering::SeqCst), MAX_ABANDONED_DETECTIONS);
    assert!(!coordinator.is_decoding());

    // Once the stuck calls return, decoding resumes
    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    while coordinator.abandoned_detections() > 0 {
        assert!(std::time::Instant::now() < deadline, "detections never returned");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(
        coordinator.decode_once().await,
        Some(DecodeResult::Failed("detection timed out after 20 ms".into()))
    );
    assert_eq!(
        detector.calls.load(Ordering::SeqCst),
        MAX_ABANDONED_DETECTIONS + 1
    );
}
