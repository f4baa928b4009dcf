// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the shared frame buffer

use qr_scanner::{CameraFrame, FrameBuffer};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

/// A frame whose every byte equals `value`, stamped with `sequence`
fn uniform_frame(value: u8, sequence: u64) -> CameraFrame {
    let mut frame = CameraFrame::from_rgba(64, 48, vec![value; 64 * 48 * 4]).unwrap();
    frame.sequence = sequence;
    frame
}

#[test]
fn test_get_before_set_is_none() {
    let buffer = FrameBuffer::new();
    assert!(buffer.get().is_none());
}

#[test]
fn test_get_returns_most_recent_set() {
    let buffer = FrameBuffer::new();
    for seq in 1..=20u64 {
        buffer.set(uniform_frame(seq as u8, seq));
    }
    assert_eq!(buffer.get().unwrap().sequence, 20);
}

#[test]
fn test_concurrent_readers_never_see_torn_frames() {
    let buffer = Arc::new(FrameBuffer::new());
    let done = Arc::new(AtomicBool::new(false));

    let writer = {
        let buffer = Arc::clone(&buffer);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            for seq in 0..2_000u64 {
                buffer.set(uniform_frame((seq % 251) as u8, seq));
            }
            done.store(true, Ordering::SeqCst);
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let buffer = Arc::clone(&buffer);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut last_sequence = 0u64;
                let mut observed = 0usize;
                while !done.load(Ordering::SeqCst) {
                    let Some(frame) = buffer.get() else {
                        continue;
                    };
                    let expected = (frame.sequence % 251) as u8;
                    assert!(
                        frame.data.iter().all(|&b| b == expected),
                        "frame {} mixes pixels from different writes",
                        frame.sequence
                    );
                    // Single writer, so snapshots only move forward
                    assert!(frame.sequence >= last_sequence);
                    last_sequence = frame.sequence;
                    observed += 1;
                }
                observed
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    assert_eq!(buffer.get().unwrap().sequence, 1_999);
    assert_eq!(buffer.write_count(), 2_000);
}
