//! Integration tests for the threaded generation engine.
//!
//! These pace the generator through a `ReadySink`, whose capacity-1 ready
//! channel keeps it at most one buffer ahead of the test. After taking a
//! token and giving the generator a moment to commit the next buffer, it is
//! parked in `pull_request`, so the committed buffer is stable.

use crossbeam_channel::Receiver;
use sawgen::{NullSink, ReadySink, Synthesizer, DEFAULT_BUFFER_SIZE};
use std::thread;
use std::time::Duration;

fn next_stable_buffer(synth: &Synthesizer, ready: &Receiver<()>) -> std::sync::Arc<Vec<u16>> {
    ready
        .recv_timeout(Duration::from_secs(5))
        .expect("generator stopped producing");
    // Give the generator time to commit the following buffer and block.
    thread::sleep(Duration::from_millis(2));
    synth.pull()
}

#[test]
fn pull_is_idempotent_between_commits() {
    let (sink, ready) = ReadySink::new();
    let synth = Synthesizer::new(16_000, sink);
    synth.set_frequency(440.0);

    let buffer = next_stable_buffer(&synth, &ready);
    assert_eq!(buffer.len(), DEFAULT_BUFFER_SIZE / 2);

    // No commit can land while the generator is parked, so repeated pulls
    // are bit-identical.
    let again = synth.pull();
    assert_eq!(*buffer, *again);
    let again = synth.pull();
    assert_eq!(*buffer, *again);

    drop(ready);
}

#[test]
fn samples_stay_within_amplitude_bounds() {
    let (sink, ready) = ReadySink::new();
    let synth = Synthesizer::new(16_000, sink);
    synth.set_frequency(440.0);
    synth.set_volume(512).unwrap();

    // Buffers already in flight may predate the volume store.
    for _ in 0..2 {
        next_stable_buffer(&synth, &ready);
    }
    for _ in 0..6 {
        let buffer = next_stable_buffer(&synth, &ready);
        assert!(buffer.iter().all(|&s| s <= 512));
    }

    drop(ready);
}

#[test]
fn buffer_size_change_lands_at_next_allocation() {
    let (sink, ready) = ReadySink::new();
    let synth = Synthesizer::new(16_000, sink);
    synth.set_frequency(1000.0);
    synth.set_buffer_size(128).unwrap();
    assert_eq!(synth.buffer_size(), 128);

    // Buffers already in flight keep the old size; the new one shows up
    // within a couple of allocations.
    let mut seen_new_size = false;
    for _ in 0..10 {
        let buffer = next_stable_buffer(&synth, &ready);
        if buffer.len() == 64 {
            seen_new_size = true;
            break;
        }
        assert_eq!(buffer.len(), DEFAULT_BUFFER_SIZE / 2);
    }
    assert!(seen_new_size);

    drop(ready);
}

#[test]
fn timed_tone_goes_silent_within_expected_buffers() {
    // 440 Hz for 500 ms at 16 kHz is 8000 samples of tone, one wrap of
    // slack, spread over 256-sample buffers: 32 or so buffers carry tone.
    let (sink, ready) = ReadySink::new();
    let synth = Synthesizer::new(16_000, sink);
    synth.set_frequency_for(440.0, 500);
    assert!(synth.is_timed());

    let mut tone_buffers = 0u32;
    let mut tone_seen = false;
    for _ in 0..64 {
        let buffer = next_stable_buffer(&synth, &ready);
        let has_tone = buffer.iter().any(|&s| s > 0);
        if has_tone {
            tone_seen = true;
            tone_buffers += 1;
        } else if tone_seen {
            break;
        }
    }

    assert!(tone_seen, "tone never started");
    assert!(
        (30..=35).contains(&tone_buffers),
        "tone spanned {} buffers",
        tone_buffers
    );
    assert!(!synth.is_timed());

    drop(ready);
}

#[test]
fn frequency_zero_silences_output() {
    let (sink, ready) = ReadySink::new();
    let synth = Synthesizer::new(16_000, sink);
    synth.set_frequency(1000.0);

    let mut tone_seen = false;
    for _ in 0..10 {
        let buffer = next_stable_buffer(&synth, &ready);
        if buffer.iter().any(|&s| s > 0) {
            tone_seen = true;
            break;
        }
    }
    assert!(tone_seen, "tone never started");

    synth.set_frequency(0.0);
    let mut silent = false;
    for _ in 0..10 {
        let buffer = next_stable_buffer(&synth, &ready);
        if buffer.iter().all(|&s| s == 0) {
            silent = true;
            break;
        }
    }
    assert!(silent, "output never went silent");

    drop(ready);
}

#[test]
fn shutdown_joins_generation_thread() {
    let synth = Synthesizer::new(48_000, NullSink);
    synth.set_frequency(440.0);
    thread::sleep(Duration::from_millis(5));
    // Drop must stop the free-running generator and join it.
    drop(synth);
}

#[test]
fn setters_are_usable_from_other_threads() {
    let (sink, ready) = ReadySink::new();
    let synth = std::sync::Arc::new(Synthesizer::new(16_000, sink));

    let config_synth = std::sync::Arc::clone(&synth);
    let configurer = thread::spawn(move || {
        config_synth.set_frequency(880.0);
        config_synth.set_volume(700).unwrap();
        config_synth.set_buffer_size(256).unwrap();
    });
    configurer.join().unwrap();

    let mut saw_tone = false;
    for _ in 0..10 {
        let buffer = next_stable_buffer(&synth, &ready);
        if buffer.iter().any(|&s| s > 0) {
            saw_tone = true;
            break;
        }
    }
    assert!(saw_tone);
    // The frequency getter derives from the rounded period.
    assert!((synth.frequency() - 880.0).abs() < 0.01);
    assert_eq!(synth.volume(), 700);

    drop(ready);
}
