mod oscillator;
mod playout;

pub use oscillator::ToneOscillator;
pub use playout::PlayoutTimer;

use crate::error::{Error, Result};
use crate::sink::AudioSink;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Default buffer size in bytes (256 samples).
pub const DEFAULT_BUFFER_SIZE: usize = 512;

/// Maximum volume level.
pub const MAX_VOLUME: i32 = 1023;

const NS_PER_SEC: f64 = 1_000_000_000.0;

/// Parameters shared between configuration calls and the generation thread.
///
/// Everything the setters touch is a relaxed atomic: configuration threads
/// store, the generation thread loads once per sample (once per buffer for
/// the buffer size). Frequency changes are staged in `new_period_ns` and
/// adopted only at a phase-wrap boundary, so a racing store can never tear
/// the ramp mid-cycle. That deferral, not locking, is what keeps frequency
/// changes glitch-free.
pub struct SynthParams {
    sample_rate: u32,
    sample_period_ns: u32,
    amplitude: AtomicU32,
    new_period_ns: AtomicU32,
    playout_time_us: AtomicU32,
    playout_so_far_ns: AtomicU32,
    buffer_size: AtomicUsize,
}

impl SynthParams {
    /// Create the shared parameter block: silent, full volume, default
    /// buffer size. A zero `sample_rate` is a programmer error.
    pub fn new(sample_rate: u32) -> Self {
        debug_assert!(sample_rate > 0);
        Self {
            sample_rate,
            sample_period_ns: 1_000_000_000 / sample_rate,
            amplitude: AtomicU32::new(MAX_VOLUME as u32),
            new_period_ns: AtomicU32::new(0),
            playout_time_us: AtomicU32::new(0),
            playout_so_far_ns: AtomicU32::new(0),
            buffer_size: AtomicUsize::new(DEFAULT_BUFFER_SIZE),
        }
    }

    /// Set the tone frequency, playing indefinitely. 0 Hz silences output.
    pub fn set_frequency(&self, hz: f32) {
        self.set_frequency_for(hz, 0);
    }

    /// Set the tone frequency and stop automatically after `duration_ms`
    /// (0 = play indefinitely).
    ///
    /// The change lands at the next phase-wrap boundary of whatever is
    /// currently playing, never mid-cycle. Any previous countdown is
    /// replaced by the new duration.
    pub fn set_frequency_for(&self, hz: f32, duration_ms: u32) {
        let period_ns = if hz == 0.0 {
            0
        } else {
            (NS_PER_SEC / hz as f64).round() as u32
        };
        self.new_period_ns.store(period_ns, Ordering::Relaxed);
        self.playout_time_us
            .store(duration_ms.saturating_mul(1000), Ordering::Relaxed);
        self.playout_so_far_ns.store(0, Ordering::Relaxed);
    }

    /// Set the output volume, 0..=1023. Takes effect on the next generated
    /// sample, including mid-buffer.
    pub fn set_volume(&self, level: i32) -> Result<()> {
        if !(0..=MAX_VOLUME).contains(&level) {
            return Err(Error::InvalidParameter {
                what: "volume outside 0..=1023",
            });
        }
        self.amplitude.store(level as u32, Ordering::Relaxed);
        Ok(())
    }

    /// Set the size of subsequently allocated buffers, in bytes. Takes
    /// effect at the next buffer allocation.
    ///
    /// Rejects only when the *stored* size is already zero; the check guards
    /// against previously corrupted state, `bytes` itself is not validated.
    pub fn set_buffer_size(&self, bytes: usize) -> Result<()> {
        if self.buffer_size.load(Ordering::Relaxed) == 0 {
            return Err(Error::InvalidParameter {
                what: "stored buffer size is zero",
            });
        }
        self.buffer_size.store(bytes, Ordering::Relaxed);
        Ok(())
    }

    /// Output sample rate in Hz, fixed at construction.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Time represented by one sample, in nanoseconds.
    pub fn sample_period_ns(&self) -> u32 {
        self.sample_period_ns
    }

    /// Most recently requested frequency, in Hz (0 = silence).
    pub fn frequency(&self) -> f32 {
        let period_ns = self.new_period_ns.load(Ordering::Relaxed);
        if period_ns == 0 {
            0.0
        } else {
            (NS_PER_SEC / period_ns as f64) as f32
        }
    }

    /// Current volume, 0..=1023.
    pub fn volume(&self) -> i32 {
        self.amplitude.load(Ordering::Relaxed) as i32
    }

    /// Size of subsequently allocated buffers, in bytes.
    pub fn buffer_size(&self) -> usize {
        self.buffer_size.load(Ordering::Relaxed)
    }

    /// Whether a playout countdown is running (Timed vs Indefinite).
    pub fn is_timed(&self) -> bool {
        self.playout_time_us.load(Ordering::Relaxed) > 0
    }

    pub(crate) fn amplitude(&self) -> u32 {
        self.amplitude.load(Ordering::Relaxed)
    }

    pub(crate) fn new_period_ns(&self) -> u32 {
        self.new_period_ns.load(Ordering::Relaxed)
    }

    /// Stage a mute: the oscillator commits it at its next wrap boundary.
    pub(crate) fn stage_mute(&self) {
        self.new_period_ns.store(0, Ordering::Relaxed);
    }

    pub(crate) fn playout_time_us(&self) -> u32 {
        self.playout_time_us.load(Ordering::Relaxed)
    }

    pub(crate) fn playout_so_far_ns(&self) -> u32 {
        self.playout_so_far_ns.load(Ordering::Relaxed)
    }

    pub(crate) fn store_playout(&self, remaining_us: u32, so_far_ns: u32) {
        self.playout_time_us.store(remaining_us, Ordering::Relaxed);
        self.playout_so_far_ns.store(so_far_ns, Ordering::Relaxed);
    }
}

/// Handle to a tone generator running on its own thread.
///
/// Construction spawns the generation thread; it fills one buffer of the
/// configured size, commits it, notifies the sink via
/// [`AudioSink::pull_request`], and repeats until the handle is dropped.
/// All setters may be called from any thread.
pub struct Synthesizer {
    params: Arc<SynthParams>,
    committed: Arc<parking_lot::Mutex<Arc<Vec<u16>>>>,
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl Synthesizer {
    /// Create a synthesizer and launch its generation thread. The tone
    /// starts silent (frequency 0) at full volume.
    pub fn new(sample_rate: u32, sink: impl AudioSink + 'static) -> Self {
        let params = Arc::new(SynthParams::new(sample_rate));
        let committed = Arc::new(parking_lot::Mutex::new(Arc::new(Vec::new())));
        let stop = Arc::new(AtomicBool::new(false));

        let worker = {
            let params = Arc::clone(&params);
            let committed = Arc::clone(&committed);
            let stop = Arc::clone(&stop);
            let sink = Box::new(sink);
            thread::spawn(move || generation_thread(params, committed, stop, sink))
        };

        Self {
            params,
            committed,
            stop,
            worker: Some(worker),
        }
    }

    /// Most recently committed buffer of 16-bit samples
    /// (`len == buffer_size / 2`).
    ///
    /// Idempotent and non-blocking: repeated calls between commits return
    /// the same data, and the snapshot stays valid while the generator
    /// fills the next buffer.
    pub fn pull(&self) -> Arc<Vec<u16>> {
        Arc::clone(&self.committed.lock())
    }

    /// See [`SynthParams::set_frequency`].
    pub fn set_frequency(&self, hz: f32) {
        self.params.set_frequency(hz);
    }

    /// See [`SynthParams::set_frequency_for`].
    pub fn set_frequency_for(&self, hz: f32, duration_ms: u32) {
        self.params.set_frequency_for(hz, duration_ms);
    }

    /// See [`SynthParams::set_volume`].
    pub fn set_volume(&self, level: i32) -> Result<()> {
        self.params.set_volume(level)
    }

    /// See [`SynthParams::set_buffer_size`].
    pub fn set_buffer_size(&self, bytes: usize) -> Result<()> {
        self.params.set_buffer_size(bytes)
    }

    pub fn sample_rate(&self) -> u32 {
        self.params.sample_rate()
    }

    pub fn frequency(&self) -> f32 {
        self.params.frequency()
    }

    pub fn volume(&self) -> i32 {
        self.params.volume()
    }

    pub fn buffer_size(&self) -> usize {
        self.params.buffer_size()
    }

    pub fn is_timed(&self) -> bool {
        self.params.is_timed()
    }
}

impl Drop for Synthesizer {
    fn drop(&mut self) {
        // The stop flag is checked once per completed buffer. A sink that
        // blocks in pull_request must have been released (e.g. by dropping
        // the ReadySink receiver) before the join can finish.
        self.stop.store(true, Ordering::Relaxed);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn generation_thread(
    params: Arc<SynthParams>,
    committed: Arc<parking_lot::Mutex<Arc<Vec<u16>>>>,
    stop: Arc<AtomicBool>,
    mut sink: Box<dyn AudioSink>,
) {
    eprintln!(
        "[synth] generation thread up: {} Hz sample rate, {} byte buffers",
        params.sample_rate(),
        params.buffer_size()
    );

    let mut oscillator = ToneOscillator::new(Arc::clone(&params));

    while !stop.load(Ordering::Relaxed) {
        // Buffer size is re-read here, so a set_buffer_size call lands at
        // the next allocation, never mid-fill.
        let samples = params.buffer_size() / 2;
        let mut buffer = vec![0u16; samples];
        oscillator.fill(&mut buffer);

        *committed.lock() = Arc::new(buffer);
        sink.pull_request();
    }

    eprintln!("[synth] generation thread stopped");
}
