//! Continuous-tone sample generator.
//!
//! A sawtooth/ramp oscillator runs on a dedicated generation thread,
//! filling fixed-size buffers of 16-bit samples and notifying a downstream
//! [`AudioSink`] once per completed buffer; the sink retrieves the buffer
//! through [`Synthesizer::pull`]. Frequency changes and timed-tone expiry
//! commit only at phase-wrap boundaries, so a running tone never glitches
//! mid-cycle.
//!
//! ```no_run
//! use sawgen::{ReadySink, Synthesizer};
//!
//! let (sink, ready) = ReadySink::new();
//! let synth = Synthesizer::new(16_000, sink);
//! synth.set_frequency_for(440.0, 500); // A4 for half a second
//!
//! while ready.recv().is_ok() {
//!     let buffer = synth.pull();
//!     // hand `buffer` to the output stage
//!     # if buffer.iter().all(|&s| s == 0) { break; }
//! }
//! ```

pub mod config;
pub mod error;
pub mod sink;
pub mod synth;

pub use config::Settings;
pub use error::{Error, Result};
pub use sink::{AudioSink, NullSink, ReadySink};
pub use synth::{
    PlayoutTimer, SynthParams, Synthesizer, ToneOscillator, DEFAULT_BUFFER_SIZE, MAX_VOLUME,
};
