use super::playout::PlayoutTimer;
use super::SynthParams;
use std::sync::Arc;

/// Ramp oscillator rendering the shared parameters into 16-bit samples.
///
/// Owns the phase state exclusively; configuration threads reach it only
/// through the atomics in [`SynthParams`]. Each sample rises linearly from 0
/// to the current amplitude across one period. A staged period change (new
/// frequency, or a mute from the playout countdown) is adopted at the wrap
/// boundary and forces the phase back to zero; an ordinary wrap merely
/// subtracts the period, preserving phase.
pub struct ToneOscillator {
    params: Arc<SynthParams>,
    sample_period_ns: u32,
    period_ns: u32,
    position: u32,
    playout: PlayoutTimer,
}

impl ToneOscillator {
    pub fn new(params: Arc<SynthParams>) -> Self {
        let sample_period_ns = params.sample_period_ns();
        let playout = PlayoutTimer::new(Arc::clone(&params));
        Self {
            params,
            sample_period_ns,
            period_ns: 0,
            position: 0,
            playout,
        }
    }

    /// Render one sample and advance the phase accumulator by one sample
    /// period.
    pub fn next_sample(&mut self) -> u16 {
        // Widened to u64: amplitude * position exceeds u32 for low
        // frequencies. The quotient always fits, amplitude <= 1023.
        let sample = if self.period_ns > 0 {
            (u64::from(self.params.amplitude()) * u64::from(self.position)
                / u64::from(self.period_ns)) as u16
        } else {
            0
        };

        self.position = self.position.wrapping_add(self.sample_period_ns);

        // While muted (period 0) this branch is taken every sample, so a
        // staged period is adopted immediately.
        if self.position >= self.period_ns {
            self.position -= self.period_ns;
            let pending = self.params.new_period_ns();
            if self.period_ns != pending {
                self.period_ns = pending;
                self.position = 0;
            }
        }

        self.playout.tick();

        sample
    }

    /// Fill `buffer`, one sample per slot.
    pub fn fill(&mut self, buffer: &mut [u16]) {
        for slot in buffer.iter_mut() {
            *slot = self.next_sample();
        }
    }

    /// Period currently being rendered, in nanoseconds (0 = silence).
    pub fn period_ns(&self) -> u32 {
        self.period_ns
    }

    /// Current phase within the period, in nanoseconds.
    pub fn position(&self) -> u32 {
        self.position
    }
}
