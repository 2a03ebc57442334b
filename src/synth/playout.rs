use super::SynthParams;
use std::sync::Arc;

/// Countdown from a requested playout duration to a staged mute.
///
/// Two states, encoded in the shared `playout_time_us` field: **Indefinite**
/// (zero, nothing to do) and **Timed** (counting down once per sample). On
/// expiry the timer stages a zero period; the oscillator commits the mute at
/// its next wrap boundary, so a timed tone always ends on a zero crossing.
/// A fresh `set_frequency*` call restarts or cancels the countdown; there is
/// no pause.
pub struct PlayoutTimer {
    params: Arc<SynthParams>,
    sample_period_ns: u32,
}

impl PlayoutTimer {
    pub fn new(params: Arc<SynthParams>) -> Self {
        let sample_period_ns = params.sample_period_ns();
        Self {
            params,
            sample_period_ns,
        }
    }

    /// Advance the countdown by one sample period.
    ///
    /// The ns→µs conversion keeps the sub-microsecond remainder in
    /// `playout_so_far_ns`, so no time is lost across samples.
    pub fn tick(&mut self) {
        let mut remaining_us = self.params.playout_time_us();
        if remaining_us == 0 {
            return;
        }

        let mut so_far_ns = self.params.playout_so_far_ns() + self.sample_period_ns;
        while so_far_ns > 1000 {
            so_far_ns -= 1000;
            if remaining_us > 0 {
                remaining_us -= 1;
            }
        }
        self.params.store_playout(remaining_us, so_far_ns);

        if remaining_us == 0 {
            self.params.stage_mute();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timer(sample_rate: u32) -> (Arc<SynthParams>, PlayoutTimer) {
        let params = Arc::new(SynthParams::new(sample_rate));
        let timer = PlayoutTimer::new(Arc::clone(&params));
        (params, timer)
    }

    #[test]
    fn indefinite_state_is_inert() {
        let (params, mut timer) = timer(16_000);
        params.set_frequency(1000.0);
        for _ in 0..1000 {
            timer.tick();
        }
        assert_eq!(params.new_period_ns(), 1_000_000);
        assert!(!params.is_timed());
    }

    #[test]
    fn countdown_tracks_elapsed_samples() {
        // 62.5 µs per sample at 16 kHz: 16 ticks cover one millisecond,
        // with the final microsecond still parked in the accumulator.
        let (params, mut timer) = timer(16_000);
        params.set_frequency_for(1000.0, 10);
        assert_eq!(params.playout_time_us(), 10_000);

        for _ in 0..16 {
            timer.tick();
        }
        assert_eq!(params.playout_time_us(), 9_001);
        assert_eq!(params.playout_so_far_ns(), 1000);
    }

    #[test]
    fn expiry_stages_mute_and_goes_indefinite() {
        let (params, mut timer) = timer(16_000);
        params.set_frequency_for(1000.0, 1);

        let mut ticks = 0;
        while params.is_timed() {
            timer.tick();
            ticks += 1;
            assert!(ticks <= 17, "countdown never expired");
        }
        assert_eq!(params.new_period_ns(), 0);
        assert_eq!(params.playout_time_us(), 0);
    }

    #[test]
    fn remaining_never_underflows() {
        // A sample period far longer than the remaining time: the guarded
        // decrement stops at zero instead of wrapping.
        let (params, mut timer) = timer(100);
        params.set_frequency_for(50.0, 1);
        timer.tick();
        assert_eq!(params.playout_time_us(), 0);
        assert_eq!(params.new_period_ns(), 0);
    }

    #[test]
    fn new_request_overrides_running_countdown() {
        let (params, mut timer) = timer(16_000);
        params.set_frequency_for(1000.0, 2);
        for _ in 0..16 {
            timer.tick();
        }
        assert_eq!(params.playout_time_us(), 1_001);

        params.set_frequency_for(2000.0, 100);
        assert_eq!(params.playout_time_us(), 100_000);
        assert_eq!(params.playout_so_far_ns(), 0);
    }
}
