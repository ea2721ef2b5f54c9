//! Filtered noise bursts
//!
//! Short crackles of lowpassed noise at irregular intervals. Bursts come in
//! groups; after every group a longer gap of silence follows.

use crate::synth::{noise, FilterMode, NoiseSource, StateVariableFilter};

/// Level of the raw noise fed into the filter
pub const BURST_LEVEL: f32 = 0.7;
/// Filter resonance during bursts
pub const BURST_Q: f32 = 0.99;
/// Center of the swept filter cutoff in Hz
pub const CUTOFF_CENTER: f32 = 2000.0;
/// Sweep depth of the filter cutoff in Hz
pub const CUTOFF_DEPTH: f32 = 1800.0;
/// Sweep rate of the filter cutoff in radians per second
pub const CUTOFF_SWEEP_RATE: f64 = 10.0;
/// Highest cutoff as a fraction of the sample rate
pub const MAX_CUTOFF_RATIO: f32 = 0.1;
/// Shortest burst in seconds
pub const MIN_BURST_LENGTH: f64 = 0.0015;
/// Bursts per group before a long gap
pub const BURSTS_PER_GROUP: u32 = 5;

/// Noise-burst scheduler
#[derive(Debug, Clone)]
pub struct NoiseBursts {
    elapsed: f64,
    next_burst: f64,
    burst_length: f64,
    remaining_in_group: u32,
    max_cutoff: f32,
    bursts_completed: u64,
}

impl NoiseBursts {
    /// Create a scheduler whose first burst starts one second in
    pub fn new(sample_rate: u32) -> Self {
        Self {
            elapsed: 0.0,
            next_burst: 1.0,
            burst_length: MIN_BURST_LENGTH,
            remaining_in_group: BURSTS_PER_GROUP,
            max_cutoff: sample_rate as f32 * MAX_CUTOFF_RATIO,
            bursts_completed: 0,
        }
    }

    /// Advance the burst clock by one frame
    pub fn advance(&mut self, dt: f64) {
        self.elapsed += dt;
    }

    /// Sum burst noise into `frame` while a burst is due
    ///
    /// `filtered` selects the lowpass response; without it the noise still
    /// runs through the filter in passthrough mode.
    pub fn process(
        &mut self,
        clock: f64,
        filtered: bool,
        filter: &mut StateVariableFilter,
        rng: &mut NoiseSource,
        frame: &mut [f32; 2],
    ) {
        if self.elapsed <= self.next_burst {
            return;
        }

        let mode = if filtered {
            FilterMode::LowPass
        } else {
            FilterMode::Passthrough
        };
        let cutoff = (CUTOFF_CENTER + CUTOFF_DEPTH * (clock * CUTOFF_SWEEP_RATE).sin() as f32)
            .min(self.max_cutoff);

        for sample in frame.iter_mut() {
            *sample += filter.process(mode, noise(rng) * BURST_LEVEL, cutoff, BURST_Q);
        }

        if self.elapsed > self.next_burst + self.burst_length {
            self.schedule_next(rng);
        }
    }

    fn schedule_next(&mut self, rng: &mut NoiseSource) {
        self.elapsed = 0.0;
        self.next_burst = rng.bipolar() as f64 * 0.3 + 0.02;
        self.burst_length = MIN_BURST_LENGTH + (rng.bipolar() as f64 * 0.025).abs();
        self.bursts_completed += 1;

        self.remaining_in_group -= 1;
        if self.remaining_in_group == 0 {
            self.next_burst += 5.0 + rng.bipolar() as f64 * 3.0;
            self.remaining_in_group = BURSTS_PER_GROUP;
        }
    }

    /// Check whether a burst is currently sounding
    pub fn is_bursting(&self) -> bool {
        self.elapsed > self.next_burst
    }

    /// Number of bursts played to completion
    pub fn bursts_completed(&self) -> u64 {
        self.bursts_completed
    }
}
