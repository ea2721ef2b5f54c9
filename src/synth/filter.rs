//! State-variable filter
//!
//! Two-pole (12 dB/octave) Chamberlin topology. Lowpass, highpass and
//! bandpass fall out of the same three accumulators, which keep running for
//! the life of the stream so the resonance never clicks.

use std::f32::consts::PI;

/// Filter response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    LowPass,
    HighPass,
    /// Return the input untouched while still advancing the state
    Passthrough,
}

/// Scale applied to the frequency coefficient
const COEFFICIENT_GAIN: f32 = 1.5;

/// State-variable filter
#[derive(Debug, Clone)]
pub struct StateVariableFilter {
    sample_rate: f32,
    low: f32,
    high: f32,
    band: f32,
}

impl StateVariableFilter {
    /// Create a filter at rest
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate: sample_rate as f32,
            low: 0.0,
            high: 0.0,
            band: 0.0,
        }
    }

    /// Process a single sample
    ///
    /// `q` scales both the input and the band feedback; the caller keeps
    /// `cutoff * π / sample_rate` well below π/2 or the filter blows up.
    pub fn process(&mut self, mode: FilterMode, sample: f32, cutoff: f32, q: f32) -> f32 {
        let f = COEFFICIENT_GAIN * (cutoff * PI / self.sample_rate).sin();
        self.low += f * self.band;
        self.high = q * sample - self.low - q * self.band;
        self.band += f * self.high;

        match mode {
            FilterMode::LowPass => self.low,
            FilterMode::HighPass => self.high,
            FilterMode::Passthrough => sample,
        }
    }

    /// Current (low, high, band) accumulators
    pub fn state(&self) -> (f32, f32, f32) {
        (self.low, self.high, self.band)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    fn sine_peak(filter: &mut StateVariableFilter, mode: FilterMode, freq: f32) -> f32 {
        let mut peak = 0.0f32;
        for i in 0..8820 {
            let input = (TAU * freq * i as f32 / 44100.0).sin();
            let output = filter.process(mode, input, 500.0, 0.99);
            // Skip the settling period
            if i > 4410 {
                peak = peak.max(output.abs());
            }
        }
        peak
    }

    #[test]
    fn test_lowpass_attenuates_high_frequencies() {
        let mut filter = StateVariableFilter::new(44100);
        let peak = sine_peak(&mut filter, FilterMode::LowPass, 8000.0);
        assert!(peak < 0.1, "Expected attenuation, got {}", peak);
    }

    #[test]
    fn test_lowpass_passes_low_frequencies() {
        let mut filter = StateVariableFilter::new(44100);
        let peak = sine_peak(&mut filter, FilterMode::LowPass, 50.0);
        assert!(peak > 0.7, "Expected passthrough, got {}", peak);
    }

    #[test]
    fn test_highpass_attenuates_low_frequencies() {
        let mut filter = StateVariableFilter::new(44100);
        let peak = sine_peak(&mut filter, FilterMode::HighPass, 30.0);
        assert!(peak < 0.2, "Expected attenuation, got {}", peak);
    }

    #[test]
    fn test_passthrough_returns_input_but_advances_state() {
        let mut filter = StateVariableFilter::new(44100);
        assert_eq!(filter.process(FilterMode::Passthrough, 0.5, 1000.0, 0.99), 0.5);
        assert_ne!(filter.state(), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_zero_q_stays_at_rest() {
        let mut filter = StateVariableFilter::new(44100);
        let mut rng = crate::synth::NoiseSource::seeded(4);
        for _ in 0..1000 {
            let out = filter.process(FilterMode::LowPass, rng.bipolar(), 2000.0, 0.0);
            assert_eq!(out, 0.0);
        }
        assert_eq!(filter.state(), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_zero_q_keeps_existing_state_ringing() {
        // With q = 0 there is no damping term, so only a filter at rest
        // stays at rest.
        let mut filter = StateVariableFilter::new(44100);
        filter.process(FilterMode::LowPass, 1.0, 1000.0, 0.99);
        assert_ne!(filter.state(), (0.0, 0.0, 0.0));

        for _ in 0..10_000 {
            filter.process(FilterMode::LowPass, 0.0, 1000.0, 0.0);
        }
        let peak = (0..1000)
            .map(|_| filter.process(FilterMode::LowPass, 0.0, 1000.0, 0.0).abs())
            .fold(0.0f32, f32::max);
        assert!(peak > 0.05 && peak < 1.0, "peak {}", peak);
    }

    #[test]
    fn test_state_persists_between_calls() {
        let mut filter = StateVariableFilter::new(44100);
        filter.process(FilterMode::LowPass, 1.0, 1000.0, 0.99);
        let (_, _, band) = filter.state();
        assert!(band != 0.0);

        // Zero input still rings out of the stored state
        let out = filter.process(FilterMode::LowPass, 0.0, 1000.0, 0.99);
        assert!(out != 0.0);
    }
}
