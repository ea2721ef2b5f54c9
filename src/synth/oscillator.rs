//! Stateless waveform generators
//!
//! Every generator maps an absolute time in seconds (the phase) and a
//! frequency to a sample in [-1, 1]. Nothing is band-limited: the raw,
//! slightly aliased shapes are part of the soundscape's character.

use std::f64::consts::TAU;

use super::NoiseSource;

/// Waveform types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Saw,
    Triangle,
    Square,
    /// White noise drawn from the engine's random source
    Noise,
}

impl Waveform {
    /// Waveforms the lead voice cycles through, in order. Noise is never
    /// selected by the rotation.
    pub const ROTATION: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Saw,
        Waveform::Triangle,
        Waveform::Square,
    ];

    /// Generate one sample of this waveform
    pub fn generate(self, phase: f64, frequency: f32, rng: &mut NoiseSource) -> f32 {
        match self {
            Waveform::Sine => sine(phase, frequency),
            Waveform::Saw => sawtooth(phase, frequency),
            Waveform::Triangle => triangle(phase, frequency),
            Waveform::Square => square(phase, frequency),
            Waveform::Noise => noise(rng),
        }
    }

    /// Output level used when the waveform is played by the lead voice.
    /// Roughly loudness-matched by ear.
    pub fn level(self) -> f32 {
        match self {
            Waveform::Sine => 0.73,
            Waveform::Saw | Waveform::Triangle => 0.75,
            Waveform::Square | Waveform::Noise => 0.74,
        }
    }
}

/// `sin(2π · frequency · phase)`
pub fn sine(phase: f64, frequency: f32) -> f32 {
    (TAU * frequency as f64 * phase).sin() as f32
}

/// Phase-accumulator sawtooth, wrapped to [-1, 1)
pub fn sawtooth(phase: f64, frequency: f32) -> f32 {
    let x = phase * frequency as f64;
    ((x - (x + 0.5).floor()) * 2.0) as f32
}

/// Triangle folded out of the sawtooth
pub fn triangle(phase: f64, frequency: f32) -> f32 {
    sawtooth(phase, frequency).abs() * 2.0 - 1.0
}

/// Sign of the sine; a zero crossing counts as positive
pub fn square(phase: f64, frequency: f32) -> f32 {
    if sine(phase, frequency) < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Uniform noise in [-1, 1)
pub fn noise(rng: &mut NoiseSource) -> f32 {
    rng.bipolar()
}

/// Equal-tempered frequency of a MIDI note (A4 = 69 = 440 Hz)
pub fn midi_to_hz(note: i32) -> f32 {
    440.0 * 2.0f32.powf((note - 69) as f32 / 12.0)
}
