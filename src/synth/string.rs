//! Karplus-Strong plucked string
//!
//! A short ring buffer seeded with noise is read in a loop while a damped
//! two-tap average is written back in place. The buffer is the instrument:
//! every read smooths and attenuates it, which is what turns a burst of
//! noise into a decaying plucked tone.

use super::NoiseSource;

/// Longest excitation buffer in samples; sets the lowest playable pitch
/// (88 Hz at 44.1 kHz).
pub const MAX_STRING_LEN: usize = 500;

/// Feedback gain applied on every pass through the buffer
pub const STRING_DECAY: f32 = 0.996;

/// A single plucked-string voice
#[derive(Debug, Clone)]
pub struct PluckedString {
    buffer: [f32; MAX_STRING_LEN],
    len: usize,
    cursor: usize,
    plucked: bool,
    sample_rate: f32,
}

impl PluckedString {
    /// Create a silent string
    pub fn new(sample_rate: u32) -> Self {
        Self {
            buffer: [0.0; MAX_STRING_LEN],
            len: 0,
            cursor: 0,
            plucked: false,
            sample_rate: sample_rate as f32,
        }
    }

    /// Re-excite the string at `frequency` Hz, replacing whatever is still
    /// ringing in the buffer.
    pub fn pluck(&mut self, frequency: f32, rng: &mut NoiseSource) {
        // Float-to-int casts saturate, so zero, negative and NaN
        // frequencies all land inside the clamp.
        let len = (self.sample_rate / frequency).ceil() as usize;
        self.len = len.clamp(1, MAX_STRING_LEN);

        for slot in &mut self.buffer[..self.len] {
            *slot = rng.bipolar();
        }

        if self.cursor >= self.len {
            self.cursor = 0;
        }
        self.plucked = true;
    }

    /// Advance the string by one sample
    pub fn sample(&mut self) -> f32 {
        if !self.plucked {
            return 0.0;
        }

        let next = (self.cursor + 1) % self.len;
        let avg = STRING_DECAY * 0.5 * (self.buffer[self.cursor] + self.buffer[next]);
        self.buffer[self.cursor] = avg;
        self.cursor = next;
        avg
    }

    /// Active buffer length (0 until the first pluck)
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check whether the string has never been plucked
    pub fn is_empty(&self) -> bool {
        !self.plucked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_before_pluck() {
        let mut string = PluckedString::new(44100);
        assert!(string.is_empty());
        for _ in 0..1000 {
            assert_eq!(string.sample(), 0.0);
        }
    }

    #[test]
    fn test_pluck_buffer_length() {
        let mut rng = NoiseSource::seeded(1);
        let mut string = PluckedString::new(44100);

        // ceil(44100 / 440) = 101
        string.pluck(440.0, &mut rng);
        assert_eq!(string.len(), 101);

        // Too low: clamped to the maximum
        string.pluck(50.0, &mut rng);
        assert_eq!(string.len(), MAX_STRING_LEN);

        // Above the sample rate: at least one slot
        string.pluck(100_000.0, &mut rng);
        assert_eq!(string.len(), 1);
    }

    #[test]
    fn test_degenerate_frequencies_stay_bounded() {
        let mut rng = NoiseSource::seeded(1);
        let mut string = PluckedString::new(44100);

        for frequency in [0.0, -220.0, f32::NAN, f32::INFINITY] {
            string.pluck(frequency, &mut rng);
            assert!((1..=MAX_STRING_LEN).contains(&string.len()));
            for _ in 0..1000 {
                assert!(string.sample().is_finite());
            }
        }
    }

    #[test]
    fn test_string_decays() {
        let mut rng = NoiseSource::seeded(5);
        let mut string = PluckedString::new(44100);
        string.pluck(220.0, &mut rng);

        let peak = |string: &mut PluckedString| {
            (0..4410).fold(0.0f32, |max, _| max.max(string.sample().abs()))
        };

        let early = peak(&mut string);
        for _ in 0..44100 {
            string.sample();
        }
        let late = peak(&mut string);

        assert!(early > 0.0);
        assert!(late < early * 0.5, "Expected decay, got {} -> {}", early, late);
    }

    #[test]
    fn test_repluck_replaces_content() {
        let mut rng = NoiseSource::seeded(9);
        let mut string = PluckedString::new(44100);
        string.pluck(110.0, &mut rng);

        // Let it die almost completely
        for _ in 0..44100 * 10 {
            string.sample();
        }
        let quiet = (0..400).fold(0.0f32, |max, _| max.max(string.sample().abs()));

        string.pluck(110.0, &mut rng);
        let loud = (0..400).fold(0.0f32, |max, _| max.max(string.sample().abs()));

        assert!(loud > quiet);
        assert!(loud > 0.1);
    }
}
