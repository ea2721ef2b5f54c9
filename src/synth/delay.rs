//! Stereo feedback delay with cross-channel feedback
//!
//! Each channel has its own ring buffer and delay length. The wet signal of
//! a channel is its input plus its own delayed tap scaled by `feedback`
//! plus the opposite channel's tap scaled by `cross_feedback`, which makes
//! echoes ping-pong between left and right.

/// Seconds of audio each channel can hold
pub const MAX_DELAY_SECS: usize = 8;

/// How the right channel's write cursor wraps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorWrap {
    /// `(cursor + 1) % length`
    #[default]
    Modulo,
    /// `(cursor + 1) & length`. For even lengths the cursor stays at slot 0,
    /// collapsing the right channel into a one-sample feedback loop.
    Masked,
}

/// One delay channel
#[derive(Debug, Clone)]
struct Channel {
    buffer: Vec<f32>,
    length: usize,
    cursor: usize,
}

impl Channel {
    fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity],
            length: 1024.min(capacity),
            cursor: 0,
        }
    }

    fn tap(&self) -> f32 {
        self.buffer[self.cursor]
    }

    fn write_and_advance(&mut self, sample: f32, wrap: CursorWrap) {
        self.buffer[self.cursor] = sample;
        self.cursor = match wrap {
            CursorWrap::Modulo => (self.cursor + 1) % self.length,
            CursorWrap::Masked => {
                let next = (self.cursor + 1) & self.length;
                if next >= self.buffer.len() {
                    0
                } else {
                    next
                }
            }
        };
    }
}

/// Stereo delay line
#[derive(Debug, Clone)]
pub struct DelayLine {
    left: Channel,
    right: Channel,
    feedback: f32,
    cross_feedback: f32,
    right_wrap: CursorWrap,
}

impl DelayLine {
    /// Create a delay line holding [`MAX_DELAY_SECS`] of audio per channel
    pub fn new(sample_rate: u32) -> Self {
        let capacity = (sample_rate as usize * MAX_DELAY_SECS).max(1);
        Self {
            left: Channel::new(capacity),
            right: Channel::new(capacity),
            feedback: 0.5,
            cross_feedback: 0.25,
            right_wrap: CursorWrap::Modulo,
        }
    }

    /// Choose how the right channel cursor wraps
    pub fn with_right_wrap(mut self, wrap: CursorWrap) -> Self {
        self.right_wrap = wrap;
        self
    }

    /// Set delay lengths in samples and feedback gains
    ///
    /// Lengths are clamped to `[1, capacity]`, gains to `[0, 1]`. Cheap
    /// enough to call once per block for slow modulation.
    pub fn configure(&mut self, left_len: i64, right_len: i64, feedback: f32, cross_feedback: f32) {
        let capacity = self.capacity() as i64;
        self.left.length = left_len.clamp(1, capacity) as usize;
        self.right.length = right_len.clamp(1, capacity) as usize;
        self.feedback = feedback.clamp(0.0, 1.0);
        self.cross_feedback = cross_feedback.clamp(0.0, 1.0);
    }

    /// Run an interleaved stereo buffer through the delay in place
    ///
    /// `wet` blends linearly from the dry input (0.0) to the full delayed
    /// signal (1.0). The stored taps are clamped to [-1, 1] so feedback
    /// cannot run away.
    pub fn apply(&mut self, buffer: &mut [f32], wet: f32) {
        for frame in buffer.chunks_exact_mut(2) {
            let left_tap = self.left.tap();
            let right_tap = self.right.tap();

            let left = left_tap * self.feedback + right_tap * self.cross_feedback + frame[0];
            let right = right_tap * self.feedback + left_tap * self.cross_feedback + frame[1];

            frame[0] += (left - frame[0]) * wet;
            frame[1] += (right - frame[1]) * wet;

            self.left.write_and_advance(left.clamp(-1.0, 1.0), CursorWrap::Modulo);
            self.right.write_and_advance(right.clamp(-1.0, 1.0), self.right_wrap);
        }
    }

    /// Samples each channel can hold
    pub fn capacity(&self) -> usize {
        self.left.buffer.len()
    }

    /// Active (left, right) delay lengths in samples
    pub fn lengths(&self) -> (usize, usize) {
        (self.left.length, self.right.length)
    }

    /// Current (feedback, cross_feedback) gains
    pub fn gains(&self) -> (f32, f32) {
        (self.feedback, self.cross_feedback)
    }

    /// Current (left, right) write cursors
    pub fn cursors(&self) -> (usize, usize) {
        (self.left.cursor, self.right.cursor)
    }
}
