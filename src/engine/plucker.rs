//! Plucked-string scheduler
//!
//! Every ~170 ms the scheduler picks a note of the blues scale and, while
//! the coarse clock gate is open, plucks the next string of the bank. The
//! next scale step is chosen at random.

use crate::synth::{midi_to_hz, NoiseSource, PluckedString};

/// Twelve-step blues run, up and back down
pub const BLUES_SCALE: [i32; 12] = [60, 63, 65, 66, 67, 70, 72, 70, 67, 66, 65, 63];
/// Strings in the bank
pub const STRING_COUNT: usize = 6;
/// Seconds between pluck attempts
pub const PLUCK_INTERVAL: f64 = 0.17;
/// Extra wait in seconds after every fourth scale step
pub const PLUCK_REST: f64 = 1.0;
/// Plucks happen only in seconds whose index passes the gate
pub const GATE_PERIOD: i64 = 12;
/// Bit mask applied to the second index by [`PluckGate::Masked`]
pub const GATE_MASK: i64 = 11;

/// Which whole seconds of the stream let plucks through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PluckGate {
    /// `floor(clock) % 12 == 0`: one second in every twelve
    #[default]
    Periodic,
    /// `floor(clock) & 11 == 0`: seconds 0, 4, 16, 20, 32, 36, ...
    Masked,
}

impl PluckGate {
    /// Check whether plucks are allowed at `clock` seconds
    pub fn is_open(self, clock: f64) -> bool {
        let second = clock.floor() as i64;
        match self {
            PluckGate::Periodic => second.rem_euclid(GATE_PERIOD) == 0,
            PluckGate::Masked => second & GATE_MASK == 0,
        }
    }
}

/// Round-robin pluck scheduler
#[derive(Debug, Clone)]
pub struct PluckScheduler {
    timer: f64,
    string: usize,
    step: usize,
    gate: PluckGate,
    transpose: i32,
    plucks: u64,
}

impl PluckScheduler {
    /// Create a scheduler that first plucks after one interval
    pub fn new(transpose: i32, gate: PluckGate) -> Self {
        Self {
            timer: 0.0,
            string: 0,
            step: 0,
            gate,
            transpose,
            plucks: 0,
        }
    }

    /// Advance the pluck timer by one frame
    pub fn advance(&mut self, dt: f64) {
        self.timer += dt;
    }

    /// Pluck the next string if one is due
    pub fn process(&mut self, clock: f64, strings: &mut [PluckedString], rng: &mut NoiseSource) {
        if self.timer < PLUCK_INTERVAL || strings.is_empty() {
            return;
        }

        let note = BLUES_SCALE[self.step];
        if self.gate.is_open(clock) {
            strings[self.string].pluck(midi_to_hz(note + self.transpose), rng);
            self.plucks += 1;
        }

        self.string = (self.string + 1) % strings.len();
        self.timer = 0.0;
        if self.step & 3 == 0 {
            self.timer -= PLUCK_REST;
        }

        self.step = rng.index(BLUES_SCALE.len());
    }

    /// Index of the string the next pluck goes to
    pub fn next_string(&self) -> usize {
        self.string
    }

    /// Number of strings actually plucked
    pub fn plucks(&self) -> u64 {
        self.plucks
    }
}
