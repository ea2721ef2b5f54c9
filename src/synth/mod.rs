//! Synthesis building blocks
//!
//! Waveform generators, the plucked string, the state-variable filter,
//! foldback distortion and the stereo delay line. None of them allocate
//! after construction.

mod delay;
mod distortion;
mod filter;
mod noise;
mod oscillator;
mod string;

pub use delay::{CursorWrap, DelayLine, MAX_DELAY_SECS};
pub use distortion::fold;
pub use filter::{FilterMode, StateVariableFilter};
pub use noise::NoiseSource;
pub use oscillator::{midi_to_hz, noise, sawtooth, sine, square, triangle, Waveform};
pub use string::{PluckedString, MAX_STRING_LEN, STRING_DECAY};
