//! Soundscape - procedural ambient audio
//!
//! Everything is synthesized sample by sample: a wandering lead voice,
//! a bank of plucked strings, crackling noise bursts, foldback distortion
//! and cross-feeding echoes. No recorded audio is involved.

pub mod config;
pub mod engine;
pub mod synth;

pub use config::SoundscapeConfig;
pub use engine::Engine;
