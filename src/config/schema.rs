//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation failures
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("sample rate must be between 8000 and 192000 Hz, got {0}")]
    SampleRate(u32),
    #[error("buffer size must be between 64 and 8192 frames, got {0}")]
    BufferSize(usize),
    #[error("master volume must be between 0.0 and 1.0, got {0}")]
    Volume(f32),
    #[error("transpose must be between -48 and 48 semitones, got {0}")]
    Transpose(i32),
}

/// Main configuration for the soundscape
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SoundscapeConfig {
    /// Audio output settings
    #[serde(default)]
    pub audio: AudioConfig,

    /// Master settings (volume, pitch, randomness seed)
    #[serde(default)]
    pub master: MasterConfig,

    /// Which processing stages run
    #[serde(default)]
    pub stages: Stages,

    /// Opt-in reproductions of legacy behaviour
    #[serde(default)]
    pub quirks: Quirks,
}

impl SoundscapeConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(8000..=192_000).contains(&self.audio.sample_rate) {
            return Err(ConfigError::SampleRate(self.audio.sample_rate));
        }
        if !(64..=8192).contains(&self.audio.buffer_size) {
            return Err(ConfigError::BufferSize(self.audio.buffer_size));
        }
        if !(0.0..=1.0).contains(&self.master.volume) {
            return Err(ConfigError::Volume(self.master.volume));
        }
        if !(-48..=48).contains(&self.master.transpose) {
            return Err(ConfigError::Transpose(self.master.transpose));
        }

        Ok(())
    }
}

/// Audio output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Sample rate in Hz (default: 44100)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Frames per render block (default: 512)
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Output device name (None = default device)
    #[serde(default)]
    pub device: Option<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            buffer_size: default_buffer_size(),
            device: None,
        }
    }
}

fn default_sample_rate() -> u32 { 44100 }
fn default_buffer_size() -> usize { 512 }

/// Master settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasterConfig {
    /// Output volume 0.0-1.0 (default: 1.0)
    #[serde(default = "default_volume")]
    pub volume: f32,

    /// Semitones added to every note (default: 0)
    #[serde(default)]
    pub transpose: i32,

    /// Seed for reproducible output (None = different every run)
    #[serde(default)]
    pub seed: Option<u64>,

    /// How the lead voice picks its pitch
    #[serde(default)]
    pub lead_pitch: LeadPitch,
}

impl Default for MasterConfig {
    fn default() -> Self {
        Self {
            volume: default_volume(),
            transpose: 0,
            seed: None,
            lead_pitch: LeadPitch::default(),
        }
    }
}

fn default_volume() -> f32 { 1.0 }

/// Lead voice pitch selection
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LeadPitch {
    /// Every note on C2 (default)
    #[default]
    Fixed,
    /// A random note between MIDI -38 and 60 for each new note
    Random,
}

/// Pipeline stage toggles
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stages {
    /// Cross-feedback echo lines
    #[serde(default = "default_enabled")]
    pub echoes: bool,

    /// Foldback distortion of the synthesized frame
    #[serde(default = "default_enabled")]
    pub distortion: bool,

    /// Lowpass the noise bursts (otherwise they pass through unfiltered)
    #[serde(default = "default_enabled")]
    pub filter: bool,

    /// Random lead notes
    #[serde(default = "default_enabled")]
    pub randomness: bool,

    /// Karplus-Strong string plucking
    #[serde(default = "default_enabled")]
    pub plucking: bool,

    /// Filtered noise bursts
    #[serde(default = "default_enabled")]
    pub noise_bursts: bool,
}

impl Default for Stages {
    fn default() -> Self {
        Self {
            echoes: true,
            distortion: true,
            filter: true,
            randomness: true,
            plucking: true,
            noise_bursts: true,
        }
    }
}

fn default_enabled() -> bool { true }

/// Legacy behaviours that look unintended. All default
/// to off.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Quirks {
    /// Wrap the right echo cursor with `& length` instead of `% length`
    #[serde(default)]
    pub masked_right_delay_cursor: bool,

    /// Fold the right channel into both outputs
    #[serde(default)]
    pub mono_foldback: bool,

    /// Gate plucks with `floor(clock) & 11 == 0` instead of `% 12`
    #[serde(default)]
    pub masked_pluck_gate: bool,
}
