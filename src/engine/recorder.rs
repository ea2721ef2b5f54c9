//! WAV file recorder
//!
//! Renders the engine offline into stereo 32-bit float WAV files.

use anyhow::{Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use super::Engine;

/// Stereo WAV file recorder
pub struct Recorder {
    writer: WavWriter<BufWriter<File>>,
    sample_rate: u32,
    frames_written: u64,
}

impl Recorder {
    /// Create a new recorder
    ///
    /// # Arguments
    /// * `path` - Output file path
    /// * `sample_rate` - Sample rate in Hz
    pub fn new(path: &Path, sample_rate: u32) -> Result<Self> {
        let spec = WavSpec {
            channels: 2,
            sample_rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };

        let writer = WavWriter::create(path, spec)
            .with_context(|| format!("failed to create WAV file: {:?}", path))?;

        Ok(Self {
            writer,
            sample_rate,
            frames_written: 0,
        })
    }

    /// Get the sample rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Get the number of stereo frames written
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Get the duration recorded in seconds
    pub fn duration_secs(&self) -> f64 {
        self.frames_written as f64 / self.sample_rate as f64
    }

    /// Write interleaved stereo samples
    ///
    /// A trailing unpaired sample is dropped.
    pub fn write_frames(&mut self, interleaved: &[f32]) -> Result<()> {
        for frame in interleaved.chunks_exact(2) {
            for &sample in frame {
                self.writer
                    .write_sample(sample)
                    .context("failed to write sample")?;
            }
            self.frames_written += 1;
        }
        Ok(())
    }

    /// Finalize the WAV file
    ///
    /// This must be called to properly close the file and write the header.
    pub fn finalize(self) -> Result<()> {
        self.writer.finalize().context("failed to finalize WAV file")
    }
}

/// Render `duration_secs` of audio from `engine` into `recorder`
///
/// Audio is rendered in blocks of `block_frames`, the same way a device
/// callback would pull it. Returns the number of frames written.
pub fn render_to_file(
    engine: &mut Engine,
    recorder: &mut Recorder,
    duration_secs: f64,
    block_frames: usize,
) -> Result<u64> {
    let total_frames = (duration_secs.max(0.0) * engine.sample_rate() as f64).round() as u64;
    let block_frames = block_frames.max(1);
    let mut block = vec![0.0f32; block_frames * 2];
    let mut remaining = total_frames;
    let mut next_report = engine.sample_rate() as u64 * 10;

    while remaining > 0 {
        let frames = remaining.min(block_frames as u64) as usize;
        let block = &mut block[..frames * 2];
        engine.fill(block);
        recorder.write_frames(block)?;
        remaining -= frames as u64;

        if recorder.frames_written() >= next_report {
            log::info!(
                "rendered {:.0}s / {:.0}s",
                recorder.duration_secs(),
                duration_secs
            );
            next_report += engine.sample_rate() as u64 * 10;
        }
    }

    Ok(total_frames)
}
