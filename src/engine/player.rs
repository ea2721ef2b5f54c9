//! Real-time audio playback using cpal

use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, Stream, StreamConfig};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::Engine;
use crate::config::SoundscapeConfig;

/// Real-time audio player
pub struct Player {
    stream: Option<Stream>,
    running: Arc<AtomicBool>,
}

impl Player {
    pub fn new() -> Self {
        Self {
            stream: None,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Open the configured output device and start rendering
    ///
    /// The engine is built at the device's sample rate and moved into the
    /// audio callback, which owns it for the life of the stream.
    pub fn start(&mut self, config: &SoundscapeConfig) -> Result<()> {
        let device = find_output_device(config.audio.device.as_deref())?;
        let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());

        let supported = device
            .default_output_config()
            .with_context(|| format!("no default output config for {}", device_name))?;
        let sample_format = supported.sample_format();
        let stream_config: StreamConfig = supported.into();

        let sample_rate = stream_config.sample_rate.0;
        if sample_rate != config.audio.sample_rate {
            log::warn!(
                "{} runs at {} Hz, rendering at that rate instead of {} Hz",
                device_name,
                sample_rate,
                config.audio.sample_rate
            );
        }
        log::info!(
            "playing on {} ({} Hz, {} ch, {:?})",
            device_name,
            sample_rate,
            stream_config.channels,
            sample_format
        );

        let engine = Engine::with_sample_rate(config, sample_rate);
        let scratch_frames = config.audio.buffer_size;

        self.running.store(true, Ordering::SeqCst);
        let running = self.running.clone();

        let stream = match sample_format {
            SampleFormat::F32 => {
                build_stream::<f32>(&device, &stream_config, engine, running, scratch_frames)?
            }
            SampleFormat::I16 => {
                build_stream::<i16>(&device, &stream_config, engine, running, scratch_frames)?
            }
            SampleFormat::U16 => {
                build_stream::<u16>(&device, &stream_config, engine, running, scratch_frames)?
            }
            other => return Err(anyhow!("Unsupported sample format {:?}", other)),
        };

        stream.play()?;
        self.stream = Some(stream);

        Ok(())
    }

    /// Stop playback
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        self.stream = None;
    }

    /// Check if currently playing
    pub fn is_playing(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

fn build_stream<T: cpal::SizedSample + cpal::FromSample<f32>>(
    device: &Device,
    config: &StreamConfig,
    mut engine: Engine,
    running: Arc<AtomicBool>,
    scratch_frames: usize,
) -> Result<Stream> {
    let channels = config.channels as usize;
    let mut scratch = vec![0.0f32; scratch_frames.max(1) * 2];

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            if !running.load(Ordering::Relaxed) || channels == 0 {
                // Fill with silence when stopped
                for sample in data.iter_mut() {
                    *sample = T::from_sample(0.0f32);
                }
                return;
            }

            render_into(&mut engine, &mut scratch, data, channels);
        },
        |err| {
            log::error!("audio stream error: {}", err);
        },
        None,
    )?;

    Ok(stream)
}

/// Render a device buffer in blocks no larger than `scratch`
///
/// `scratch` holds interleaved stereo; `data` is interleaved with `channels`
/// per frame. Never allocates.
fn render_into<T: cpal::SizedSample + cpal::FromSample<f32>>(
    engine: &mut Engine,
    scratch: &mut [f32],
    data: &mut [T],
    channels: usize,
) {
    let block_frames = scratch.len() / 2;
    if channels == 0 || block_frames == 0 {
        for sample in data.iter_mut() {
            *sample = T::from_sample(0.0f32);
        }
        return;
    }

    for block in data.chunks_mut(channels * block_frames) {
        let frames = block.len() / channels;
        let stereo = &mut scratch[..frames * 2];
        engine.fill(stereo);

        for (out, frame) in block.chunks_mut(channels).zip(stereo.chunks_exact(2)) {
            write_frame(out, frame[0], frame[1]);
        }
    }
}

/// Map a stereo frame onto a device frame of any width
fn write_frame<T: cpal::Sample + cpal::FromSample<f32>>(out: &mut [T], left: f32, right: f32) {
    match out {
        [mono] => *mono = T::from_sample((left + right) * 0.5),
        [l, r, rest @ ..] => {
            *l = T::from_sample(left);
            *r = T::from_sample(right);
            for sample in rest {
                *sample = T::from_sample(0.0f32);
            }
        }
        [] => {}
    }
}

/// Find an output device whose name contains `name`, or the default one
fn find_output_device(name: Option<&str>) -> Result<Device> {
    let host = cpal::default_host();

    match name {
        Some(wanted) => host
            .output_devices()?
            .find(|d| d.name().map(|n| n.contains(wanted)).unwrap_or(false))
            .ok_or_else(|| anyhow!("Output device '{}' not found", wanted)),
        None => host
            .default_output_device()
            .ok_or_else(|| anyhow!("No output device available")),
    }
}

/// List all available output devices
pub fn list_output_devices() -> Vec<(String, StreamConfig)> {
    let host = cpal::default_host();
    let mut devices = Vec::new();

    if let Ok(output_devices) = host.output_devices() {
        for device in output_devices {
            if let (Ok(name), Ok(config)) = (device.name(), device.default_output_config()) {
                devices.push((name, config.into()));
            }
        }
    }

    devices
}
