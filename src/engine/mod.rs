//! Audio engine for the soundscape
//!
//! The [`Engine`] owns every piece of synthesis state and renders
//! interleaved stereo blocks through [`Engine::fill`]. Each frame advances
//! all clocks in lock-step, then runs the lead sequencer, noise bursts,
//! pluck scheduler, foldback and the string bank. Once per block the echo
//! lines are re-tuned and applied.

mod bursts;
mod player;
mod plucker;
mod recorder;
mod sequencer;

pub use bursts::NoiseBursts;
pub use player::{list_output_devices, Player};
pub use plucker::{PluckGate, PluckScheduler, BLUES_SCALE, STRING_COUNT};
pub use recorder::{render_to_file, Recorder};
pub use sequencer::{NoteSequencer, NoteStage};

use crate::config::{Quirks, SoundscapeConfig, Stages};
use crate::synth::{fold, CursorWrap, DelayLine, NoiseSource, PluckedString, StateVariableFilter};

/// Gain of each string in the mix
const STRING_GAIN: f32 = 0.5;
/// Foldback threshold = center + depth * sin(clock)
const FOLD_CENTER: f32 = 0.4;
const FOLD_DEPTH: f32 = 0.3;
/// Echo delay lengths in samples at the reference rate
const ECHO_SHORT: i64 = 19_200;
const ECHO_LONG: i64 = 25_600;
const ECHO_REFERENCE_RATE: i64 = 44_100;
/// Echo feedback = base + depth * |sin or cos(clock * rate)|
const ECHO_FEEDBACK_BASE: f32 = 0.4;
const ECHO_FEEDBACK_DEPTH: f32 = 0.3;
const ECHO_MOD_RATE: f64 = 0.3;
const ECHO_CROSS_FEEDBACK: f32 = 0.25;
const ECHO_WET: f32 = 0.25;
/// Feedback the echo lines start with before the first block
const ECHO_INITIAL_FEEDBACK: f32 = 0.55;

/// The soundscape engine
pub struct Engine {
    sample_rate: u32,
    time_step: f64,
    clock: f64,
    stages: Stages,
    quirks: Quirks,
    volume: f32,
    rng: NoiseSource,
    sequencer: NoteSequencer,
    bursts: NoiseBursts,
    plucker: PluckScheduler,
    filter: StateVariableFilter,
    strings: [PluckedString; STRING_COUNT],
    echoes: [DelayLine; 2],
    echo_short: i64,
    echo_long: i64,
}

impl Engine {
    /// Create an engine rendering at the configured sample rate
    pub fn new(config: &SoundscapeConfig) -> Self {
        Self::with_sample_rate(config, config.audio.sample_rate)
    }

    /// Create an engine rendering at `sample_rate`, overriding the config
    pub fn with_sample_rate(config: &SoundscapeConfig, sample_rate: u32) -> Self {
        let sample_rate = sample_rate.max(1);
        let master = &config.master;
        let rng = match master.seed {
            Some(seed) => NoiseSource::seeded(seed),
            None => NoiseSource::from_entropy(),
        };

        let right_wrap = if config.quirks.masked_right_delay_cursor {
            CursorWrap::Masked
        } else {
            CursorWrap::Modulo
        };
        let gate = if config.quirks.masked_pluck_gate {
            PluckGate::Masked
        } else {
            PluckGate::Periodic
        };

        let echo_short = ECHO_SHORT * sample_rate as i64 / ECHO_REFERENCE_RATE;
        let echo_long = ECHO_LONG * sample_rate as i64 / ECHO_REFERENCE_RATE;
        let mut echoes = [
            DelayLine::new(sample_rate).with_right_wrap(right_wrap),
            DelayLine::new(sample_rate).with_right_wrap(right_wrap),
        ];
        echoes[0].configure(echo_short, echo_long, ECHO_INITIAL_FEEDBACK, ECHO_CROSS_FEEDBACK);
        echoes[1].configure(echo_long, echo_short, ECHO_INITIAL_FEEDBACK, ECHO_CROSS_FEEDBACK);

        log::debug!(
            "engine at {} Hz, transpose {}, seed {:?}, stages {:?}",
            sample_rate,
            master.transpose,
            master.seed,
            config.stages
        );

        Self {
            sample_rate,
            time_step: 1.0 / sample_rate as f64,
            clock: 0.0,
            stages: config.stages.clone(),
            quirks: config.quirks.clone(),
            volume: master.volume,
            rng,
            sequencer: NoteSequencer::new(master.transpose, master.lead_pitch),
            bursts: NoiseBursts::new(sample_rate),
            plucker: PluckScheduler::new(master.transpose, gate),
            filter: StateVariableFilter::new(sample_rate),
            strings: std::array::from_fn(|_| PluckedString::new(sample_rate)),
            echoes,
            echo_short,
            echo_long,
        }
    }

    /// Get the sample rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Seconds rendered since the stream started
    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// The lead note sequencer
    pub fn sequencer(&self) -> &NoteSequencer {
        &self.sequencer
    }

    /// Number of strings plucked so far
    pub fn plucks(&self) -> u64 {
        self.plucker.plucks()
    }

    /// Fill an interleaved stereo buffer with the next block of audio
    ///
    /// A trailing odd sample is set to silence.
    pub fn fill(&mut self, buffer: &mut [f32]) {
        let mut frames = buffer.chunks_exact_mut(2);
        for out in &mut frames {
            let frame = self.next_frame();
            out.copy_from_slice(&frame);
        }
        frames.into_remainder().fill(0.0);

        self.retune_echoes();
        if self.stages.echoes {
            for echo in &mut self.echoes {
                echo.apply(buffer, ECHO_WET);
            }
        }

        for sample in buffer.iter_mut() {
            *sample = (*sample * self.volume).clamp(-1.0, 1.0);
        }
    }

    /// Render one frame, everything except the block-level echoes
    fn next_frame(&mut self) -> [f32; 2] {
        let dt = self.time_step;
        self.clock += dt;
        self.sequencer.advance(dt);
        self.bursts.advance(dt);
        self.plucker.advance(dt);

        let mut frame = [0.0f32; 2];
        self.sequencer
            .process(self.clock, self.stages.randomness, &mut self.rng, &mut frame);

        if self.stages.noise_bursts {
            self.bursts.process(
                self.clock,
                self.stages.filter,
                &mut self.filter,
                &mut self.rng,
                &mut frame,
            );
        }

        if self.stages.plucking {
            self.plucker
                .process(self.clock, &mut self.strings, &mut self.rng);
        }

        if self.stages.distortion {
            let threshold = FOLD_CENTER + FOLD_DEPTH * self.clock.sin() as f32;
            let (left, right) = if self.quirks.mono_foldback {
                (frame[1], frame[1])
            } else {
                (frame[0], frame[1])
            };
            frame[0] = fold(left.clamp(0.0, 1.0), threshold);
            frame[1] = fold(right.clamp(0.0, 1.0), threshold);
        }

        for string in &mut self.strings {
            let sample = string.sample() * STRING_GAIN;
            frame[0] += sample;
            frame[1] += sample;
        }

        frame
    }

    /// Slowly swing the echo feedback with the stream clock
    fn retune_echoes(&mut self) {
        let phase = self.clock * ECHO_MOD_RATE;
        let sway = |v: f64| ECHO_FEEDBACK_BASE + ECHO_FEEDBACK_DEPTH * v.abs() as f32;

        self.echoes[0].configure(
            self.echo_short,
            self.echo_long,
            sway(phase.sin()),
            ECHO_CROSS_FEEDBACK,
        );
        self.echoes[1].configure(
            self.echo_long,
            self.echo_short,
            sway(phase.cos()),
            ECHO_CROSS_FEEDBACK,
        );
    }
}
