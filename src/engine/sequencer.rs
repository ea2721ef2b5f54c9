//! Lead note sequencer
//!
//! A single monophonic lead voice that wakes up at random intervals, swells
//! in, fades out over the last fifth of the note and goes quiet again.
//! Each completed note rotates to the next waveform.

use crate::config::LeadPitch;
use crate::synth::{midi_to_hz, NoiseSource, Waveform};

/// Base spacing between notes in seconds; trigger times and lengths are
/// random multiples of it.
pub const TIME_BETWEEN: f64 = 2.9;
/// Every note lasts at least this long in seconds
pub const MIN_NOTE_LENGTH: f64 = 1.05;
/// Fraction of the note after which the envelope starts falling
pub const RELEASE_POINT: f64 = 0.8;
/// Envelope rise per second while attacking
pub const ATTACK_RATE: f64 = 2.0;
/// Envelope fall per second while releasing
pub const RELEASE_RATE: f64 = 5.0;
/// Envelope ceiling
pub const ENVELOPE_MAX: f64 = 0.9999;
/// Envelope floor while releasing
pub const ENVELOPE_FLOOR: f64 = 0.000_01;
/// Releasing envelopes at or below this snap to the floor
const ENVELOPE_SNAP: f64 = 0.0001;
/// Per-channel detune as a fraction of the note frequency
pub const DETUNE: f32 = 0.009;
/// Pitch every note resolves to with [`LeadPitch::Fixed`] (C2)
pub const LEAD_NOTE: i32 = 36;

/// Where the lead voice is in its note cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteStage {
    /// Waiting for the trigger time
    Idle,
    /// Envelope rising (or held at its ceiling)
    Attack,
    /// Envelope falling toward the end of the note
    Release,
}

/// Lead note state machine
#[derive(Debug, Clone)]
pub struct NoteSequencer {
    note_clock: f64,
    trigger_time: f64,
    length: f64,
    envelope: f64,
    frequency: f32,
    waveform: usize,
    playing: bool,
    notes_completed: u64,
    transpose: i32,
    pitch: LeadPitch,
}

impl NoteSequencer {
    /// Create a sequencer whose first note starts one second in
    pub fn new(transpose: i32, pitch: LeadPitch) -> Self {
        Self {
            note_clock: 0.0,
            trigger_time: 1.0,
            length: 0.1,
            envelope: 0.0,
            frequency: 220.0,
            waveform: 1,
            playing: false,
            notes_completed: 0,
            transpose,
            pitch,
        }
    }

    /// Advance the note clock by one frame and update the envelope
    pub fn advance(&mut self, dt: f64) {
        self.note_clock += dt;

        if self.note_clock < self.trigger_time {
            return;
        }

        self.playing = true;
        if self.note_clock >= self.trigger_time + self.length * RELEASE_POINT {
            self.envelope -= dt * RELEASE_RATE;
            if self.envelope <= ENVELOPE_SNAP {
                self.envelope = ENVELOPE_FLOOR;
            }
        } else if self.envelope < ENVELOPE_MAX {
            self.envelope += dt * ATTACK_RATE;
        }
        self.envelope = self.envelope.min(ENVELOPE_MAX);
    }

    /// Sum the lead voice into `frame`
    ///
    /// Does nothing unless a note is sounding and `randomness` is on. When
    /// it does run, the whole frame is scaled by the envelope and clamped
    /// to [-1, 1].
    pub fn process(&mut self, clock: f64, randomness: bool, rng: &mut NoiseSource, frame: &mut [f32; 2]) {
        if !(self.playing && randomness) {
            return;
        }

        let waveform = self.waveform();
        let level = waveform.level();
        let detune = self.frequency * DETUNE;
        let (left_hz, right_hz) = match waveform {
            Waveform::Noise => (self.frequency, self.frequency),
            _ => (self.frequency + detune, self.frequency - detune),
        };
        frame[0] += waveform.generate(clock, left_hz, rng) * level;
        frame[1] += waveform.generate(clock, right_hz, rng) * level;

        if self.note_clock >= self.trigger_time + self.length {
            self.finish_note(rng);
        }

        let envelope = self.envelope as f32;
        frame[0] = (frame[0] * envelope).clamp(-1.0, 1.0);
        frame[1] = (frame[1] * envelope).clamp(-1.0, 1.0);
    }

    /// Schedule the next note and rotate the waveform
    fn finish_note(&mut self, rng: &mut NoiseSource) {
        self.note_clock = 0.0;
        self.trigger_time = (rng.bipolar() as f64 + 1.0).abs() * TIME_BETWEEN;
        self.length = (rng.bipolar() as f64).abs() * 0.2 * TIME_BETWEEN + MIN_NOTE_LENGTH;

        let drawn = 10 + (rng.bipolar() * 50.0 + 1.0) as i32;
        let note = match self.pitch {
            LeadPitch::Fixed => LEAD_NOTE,
            LeadPitch::Random => drawn,
        };
        self.frequency = midi_to_hz(note + self.transpose);

        self.waveform = (self.waveform + 1) % Waveform::ROTATION.len();
        self.envelope = 0.0;
        self.playing = false;
        self.notes_completed += 1;
    }

    /// Waveform of the current note
    pub fn waveform(&self) -> Waveform {
        Waveform::ROTATION[self.waveform]
    }

    /// Current stage of the note cycle
    pub fn stage(&self) -> NoteStage {
        if !self.playing {
            NoteStage::Idle
        } else if self.note_clock >= self.trigger_time + self.length * RELEASE_POINT {
            NoteStage::Release
        } else {
            NoteStage::Attack
        }
    }

    /// Current envelope level
    pub fn envelope(&self) -> f64 {
        self.envelope
    }

    /// Frequency of the current note in Hz
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Number of notes played to completion
    pub fn notes_completed(&self) -> u64 {
        self.notes_completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f64 = 1.0 / 44100.0;

    fn run(seq: &mut NoteSequencer, rng: &mut NoiseSource, frames: usize) -> Vec<[f32; 2]> {
        let mut clock = 0.0;
        (0..frames)
            .map(|_| {
                clock += DT;
                seq.advance(DT);
                let mut frame = [0.0; 2];
                seq.process(clock, true, rng, &mut frame);
                frame
            })
            .collect()
    }

    #[test]
    fn test_idle_until_first_trigger() {
        let mut seq = NoteSequencer::new(0, LeadPitch::Fixed);
        let mut rng = NoiseSource::seeded(1);

        let frames = run(&mut seq, &mut rng, 44000);
        assert_eq!(seq.stage(), NoteStage::Idle);
        assert!(frames.iter().all(|f| *f == [0.0, 0.0]));
    }

    #[test]
    fn test_first_note_plays_and_completes() {
        let mut seq = NoteSequencer::new(0, LeadPitch::Fixed);
        let mut rng = NoiseSource::seeded(1);
        assert_eq!(seq.waveform(), Waveform::Saw);

        // First note: trigger at 1.0s, length 0.1s
        let frames = run(&mut seq, &mut rng, 44100 + 2205);
        assert_eq!(seq.stage(), NoteStage::Attack);
        assert!(frames.iter().any(|f| f[0] != 0.0));

        for _ in 0..4410 {
            if seq.notes_completed() == 1 {
                break;
            }
            run(&mut seq, &mut rng, 1);
        }
        assert_eq!(seq.notes_completed(), 1);
        assert_eq!(seq.stage(), NoteStage::Idle);
        assert_eq!(seq.waveform(), Waveform::Triangle);
        assert_eq!(seq.envelope(), 0.0);
        assert!((seq.frequency() - midi_to_hz(LEAD_NOTE)).abs() < 1e-3);
    }

    #[test]
    fn test_envelope_rises_then_falls() {
        let mut seq = NoteSequencer::new(0, LeadPitch::Fixed);
        let mut rng = NoiseSource::seeded(2);

        // Into the attack of the first note (1.0s .. 1.08s)
        run(&mut seq, &mut rng, 44100 + 3000);
        let attack = seq.envelope();
        assert!(attack > 0.0 && attack <= ENVELOPE_MAX);
        assert_eq!(seq.stage(), NoteStage::Attack);

        // Past the release point (1.08s .. 1.1s)
        run(&mut seq, &mut rng, 1200);
        assert_eq!(seq.stage(), NoteStage::Release);
        assert!(seq.envelope() < attack);
    }

    #[test]
    fn test_envelope_never_exceeds_ceiling() {
        let mut seq = NoteSequencer::new(0, LeadPitch::Fixed);
        let mut rng = NoiseSource::seeded(3);
        let mut clock = 0.0;
        for _ in 0..44100 * 20 {
            clock += DT;
            seq.advance(DT);
            let mut frame = [0.0; 2];
            seq.process(clock, true, &mut rng, &mut frame);
            assert!(seq.envelope() <= ENVELOPE_MAX);
            assert!(frame[0].abs() <= 1.0 && frame[1].abs() <= 1.0);
        }
        assert!(seq.notes_completed() >= 2);
    }

    #[test]
    fn test_waveform_rotation_skips_noise() {
        let mut seq = NoteSequencer::new(0, LeadPitch::Fixed);
        let mut rng = NoiseSource::seeded(4);
        for _ in 0..8 {
            seq.finish_note(&mut rng);
            assert_ne!(seq.waveform(), Waveform::Noise);
        }
        assert_eq!(seq.notes_completed(), 8);
        // Started on saw (index 1), eight steps later back on saw
        assert_eq!(seq.waveform(), Waveform::Saw);
    }

    #[test]
    fn test_next_note_timing_ranges() {
        let mut seq = NoteSequencer::new(0, LeadPitch::Fixed);
        let mut rng = NoiseSource::seeded(5);
        for _ in 0..100 {
            seq.finish_note(&mut rng);
            assert!((0.0..=2.0 * TIME_BETWEEN).contains(&seq.trigger_time));
            assert!((MIN_NOTE_LENGTH..=MIN_NOTE_LENGTH + 0.2 * TIME_BETWEEN).contains(&seq.length));
        }
    }

    #[test]
    fn test_transpose_and_random_pitch() {
        let mut rng = NoiseSource::seeded(6);

        let mut fixed = NoteSequencer::new(12, LeadPitch::Fixed);
        fixed.finish_note(&mut rng);
        assert!((fixed.frequency() - midi_to_hz(LEAD_NOTE + 12)).abs() < 1e-3);

        let mut random = NoteSequencer::new(0, LeadPitch::Random);
        let mut pitches = std::collections::HashSet::new();
        for _ in 0..20 {
            random.finish_note(&mut rng);
            pitches.insert(random.frequency().to_bits());
            assert!(random.frequency() >= midi_to_hz(-39) && random.frequency() <= midi_to_hz(61));
        }
        assert!(pitches.len() > 1);
    }

    #[test]
    fn test_randomness_off_is_silent() {
        let mut seq = NoteSequencer::new(0, LeadPitch::Fixed);
        let mut rng = NoiseSource::seeded(7);
        let mut clock = 0.0;
        for _ in 0..44100 * 3 {
            clock += DT;
            seq.advance(DT);
            let mut frame = [0.0; 2];
            seq.process(clock, false, &mut rng, &mut frame);
            assert_eq!(frame, [0.0, 0.0]);
        }
        // The note clock still ran and the voice is marked as sounding
        assert_ne!(seq.stage(), NoteStage::Idle);
        assert_eq!(seq.notes_completed(), 0);
    }
}
