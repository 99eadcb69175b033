//! The timeline player: turns an event stream into paced marker updates.
//!
//! Events that arrive with zero delay belong to the same chord and hit the
//! screen as one batch; the event that closes a chord carries the pause that
//! paces playback. The audio track is started once and then left alone — the
//! only reconciliation between the two clocks is the recording's timing
//! correction.

use crate::keys::{index_to_x, KeyRangeError, KeyboardLayout};
use crate::playback::event::{parse_event_line, NoteEvent};
use crate::playback::stream::EventStream;
use crate::playback::timing::Pacer;
use crate::recording::{Recording, Rgb};
use std::path::Path;
use thiserror::Error;

/// Marker strip above the keyboard. Draws and erases stage markers; `present`
/// flushes everything staged since the last call as one visual update.
pub trait MarkerSurface {
    fn draw_marker(&mut self, x: f32, color: Rgb);
    fn erase_marker(&mut self, x: f32);
    /// Flushes staged draws and erases to the screen as one batch.
    fn present(&mut self) -> anyhow::Result<()>;
    /// Drops every live marker; called when a session ends.
    fn clear_markers(&mut self) -> anyhow::Result<()>;
}

/// The session's audio track. `play` is fire-and-forget: the track renders
/// on its own clock and the player never asks it where it is.
pub trait SongAudio {
    fn load(&mut self, path: &Path) -> anyhow::Result<()>;
    fn play(&mut self);
    fn stop(&mut self);
}

/// Quit-signal source, polled once per event.
pub trait ControlInput {
    fn quit_requested(&mut self) -> bool;
}

/// Lifecycle of one playback session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    Playing,
    Finished,
}

/// How a playback session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    /// The event stream ran out.
    Completed,
    /// A quit signal arrived; pending chords were abandoned unflushed.
    Cancelled,
}

/// Failures that end a session. Malformed event lines are not among them —
/// those are skipped where they occur.
#[derive(Debug, Error)]
pub enum PlayError {
    #[error("event stream failed")]
    Stream(#[from] std::io::Error),
    #[error(transparent)]
    Geometry(#[from] KeyRangeError),
    #[error("rendering surface failed: {0}")]
    Surface(anyhow::Error),
    #[error("audio track failed to start: {0}")]
    Audio(anyhow::Error),
}

/// Plays one recording against borrowed session resources.
///
/// The player owns the in-progress chords and the event-interpretation
/// state; the surface, audio engine, input source and pacer are acquired by
/// the caller for the session and released on every exit path.
pub struct TimelinePlayer<'a, S, A, I, P> {
    recording: &'a Recording,
    surface: &'a mut S,
    audio: &'a mut A,
    input: &'a mut I,
    pacer: &'a mut P,
    rng: rand::rngs::ThreadRng,
    state: PlayerState,
    audio_started: bool,
    /// Pending keys going down together.
    onset: Vec<f32>,
    /// Pending keys coming up together.
    release: Vec<f32>,
}

impl<'a, S, A, I, P> TimelinePlayer<'a, S, A, I, P>
where
    S: MarkerSurface,
    A: SongAudio,
    I: ControlInput,
    P: Pacer,
{
    pub fn new(
        recording: &'a Recording,
        surface: &'a mut S,
        audio: &'a mut A,
        input: &'a mut I,
        pacer: &'a mut P,
    ) -> Self {
        Self {
            recording,
            surface,
            audio,
            input,
            pacer,
            rng: rand::thread_rng(),
            state: PlayerState::Idle,
            audio_started: false,
            onset: Vec::new(),
            release: Vec::new(),
        }
    }

    #[allow(dead_code)]
    pub fn state(&self) -> PlayerState {
        self.state
    }

    /// Runs one playback session to completion or cancellation.
    pub fn play(&mut self, events: &mut dyn EventStream) -> Result<PlayOutcome, PlayError> {
        self.state = PlayerState::Playing;
        let outcome = self.run(events);
        self.state = PlayerState::Finished;
        self.onset.clear();
        self.release.clear();
        // Scoped teardown: stop the track and drop live markers no matter
        // how the session ended.
        self.audio.stop();
        if let Err(err) = self.surface.clear_markers() {
            tracing::warn!("Failed to clear markers: {:#}", err);
        }
        outcome
    }

    fn run(&mut self, events: &mut dyn EventStream) -> Result<PlayOutcome, PlayError> {
        loop {
            // Once per event, not once per chord: a quit between two notes
            // of an unflushed chord must land before anything is drawn.
            if self.input.quit_requested() {
                tracing::debug!("Quit requested, abandoning playback");
                return Ok(PlayOutcome::Cancelled);
            }
            let Some(line) = events.next_line()? else {
                return Ok(PlayOutcome::Completed);
            };
            let event = match parse_event_line(&line) {
                Ok(event) => event,
                Err(err) => {
                    tracing::debug!("Skipping event line {:?}: {}", line.trim(), err);
                    continue;
                }
            };
            // Chord membership is decided by the recorded delay; the
            // corrected value is only how long we actually wait.
            let flush = event.raw_delay() != 0.0;
            let corrected = self.recording.correction.apply(event.raw_delay());
            match event {
                NoteEvent::ControlChange { .. } => self.pacer.pace(corrected),
                NoteEvent::Onset { key, .. } => {
                    self.onset.push(index_to_x(key, KeyboardLayout::Full)?);
                    if flush {
                        self.ensure_audio_started()?;
                        for i in 0..self.onset.len() {
                            let color = self.recording.palette.pick(&mut self.rng);
                            self.surface.draw_marker(self.onset[i], color);
                        }
                        self.surface.present().map_err(PlayError::Surface)?;
                        self.pacer.pace(corrected);
                        self.onset.clear();
                    }
                }
                NoteEvent::Release { key, .. } => {
                    self.release.push(index_to_x(key, KeyboardLayout::Full)?);
                    if flush {
                        for i in 0..self.release.len() {
                            self.surface.erase_marker(self.release[i]);
                        }
                        self.surface.present().map_err(PlayError::Surface)?;
                        self.pacer.pace(corrected);
                        self.release.clear();
                    }
                }
            }
        }
    }

    /// The audio track starts at most once per session, on the first
    /// non-zero-delay onset.
    fn ensure_audio_started(&mut self) -> Result<(), PlayError> {
        if !self.audio_started {
            self.audio
                .load(&self.recording.audio)
                .map_err(PlayError::Audio)?;
            self.audio.play();
            self.audio_started = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::timing::TimingCorrection;
    use crate::recording::{Palette, Rgb};
    use std::path::PathBuf;

    #[derive(Debug, PartialEq, Clone, Copy)]
    enum Op {
        Draw(i32),
        Erase(i32),
        Present,
        Clear,
    }

    #[derive(Default)]
    struct LogSurface {
        ops: Vec<Op>,
    }

    impl MarkerSurface for LogSurface {
        fn draw_marker(&mut self, x: f32, _color: Rgb) {
            self.ops.push(Op::Draw(x as i32));
        }
        fn erase_marker(&mut self, x: f32) {
            self.ops.push(Op::Erase(x as i32));
        }
        fn present(&mut self) -> anyhow::Result<()> {
            self.ops.push(Op::Present);
            Ok(())
        }
        fn clear_markers(&mut self) -> anyhow::Result<()> {
            self.ops.push(Op::Clear);
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeAudio {
        loads: Vec<PathBuf>,
        plays: usize,
        stops: usize,
    }

    impl SongAudio for FakeAudio {
        fn load(&mut self, path: &Path) -> anyhow::Result<()> {
            self.loads.push(path.to_path_buf());
            Ok(())
        }
        fn play(&mut self) {
            self.plays += 1;
        }
        fn stop(&mut self) {
            self.stops += 1;
        }
    }

    /// Reports quit after the given number of polls.
    struct QuitAfter {
        polls: usize,
        at: Option<usize>,
    }

    impl QuitAfter {
        fn never() -> Self {
            Self { polls: 0, at: None }
        }
        fn at(n: usize) -> Self {
            Self {
                polls: 0,
                at: Some(n),
            }
        }
    }

    impl ControlInput for QuitAfter {
        fn quit_requested(&mut self) -> bool {
            let quit = self.at == Some(self.polls);
            self.polls += 1;
            quit
        }
    }

    #[derive(Default)]
    struct LogPacer {
        paces: Vec<f64>,
    }

    impl Pacer for LogPacer {
        fn pace(&mut self, seconds: f64) {
            self.paces.push(seconds);
        }
    }

    fn recording(correction: f64) -> Recording {
        Recording {
            id: "smbt".to_string(),
            title: "Super Mario Bros. Theme".to_string(),
            events: PathBuf::from("events/smbt.events"),
            audio: PathBuf::from("midi/smbt.mid"),
            correction: TimingCorrection(correction),
            palette: Palette::new(vec![Rgb(255, 0, 0)]),
        }
    }

    fn on(key: u8, delay: f64) -> String {
        format!("note_on note={} velocity=90 time={}", key as i32 + 21, delay)
    }

    fn off(key: u8, delay: f64) -> String {
        format!("note_off note={} velocity=0 time={}", key as i32 + 21, delay)
    }

    fn run(
        lines: Vec<String>,
        correction: f64,
        mut input: QuitAfter,
    ) -> (LogSurface, FakeAudio, LogPacer, PlayOutcome) {
        let recording = recording(correction);
        let mut surface = LogSurface::default();
        let mut audio = FakeAudio::default();
        let mut pacer = LogPacer::default();
        let outcome = {
            let mut player =
                TimelinePlayer::new(&recording, &mut surface, &mut audio, &mut input, &mut pacer);
            assert_eq!(player.state(), PlayerState::Idle);
            let outcome = player.play(&mut lines.into_iter()).unwrap();
            assert_eq!(player.state(), PlayerState::Finished);
            outcome
        };
        (surface, audio, pacer, outcome)
    }

    fn x(key: u8) -> i32 {
        index_to_x(key, KeyboardLayout::Full).unwrap() as i32
    }

    #[test]
    fn test_chord_renders_as_one_batch() {
        let (surface, _, pacer, outcome) = run(
            vec![on(10, 0.0), on(14, 0.0), on(17, 0.2)],
            0.0,
            QuitAfter::never(),
        );
        assert_eq!(outcome, PlayOutcome::Completed);
        assert_eq!(
            surface.ops,
            vec![
                Op::Draw(x(10)),
                Op::Draw(x(14)),
                Op::Draw(x(17)),
                Op::Present,
                Op::Clear,
            ]
        );
        assert_eq!(pacer.paces, vec![0.2]);
    }

    #[test]
    fn test_release_chord_erases_as_one_batch() {
        let (surface, _, pacer, _) = run(
            vec![on(10, 0.1), off(10, 0.0), off(14, 0.0), off(17, 0.3)],
            0.0,
            QuitAfter::never(),
        );
        assert_eq!(
            surface.ops,
            vec![
                Op::Draw(x(10)),
                Op::Present,
                Op::Erase(x(10)),
                Op::Erase(x(14)),
                Op::Erase(x(17)),
                Op::Present,
                Op::Clear,
            ]
        );
        assert_eq!(pacer.paces, vec![0.1, 0.3]);
    }

    #[test]
    fn test_audio_starts_once_before_first_flush() {
        let (_, audio, _, _) = run(
            vec![on(10, 0.1), on(12, 0.1), on(14, 0.1)],
            0.0,
            QuitAfter::never(),
        );
        assert_eq!(audio.loads, vec![PathBuf::from("midi/smbt.mid")]);
        assert_eq!(audio.plays, 1);
        // Teardown stops the track even after normal completion.
        assert_eq!(audio.stops, 1);
    }

    #[test]
    fn test_pacing_uses_corrected_delay() {
        let (_, _, pacer, _) = run(vec![on(10, 0.005)], 0.0028, QuitAfter::never());
        assert_eq!(pacer.paces.len(), 1);
        assert!((pacer.paces[0] - 0.0022).abs() < 1e-9);
        // A delay shorter than the constant passes through unchanged.
        let (_, _, pacer, _) = run(vec![on(10, 0.001)], 0.0028, QuitAfter::never());
        assert_eq!(pacer.paces, vec![0.001]);
    }

    #[test]
    fn test_control_change_paces_without_rendering() {
        let (surface, audio, pacer, _) = run(
            vec!["control_change channel=0 control=64 value=127 time=0.05".to_string()],
            0.0,
            QuitAfter::never(),
        );
        assert_eq!(surface.ops, vec![Op::Clear]);
        assert_eq!(pacer.paces, vec![0.05]);
        assert_eq!(audio.plays, 0);
    }

    #[test]
    fn test_malformed_line_skipped() {
        let (surface, _, _, outcome) = run(
            vec![
                "note_on note=abc velocity=64 time=0.1".to_string(),
                on(10, 0.1),
            ],
            0.0,
            QuitAfter::never(),
        );
        assert_eq!(outcome, PlayOutcome::Completed);
        assert_eq!(surface.ops, vec![Op::Draw(x(10)), Op::Present, Op::Clear]);
    }

    #[test]
    fn test_quit_mid_chord_abandons_unflushed_markers() {
        // Quit lands between the second and third note of the chord.
        let (surface, audio, pacer, outcome) = run(
            vec![on(10, 0.0), on(14, 0.0), on(17, 0.2)],
            0.0,
            QuitAfter::at(2),
        );
        assert_eq!(outcome, PlayOutcome::Cancelled);
        assert_eq!(surface.ops, vec![Op::Clear]);
        assert_eq!(pacer.paces, Vec::<f64>::new());
        assert_eq!(audio.plays, 0);
        assert_eq!(audio.stops, 1);
    }

    #[test]
    fn test_quit_before_first_event() {
        let (surface, audio, _, outcome) =
            run(vec![on(10, 0.1)], 0.0, QuitAfter::at(0));
        assert_eq!(outcome, PlayOutcome::Cancelled);
        assert_eq!(surface.ops, vec![Op::Clear]);
        assert_eq!(audio.stops, 1);
    }
}
