//! Audio engine for MIDI file playback.
//!
//! Provides a high-level interface for playing whole MIDI files using
//! rustysynth for synthesis and rodio for audio output. The engine is an
//! opaque player of one file at a time: load a file, fire `play`, and poll
//! `is_busy` if overlap matters. It never reports a position — playback
//! runs on the audio thread's clock.

use crate::playback::player::SongAudio;
use anyhow::{Context, Result};
use rodio::{OutputStream, OutputStreamHandle, Source};
use rustysynth::{MidiFile, MidiFileSequencer, SoundFont, Synthesizer, SynthesizerSettings};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Sample rate for audio synthesis (44.1 kHz standard).
pub const SAMPLE_RATE: u32 = 44100;

/// Audio buffer size for low-latency playback.
/// Smaller = lower latency but higher CPU usage.
const BUFFER_SIZE: usize = 256;

/// Audio source that pulls samples from the sequencer.
/// Implements rodio's Source trait for playback.
struct SequencerSource {
    /// The sequencer instance (shared with the engine).
    sequencer: Arc<Mutex<MidiFileSequencer>>,
    /// Left channel buffer.
    left_buf: Vec<f32>,
    /// Right channel buffer.
    right_buf: Vec<f32>,
    /// Current position in the buffer.
    buf_pos: usize,
    /// Current channel (0 = left, 1 = right).
    channel: usize,
}

impl SequencerSource {
    fn new(sequencer: Arc<Mutex<MidiFileSequencer>>) -> Self {
        Self {
            sequencer,
            left_buf: vec![0.0; BUFFER_SIZE],
            right_buf: vec![0.0; BUFFER_SIZE],
            buf_pos: BUFFER_SIZE, // Start at end to trigger first render
            channel: 0,
        }
    }
}

impl Iterator for SequencerSource {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        // Render a new buffer when we've exhausted the current one. The
        // sequencer renders silence between files, so the stream just idles
        // until the next play().
        if self.buf_pos >= BUFFER_SIZE {
            if let Ok(mut sequencer) = self.sequencer.lock() {
                sequencer.render(&mut self.left_buf, &mut self.right_buf);
            } else {
                // Only fill with silence if we can't get the lock
                self.left_buf.fill(0.0);
                self.right_buf.fill(0.0);
            }
            self.buf_pos = 0;
        }

        // Interleave stereo samples: L, R, L, R, ...
        let sample = if self.channel == 0 {
            self.left_buf[self.buf_pos]
        } else {
            self.right_buf[self.buf_pos]
        };

        self.channel = 1 - self.channel;
        if self.channel == 0 {
            self.buf_pos += 1;
        }

        Some(sample)
    }
}

impl Source for SequencerSource {
    fn current_frame_len(&self) -> Option<usize> {
        None // Continuous stream
    }

    fn channels(&self) -> u16 {
        2 // Stereo
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        None // Infinite stream
    }
}

/// The audio engine: one SoundFont, one sequencer, one file at a time.
///
/// Both playback modes share it — a session's backing track and the
/// interactive keyboard's per-note files go through the same load/play pair.
pub struct AudioEngine {
    /// The sequencer (wrapped for sharing with the audio thread).
    sequencer: Arc<Mutex<MidiFileSequencer>>,
    /// Parsed file staged by `load`, waiting for `play`.
    staged: Option<Arc<MidiFile>>,
    /// Audio output stream (must be kept alive).
    _stream: OutputStream,
    /// Audio output handle for playback.
    _stream_handle: OutputStreamHandle,
}

impl AudioEngine {
    /// Creates a new audio engine with the specified SoundFont.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The SoundFont file cannot be read
    /// - The SoundFont is invalid
    /// - Audio output cannot be initialized
    pub fn new<P: AsRef<Path>>(soundfont_path: P) -> Result<Self> {
        let mut file = BufReader::new(File::open(soundfont_path.as_ref()).with_context(|| {
            format!(
                "Failed to open SoundFont: {}",
                soundfont_path.as_ref().display()
            )
        })?);
        let soundfont = Arc::new(
            SoundFont::new(&mut file)
                .map_err(|e| anyhow::anyhow!("Failed to load SoundFont: {:?}", e))?,
        );

        let settings = SynthesizerSettings::new(SAMPLE_RATE as i32);
        let synth = Synthesizer::new(&soundfont, &settings)
            .map_err(|e| anyhow::anyhow!("Failed to create synthesizer: {:?}", e))?;
        let sequencer = Arc::new(Mutex::new(MidiFileSequencer::new(synth)));

        let (stream, stream_handle) =
            OutputStream::try_default().context("Failed to open audio output")?;

        let source = SequencerSource::new(Arc::clone(&sequencer));
        stream_handle
            .play_raw(source)
            .context("Failed to start audio playback")?;

        Ok(Self {
            sequencer,
            staged: None,
            _stream: stream,
            _stream_handle: stream_handle,
        })
    }

    /// Parses a MIDI file and stages it for the next `play`.
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let mut file = File::open(path.as_ref())
            .with_context(|| format!("Failed to open MIDI file: {}", path.as_ref().display()))?;
        let midi = MidiFile::new(&mut file)
            .map_err(|e| anyhow::anyhow!("Failed to parse MIDI file: {:?}", e))?;
        self.staged = Some(Arc::new(midi));
        Ok(())
    }

    /// Starts the staged file. Non-blocking: the sequencer renders on the
    /// audio thread while the caller keeps its own pace.
    pub fn play_staged(&mut self) {
        if let Some(midi) = self.staged.as_ref() {
            if let Ok(mut sequencer) = self.sequencer.lock() {
                sequencer.play(midi, false);
            }
        }
    }

    /// True while a file is still sounding. The interactive mode uses this
    /// to avoid overlapping note triggers.
    pub fn is_busy(&self) -> bool {
        self.sequencer
            .lock()
            .map(|sequencer| !sequencer.end_of_sequence())
            .unwrap_or(false)
    }

    /// Stops the current file immediately.
    pub fn stop_playback(&mut self) {
        if let Ok(mut sequencer) = self.sequencer.lock() {
            sequencer.stop();
        }
    }
}

impl SongAudio for AudioEngine {
    fn load(&mut self, path: &Path) -> Result<()> {
        self.load_file(path)
    }

    fn play(&mut self) {
        self.play_staged();
    }

    fn stop(&mut self) {
        self.stop_playback();
    }
}
