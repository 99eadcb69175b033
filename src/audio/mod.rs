//! Audio playback for recordings and interactive notes.
//!
//! One SoundFont-backed sequencer plays one MIDI file at a time through a
//! rodio output stream; rustysynth renders, rodio carries.

pub mod engine;

pub use engine::AudioEngine;
