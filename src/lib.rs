//! pianotui - a terminal piano player and performance visualizer.
//!
//! This library provides the playback engine, keyboard geometry, and UI
//! for the app.

pub mod app;
pub mod audio;
pub mod keys;
pub mod playback;
pub mod recording;
pub mod ui;

// Re-export commonly used types
pub use app::App;
pub use audio::engine::AudioEngine;
pub use keys::{index_to_x, key_color, locate, InteractiveKey, KeyColor, KeyboardLayout};
pub use playback::{PlayOutcome, TimelinePlayer, TimingCorrection};
pub use recording::{Catalog, Palette, Recording, Rgb};
