//! The recording catalog: which performances exist, where their assets
//! live, and how their markers are colored and paced.
//!
//! The catalog is plain data. A `recordings.json` in the assets directory
//! overrides the built-in list; everything else (correction constants,
//! palette colors) rides along as serde fields with fallbacks.

use crate::playback::timing::TimingCorrection;
use anyhow::{Context, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Marker color, 8-bit RGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Fallback marker color when a palette has nothing better to offer.
pub const WHITE: Rgb = Rgb(255, 255, 255);

/// Fixed set of marker colors for one recording.
///
/// Markers pick uniformly and independently, so keys within one chord can
/// land on different colors. Repeated entries are allowed and weight the
/// draw toward that color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    pub fn new(colors: Vec<Rgb>) -> Self {
        Self { colors }
    }

    /// Single-color white palette, the fallback for unknown recordings.
    pub fn plain() -> Self {
        Self::new(vec![WHITE])
    }

    /// Picks one color for one marker.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Rgb {
        self.colors.choose(rng).copied().unwrap_or(WHITE)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::plain()
    }
}

/// One prerecorded performance and its presentation data. Selected once per
/// playback session and immutable for its duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    pub id: String,
    pub title: String,
    /// Textual event log driving the visual timeline.
    pub events: PathBuf,
    /// MIDI file handed to the audio engine.
    pub audio: PathBuf,
    #[serde(default)]
    pub correction: TimingCorrection,
    #[serde(default)]
    pub palette: Palette,
}

/// Every recording the app can play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    recordings: Vec<Recording>,
}

/// Catalog override file looked up inside the assets directory.
const CATALOG_FILE: &str = "recordings.json";

impl Catalog {
    /// The five recordings the app ships with. The correction constants are
    /// empirically tuned per recording; they are data, not derivable.
    pub fn builtin(assets: &Path) -> Self {
        let entry = |id: &str, title: &str, correction: f64, colors: Vec<Rgb>| Recording {
            id: id.to_string(),
            title: title.to_string(),
            events: assets.join("events").join(format!("{id}.events")),
            audio: assets.join("midi").join(format!("{id}.mid")),
            correction: TimingCorrection(correction),
            palette: Palette::new(colors),
        };
        Self {
            recordings: vec![
                entry(
                    "smbt",
                    "Super Mario Bros. Theme",
                    0.0028,
                    vec![
                        Rgb(248, 222, 126),
                        Rgb(255, 0, 0),
                        Rgb(0, 255, 0),
                        Rgb(0, 0, 255),
                        Rgb(101, 67, 33),
                    ],
                ),
                entry(
                    "bloody",
                    "Bloody Tears (Castlevania II)",
                    0.0026,
                    vec![
                        Rgb(255, 90, 54),
                        Rgb(178, 34, 34),
                        Rgb(220, 220, 220),
                        Rgb(100, 100, 100),
                        Rgb(200, 200, 200),
                        Rgb(255, 255, 0),
                    ],
                ),
                entry(
                    "gravity",
                    "Gravity Falls Theme",
                    0.0045,
                    vec![
                        Rgb(0, 128, 128),
                        Rgb(255, 42, 4),
                        Rgb(0, 0, 200),
                        Rgb(0, 255, 0),
                        Rgb(0, 128, 128),
                        Rgb(255, 42, 4),
                        Rgb(0, 0, 200),
                        Rgb(0, 255, 0),
                        Rgb(0, 128, 128),
                        Rgb(255, 42, 4),
                    ],
                ),
                entry(
                    "wheel",
                    "Wheel of Fortune",
                    0.0046,
                    vec![
                        Rgb(255, 0, 0),
                        Rgb(0, 255, 0),
                        Rgb(0, 0, 255),
                        Rgb(255, 105, 180),
                        Rgb(255, 69, 0),
                        Rgb(255, 255, 0),
                    ],
                ),
                entry(
                    "pianotris",
                    "Tetris (Piano)",
                    0.002,
                    vec![
                        Rgb(255, 50, 19),
                        Rgb(3, 65, 174),
                        Rgb(114, 203, 59),
                        Rgb(255, 213, 0),
                        Rgb(255, 151, 28),
                    ],
                ),
            ],
        }
    }

    /// Loads a catalog from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog: {}", path.display()))?;
        let catalog: Catalog = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse catalog: {}", path.display()))?;
        Ok(catalog.rooted_at(path.parent().unwrap_or(Path::new("."))))
    }

    /// Loads `recordings.json` from the assets directory when present,
    /// falling back to the built-in catalog on absence or parse failure.
    pub fn load_or_builtin(assets: &Path) -> Self {
        let path = assets.join(CATALOG_FILE);
        if path.exists() {
            match Self::load(&path) {
                Ok(catalog) => return catalog,
                Err(err) => {
                    tracing::warn!("Ignoring catalog {}: {:#}", path.display(), err);
                }
            }
        }
        Self::builtin(assets)
    }

    /// Resolves relative asset paths against the given directory.
    fn rooted_at(mut self, root: &Path) -> Self {
        for recording in &mut self.recordings {
            if recording.events.is_relative() {
                recording.events = root.join(&recording.events);
            }
            if recording.audio.is_relative() {
                recording.audio = root.join(&recording.audio);
            }
        }
        self
    }

    pub fn recordings(&self) -> &[Recording] {
        &self.recordings
    }

    pub fn get(&self, id: &str) -> Option<&Recording> {
        self.recordings.iter().find(|r| r.id == id)
    }

    /// Timing correction for a recording id; unknown ids get zero.
    #[allow(dead_code)]
    pub fn correction_for(&self, id: &str) -> TimingCorrection {
        self.get(id).map(|r| r.correction).unwrap_or_default()
    }

    /// Marker palette for a recording id; unknown ids get plain white.
    #[allow(dead_code)]
    pub fn palette_for(&self, id: &str) -> Palette {
        self.get(id).map(|r| r.palette.clone()).unwrap_or_default()
    }
}
