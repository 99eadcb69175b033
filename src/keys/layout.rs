//! Key-to-position mapping for the display keyboards.
//!
//! The display reserves a uniform width per white key; black keys sit on the
//! seam between two whites. All positions are in canvas units (the canvas is
//! `CANVAS_WIDTH` x `CANVAS_HEIGHT`), scaled to terminal cells only at
//! render time so the geometry stays testable on its own.

use thiserror::Error;

/// Width of the virtual canvas all geometry is computed against.
pub const CANVAS_WIDTH: f32 = 1150.0;

/// Height of the virtual canvas.
pub const CANVAS_HEIGHT: f32 = 700.0;

/// Top edge of the keyboard strip, in canvas units.
pub const KEYS_TOP: f32 = CANVAS_HEIGHT * 3.0 / 4.0;

/// Keys on the full display keyboard, standard piano numbering from the
/// bottom A.
pub const TOTAL_KEYS: u8 = 88;

/// White keys on the full keyboard.
pub const WHITE_KEYS: u8 = 52;

/// Black keys on the full keyboard.
#[allow(dead_code)]
pub const BLACK_KEYS: u8 = 36;

/// Keys on the reduced interactive keyboard (three octaves from A).
pub const INTERACTIVE_KEYS: u8 = 36;

/// White keys on the interactive keyboard.
pub const INTERACTIVE_WHITE_KEYS: u8 = 21;

/// Whether a key sounds a natural (white) or a sharp (black).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyColor {
    White,
    Black,
}

/// Returns the color of a key.
///
/// The keyboard starts at A, so the black keys fall on semitones 1, 4, 6, 9
/// and 11 of each octave; index 0 (bottom A) and index 87 (top C) are both
/// white. The 12-step pattern has no black key across the E-F and B-C seams,
/// which is why white keys are unevenly spaced against the raw index.
pub const fn key_color(index: u8) -> KeyColor {
    match index % 12 {
        1 | 4 | 6 | 9 | 11 => KeyColor::Black,
        _ => KeyColor::White,
    }
}

/// `BLACKS_BEFORE[i]` = number of black keys strictly below key `i`.
///
/// This is the step function that turns a key index into its ordinal among
/// the white keys; it increments once per semitone gap that holds a black
/// key and stays flat across the E-F and B-C seams.
const BLACKS_BEFORE: [u8; TOTAL_KEYS as usize] = build_blacks_before();

const fn build_blacks_before() -> [u8; TOTAL_KEYS as usize] {
    let mut table = [0u8; TOTAL_KEYS as usize];
    let mut count = 0u8;
    let mut i = 0;
    while i < TOTAL_KEYS as usize {
        table[i] = count;
        if matches!(key_color(i as u8), KeyColor::Black) {
            count += 1;
        }
        i += 1;
    }
    table
}

/// The two keyboards the app renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyboardLayout {
    /// The 88-key display keyboard used during playback.
    Full,
    /// The reduced 36-key keyboard used by the interactive mode.
    Interactive,
}

impl KeyboardLayout {
    /// Number of key indices this layout accepts.
    pub const fn key_count(self) -> u8 {
        match self {
            Self::Full => TOTAL_KEYS,
            Self::Interactive => INTERACTIVE_KEYS,
        }
    }

    /// White keys across the layout; fixes the uniform key width.
    pub const fn white_key_count(self) -> u8 {
        match self {
            Self::Full => WHITE_KEYS,
            Self::Interactive => INTERACTIVE_WHITE_KEYS,
        }
    }

    /// Uniform white-key width in canvas units.
    pub fn white_key_width(self) -> f32 {
        CANVAS_WIDTH / self.white_key_count() as f32
    }
}

/// A key index used outside the layout it was asked about.
///
/// This is a caller bug, not a data problem: event parsing already rejects
/// notes outside the piano span, so an index landing here means a mapping
/// error upstream. Never silently clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("key index {index} outside the {key_count}-key layout")]
pub struct KeyRangeError {
    pub index: u8,
    pub key_count: u8,
}

/// Ordinal of a white key among the white keys at or below it.
pub(crate) fn white_ordinal(index: u8) -> u8 {
    index - BLACKS_BEFORE[index as usize]
}

/// Returns the canvas x of a key's marker position for the given layout.
///
/// White keys sit at their white ordinal plus a one-third-width margin;
/// black keys hang off the preceding white key at a two-thirds offset. The
/// membership pattern never puts two black keys side by side, so `index - 1`
/// of a black key is always white.
pub fn index_to_x(index: u8, layout: KeyboardLayout) -> Result<f32, KeyRangeError> {
    if index >= layout.key_count() {
        return Err(KeyRangeError {
            index,
            key_count: layout.key_count(),
        });
    }
    let kw = layout.white_key_width();
    Ok(match key_color(index) {
        KeyColor::White => white_ordinal(index) as f32 * kw + kw / 3.0,
        KeyColor::Black => white_ordinal(index - 1) as f32 * kw + kw * 2.0 / 3.0,
    })
}
