//! Pointer hit-testing for the interactive keyboard.
//!
//! The mapping from a horizontal section to a note is not arithmetic: white
//! keys are unevenly spaced relative to the 36-key numbering, so both lookup
//! tables carry the literal values the layout was tuned against.

use super::layout::{CANVAS_HEIGHT, CANVAS_WIDTH, INTERACTIVE_WHITE_KEYS, KEYS_TOP};

/// Clicks at or below this y land on the white-key row; between `KEYS_TOP`
/// and this line only black keys can be hit.
const WHITE_BAND_TOP: f32 = CANVAS_HEIGHT * 29.0 / 32.0;

/// Note index for each of the 21 white-key sections, bottom A upward.
const WHITE_SECTION_NOTES: [u8; INTERACTIVE_WHITE_KEYS as usize] = [
    0, 2, 3, 5, 7, 8, 10, 12, 14, 15, 17, 19, 20, 22, 24, 26, 27, 29, 31, 32, 34,
];

/// White-section boundaries that carry a black key, paired with the note
/// each one triggers.
const BLACK_SECTIONS: [(u8, u8); 15] = [
    (1, 1),
    (3, 4),
    (4, 6),
    (6, 9),
    (7, 11),
    (8, 13),
    (10, 16),
    (11, 18),
    (13, 21),
    (14, 23),
    (15, 25),
    (17, 28),
    (18, 30),
    (20, 33),
    (21, 35),
];

/// Hit window around a black key's section boundary, in canvas units.
/// Deliberately asymmetric; tuned against the rendered layout.
const BLACK_WINDOW_LEFT: f32 = 20.0;
const BLACK_WINDOW_RIGHT: f32 = 30.0;

/// One of the 36 interactive keys, bottom A = 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractiveKey(u8);

impl InteractiveKey {
    /// Key index within the interactive layout, 0..36.
    #[allow(dead_code)]
    pub fn index(self) -> u8 {
        self.0
    }

    /// File stem of the per-note audio asset, e.g. `c-4` for the C sharp in
    /// the middle octave. Sharps are spelled with a trailing dash; octaves
    /// run 3 to 5 from the bottom A.
    pub fn asset_stem(self) -> String {
        const STEMS: [&str; 12] = [
            "a", "a-", "b", "c", "c-", "d", "d-", "e", "f", "f-", "g", "g-",
        ];
        format!("{}{}", STEMS[(self.0 % 12) as usize], 3 + self.0 / 12)
    }
}

/// Resolves a pointer position over the interactive keyboard to a key.
///
/// The vertical band decides which test applies: the lower band holds the
/// white-key sections, the narrow band above it holds the black-key windows,
/// and anything above the keyboard is no hit. The caller owns whatever
/// happens next (triggering audio, status updates); this is a pure lookup.
pub fn locate(x: f32, y: f32) -> Option<InteractiveKey> {
    let section = CANVAS_WIDTH / INTERACTIVE_WHITE_KEYS as f32;
    if y >= WHITE_BAND_TOP {
        WHITE_SECTION_NOTES
            .iter()
            .enumerate()
            .find(|(i, _)| x <= section * (*i as f32 + 1.0))
            .map(|(_, &note)| InteractiveKey(note))
    } else if y >= KEYS_TOP {
        BLACK_SECTIONS
            .iter()
            .find(|(boundary, _)| {
                let center = section * *boundary as f32;
                x >= center - BLACK_WINDOW_LEFT && x <= center + BLACK_WINDOW_RIGHT
            })
            .map(|&(_, note)| InteractiveKey(note))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{index_to_x, KeyboardLayout};

    const SECTION: f32 = CANVAS_WIDTH / INTERACTIVE_WHITE_KEYS as f32;
    const WHITE_Y: f32 = CANVAS_HEIGHT - 10.0;
    const BLACK_Y: f32 = KEYS_TOP + 10.0;

    #[test]
    fn test_first_section_is_lowest_note() {
        let key = locate(SECTION / 2.0, WHITE_Y).unwrap();
        assert_eq!(key.index(), 0);
    }

    #[test]
    fn test_above_keyboard_is_no_hit() {
        assert_eq!(locate(100.0, KEYS_TOP - 1.0), None);
        assert_eq!(locate(100.0, 0.0), None);
    }

    #[test]
    fn test_black_window_is_asymmetric() {
        // First black key sits at the first section boundary.
        assert_eq!(locate(SECTION - 20.0, BLACK_Y).map(InteractiveKey::index), Some(1));
        assert_eq!(locate(SECTION + 30.0, BLACK_Y).map(InteractiveKey::index), Some(1));
        assert_eq!(locate(SECTION - 21.0, BLACK_Y), None);
        assert_eq!(locate(SECTION + 31.0, BLACK_Y), None);
    }

    #[test]
    fn test_second_boundary_has_no_black_key() {
        // B-C seam: no black key at the second section boundary.
        assert_eq!(locate(SECTION * 2.0, BLACK_Y), None);
    }

    #[test]
    fn test_white_round_trip() {
        for (section, &note) in WHITE_SECTION_NOTES.iter().enumerate() {
            let x = index_to_x(note, KeyboardLayout::Interactive).unwrap();
            let hit = locate(x, WHITE_Y).unwrap();
            assert_eq!(hit.index(), note, "section {section}");
        }
    }

    #[test]
    fn test_black_round_trip() {
        for &(_, note) in &BLACK_SECTIONS {
            let x = index_to_x(note, KeyboardLayout::Interactive).unwrap();
            let hit = locate(x, BLACK_Y);
            assert_eq!(hit.map(InteractiveKey::index), Some(note));
        }
    }

    #[test]
    fn test_asset_stems() {
        assert_eq!(InteractiveKey(0).asset_stem(), "a3");
        assert_eq!(InteractiveKey(1).asset_stem(), "a-3");
        assert_eq!(InteractiveKey(15).asset_stem(), "c4");
        assert_eq!(InteractiveKey(35).asset_stem(), "g-5");
    }
}
