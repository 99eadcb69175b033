//! Piano key identity, geometry, and pointer hit-testing.
//!
//! Everything here is pure: key indices map to canvas-unit positions and
//! back without touching the terminal. Rendering scales canvas units to
//! cells at the last moment.

mod layout;
mod locate;

pub use layout::{
    index_to_x, key_color, KeyColor, KeyRangeError, KeyboardLayout, BLACK_KEYS, CANVAS_HEIGHT,
    CANVAS_WIDTH, INTERACTIVE_KEYS, INTERACTIVE_WHITE_KEYS, KEYS_TOP, TOTAL_KEYS, WHITE_KEYS,
};
pub(crate) use layout::white_ordinal;
pub use locate::{locate, InteractiveKey};
