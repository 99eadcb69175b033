//! Timeline playback: event parsing, delay correction, and the player
//! state machine that drives the marker display.

pub mod event;
pub mod player;
pub mod stream;
pub mod timing;

pub use event::{parse_event_line, EventParseError, NoteEvent, NoteEventKind};
pub use player::{ControlInput, MarkerSurface, PlayOutcome, PlayerState, SongAudio, TimelinePlayer};
pub use stream::{EventStream, FileEventStream};
pub use timing::{Pacer, ThreadPacer, TimingCorrection};
