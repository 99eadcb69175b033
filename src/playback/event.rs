//! Event-line parsing for recorded performances.
//!
//! A recording's event stream is textual, one event per line:
//!
//! ```text
//! note_on channel=0 note=62 velocity=90 time=0.2
//! note_off channel=0 note=62 velocity=64 time=0
//! control_change channel=0 control=64 value=127 time=0.05
//! ```
//!
//! `time` is the delay in seconds since the previous event. Lines that do
//! not fit the grammar (meta lines, stray fields, unparseable numbers) come
//! back as [`EventParseError`]; callers skip them and keep playing.

use crate::keys::TOTAL_KEYS;
use std::str::FromStr;
use thiserror::Error;

/// Offset between MIDI note numbers and piano key indices: MIDI note 21 is
/// the bottom A of an 88-key piano.
const MIDI_KEY_OFFSET: i32 = 21;

/// Wire-level event kinds the stream grammar knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteEventKind {
    NoteOn,
    NoteOff,
    ControlChange,
}

impl NoteEventKind {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "note_on" => Some(Self::NoteOn),
            "note_off" => Some(Self::NoteOff),
            "control_change" => Some(Self::ControlChange),
            _ => None,
        }
    }
}

/// One parsed line of a recording's event stream, immutable once built.
///
/// The wire kinds collapse into what the timeline does with them: a
/// `note_on` with velocity 0 is a release, per the MIDI convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoteEvent {
    /// A key goes down.
    Onset { key: u8, velocity: u8, raw_delay: f64 },
    /// A key comes back up (`note_off`, or `note_on` at velocity 0).
    Release { key: u8, raw_delay: f64 },
    /// Paces the timeline but renders nothing.
    ControlChange { raw_delay: f64 },
}

impl NoteEvent {
    /// Seconds since the previous event, as recorded.
    pub fn raw_delay(&self) -> f64 {
        match *self {
            NoteEvent::Onset { raw_delay, .. }
            | NoteEvent::Release { raw_delay, .. }
            | NoteEvent::ControlChange { raw_delay } => raw_delay,
        }
    }
}

/// Why a line could not become a [`NoteEvent`]. Never fatal to playback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventParseError {
    #[error("empty line")]
    Empty,
    #[error("unrecognized event kind {0:?}")]
    UnknownKind(String),
    #[error("missing {0} field")]
    MissingField(&'static str),
    #[error("unparseable {field} value {value:?}")]
    BadValue { field: &'static str, value: String },
    #[error("note {0} outside the piano range")]
    NoteOutOfRange(i32),
}

fn parse_field<T: FromStr>(
    field: &'static str,
    value: Option<&str>,
) -> Result<T, EventParseError> {
    let raw = value.ok_or(EventParseError::MissingField(field))?;
    raw.parse().map_err(|_| EventParseError::BadValue {
        field,
        value: raw.to_string(),
    })
}

/// Parses one line of an event stream.
///
/// MIDI note numbers are converted to key indices here; a note outside the
/// 88-key span is a data error the caller is expected to skip, so the
/// geometry's hard range check stays reserved for real mapping bugs.
pub fn parse_event_line(line: &str) -> Result<NoteEvent, EventParseError> {
    let mut tokens = line.split_whitespace();
    let kind_token = tokens.next().ok_or(EventParseError::Empty)?;
    let kind = NoteEventKind::from_token(kind_token)
        .ok_or_else(|| EventParseError::UnknownKind(kind_token.to_string()))?;

    let mut note = None;
    let mut velocity = None;
    let mut time = None;
    for token in tokens {
        if let Some(value) = token.strip_prefix("note=") {
            note = Some(value);
        } else if let Some(value) = token.strip_prefix("velocity=") {
            velocity = Some(value);
        } else if let Some(value) = token.strip_prefix("time=") {
            time = Some(value);
        }
    }

    let raw_delay: f64 = parse_field("time", time)?;

    if kind == NoteEventKind::ControlChange {
        return Ok(NoteEvent::ControlChange { raw_delay });
    }

    let midi_note: i32 = parse_field("note", note)?;
    let velocity: u8 = parse_field("velocity", velocity)?;
    let key = midi_note - MIDI_KEY_OFFSET;
    if !(0..TOTAL_KEYS as i32).contains(&key) {
        return Err(EventParseError::NoteOutOfRange(midi_note));
    }
    let key = key as u8;

    if kind == NoteEventKind::NoteOff || velocity == 0 {
        Ok(NoteEvent::Release { key, raw_delay })
    } else {
        Ok(NoteEvent::Onset {
            key,
            velocity,
            raw_delay,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_onset() {
        let event = parse_event_line("note_on channel=0 note=62 velocity=90 time=0.2").unwrap();
        assert_eq!(
            event,
            NoteEvent::Onset {
                key: 41,
                velocity: 90,
                raw_delay: 0.2
            }
        );
    }

    #[test]
    fn test_zero_velocity_note_on_is_release() {
        let event = parse_event_line("note_on channel=0 note=21 velocity=0 time=0").unwrap();
        assert_eq!(event, NoteEvent::Release { key: 0, raw_delay: 0.0 });
    }

    #[test]
    fn test_parse_note_off() {
        let event = parse_event_line("note_off channel=0 note=108 velocity=64 time=1.5").unwrap();
        assert_eq!(
            event,
            NoteEvent::Release {
                key: 87,
                raw_delay: 1.5
            }
        );
    }

    #[test]
    fn test_control_change_carries_only_delay() {
        let event =
            parse_event_line("control_change channel=0 control=64 value=127 time=0.05").unwrap();
        assert_eq!(event, NoteEvent::ControlChange { raw_delay: 0.05 });
    }

    #[test]
    fn test_non_numeric_note_is_malformed() {
        let err = parse_event_line("note_on note=abc velocity=64 time=0.1").unwrap_err();
        assert_eq!(
            err,
            EventParseError::BadValue {
                field: "note",
                value: "abc".to_string()
            }
        );
    }

    #[test]
    fn test_meta_style_time_field_is_malformed() {
        // Meta lines close with a bracket that lands in the time value.
        let err = parse_event_line("note_on note=60 velocity=64 time=0>").unwrap_err();
        assert!(matches!(err, EventParseError::BadValue { field: "time", .. }));
    }

    #[test]
    fn test_missing_fields_reported() {
        assert_eq!(
            parse_event_line("note_on note=60 velocity=64").unwrap_err(),
            EventParseError::MissingField("time")
        );
        assert_eq!(
            parse_event_line("note_on velocity=64 time=0.1").unwrap_err(),
            EventParseError::MissingField("note")
        );
    }

    #[test]
    fn test_unknown_kind_and_empty() {
        assert!(matches!(
            parse_event_line("pitchwheel channel=0 pitch=128 time=0"),
            Err(EventParseError::UnknownKind(_))
        ));
        assert_eq!(parse_event_line("   ").unwrap_err(), EventParseError::Empty);
    }

    #[test]
    fn test_note_outside_piano_span() {
        assert_eq!(
            parse_event_line("note_on note=20 velocity=64 time=0").unwrap_err(),
            EventParseError::NoteOutOfRange(20)
        );
        assert_eq!(
            parse_event_line("note_on note=109 velocity=64 time=0").unwrap_err(),
            EventParseError::NoteOutOfRange(109)
        );
    }
}
