//! Terminal user interface components.
//!
//! This module provides the visual components for the piano display: the
//! recording menu, the playback screen with its marker strip, and the
//! interactive keyboard screen.

mod keyboard;
mod menu;

pub use keyboard::{
    keyboard_cell_to_canvas, render_full_keyboard, render_interactive_keyboard,
    render_marker_strip,
};
pub use menu::render_menu;

use crate::recording::Rgb;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use std::collections::BTreeMap;

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Color::Rgb(rgb.0, rgb.1, rgb.2)
    }
}

/// Renders the playback screen: title bar, marker strip, full keyboard.
///
/// The strip and the keyboard share the full frame width, so a marker's
/// column always lines up with the key it points at.
pub fn render_playback(frame: &mut Frame, title: &str, markers: &BTreeMap<u32, Rgb>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Title bar
            Constraint::Min(4),    // Marker strip
            Constraint::Length(10), // Keyboard
        ])
        .split(frame.area());

    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(
                title.to_string(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("  [q] Stop", Style::default().fg(Color::DarkGray)),
        ])),
        chunks[0],
    );
    render_marker_strip(frame, chunks[1], markers);
    render_full_keyboard(frame, chunks[2]);
}

/// Renders the interactive screen and returns the keyboard area, which the
/// caller feeds back into pointer hit testing.
pub fn render_interactive(frame: &mut Frame, status: &str) -> Rect {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),  // Title bar
            Constraint::Min(0),     // Spacer
            Constraint::Length(12), // Keyboard
        ])
        .split(frame.area());

    frame.render_widget(
        Paragraph::new(vec![
            Line::from(vec![
                Span::styled(
                    "Interactive piano",
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled("  [q] Back", Style::default().fg(Color::DarkGray)),
            ]),
            Line::from(Span::styled(
                status.to_string(),
                Style::default().fg(Color::Cyan),
            )),
        ]),
        chunks[0],
    );
    render_interactive_keyboard(frame, chunks[2]);
    chunks[2]
}
