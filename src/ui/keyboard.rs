//! Piano keyboard widgets and the marker strip.
//!
//! Key shapes are computed in canvas units from the geometry tables and
//! scaled to terminal cells here, so the widgets stay consistent with the
//! pointer hit-testing that runs in the same units.

use crate::keys::{
    key_color, white_ordinal, KeyColor, KeyboardLayout, CANVAS_HEIGHT, CANVAS_WIDTH, KEYS_TOP,
};
use crate::recording::Rgb;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use std::collections::BTreeMap;

/// Canvas-unit spans of the layout's black keys, in drawn-key shape: half a
/// white key wide, hung across the seam after the preceding white key.
fn black_key_spans(layout: KeyboardLayout) -> Vec<(f32, f32)> {
    let kw = layout.white_key_width();
    let bw = kw / 2.0;
    (0..layout.key_count())
        .filter(|&key| key_color(key) == KeyColor::Black)
        .map(|key| {
            let left = (white_ordinal(key - 1) as f32 + 1.0) * kw - bw / 3.0;
            (left, left + bw)
        })
        .collect()
}

fn render_keyboard(frame: &mut Frame, area: Rect, layout: KeyboardLayout) {
    if area.width == 0 || area.height < 3 {
        return;
    }
    let kw = layout.white_key_width();
    let black_spans = black_key_spans(layout);
    let units_per_col = CANVAS_WIDTH / area.width as f32;
    // Black keys cover the upper two thirds of the key height, as drawn.
    let black_rows = (area.height as u32 * 2 / 3) as u16;

    let mut lines = Vec::with_capacity(area.height as usize);
    for row in 0..area.height {
        let mut cells = Vec::with_capacity(area.width as usize);
        for col in 0..area.width {
            let x = (col as f32 + 0.5) * units_per_col;
            let on_black = row < black_rows && black_spans.iter().any(|&(l, r)| x >= l && x < r);
            if on_black {
                cells.push(Span::styled(" ", Style::default().bg(Color::Black)));
            } else {
                // A white-key seam falling inside this column draws the
                // separator line.
                let seam = x % kw < units_per_col;
                let glyph = if seam { "│" } else { " " };
                cells.push(Span::styled(
                    glyph,
                    Style::default().fg(Color::Black).bg(Color::White),
                ));
            }
        }
        lines.push(Line::from(cells));
    }
    frame.render_widget(Paragraph::new(lines), area);
}

/// Renders the 88-key display keyboard used during playback.
pub fn render_full_keyboard(frame: &mut Frame, area: Rect) {
    render_keyboard(frame, area, KeyboardLayout::Full);
}

/// Renders the reduced 36-key keyboard for the interactive mode.
pub fn render_interactive_keyboard(frame: &mut Frame, area: Rect) {
    render_keyboard(frame, area, KeyboardLayout::Interactive);
}

/// Renders the marker strip above the keyboard: a colored bar with a down
/// arrow at its foot over each struck key.
pub fn render_marker_strip(frame: &mut Frame, area: Rect, markers: &BTreeMap<u32, Rgb>) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let scale = area.width as f32 / CANVAS_WIDTH;
    let mut lines = Vec::with_capacity(area.height as usize);
    for row in 0..area.height {
        let foot = row + 1 == area.height;
        let mut cells = vec![Span::raw(" "); area.width as usize];
        for (&x, &rgb) in markers {
            let col = ((x as f32 * scale) as usize).min(area.width as usize - 1);
            let glyph = if foot { "▼" } else { "█" };
            cells[col] = Span::styled(glyph, Style::default().fg(Color::from(rgb)));
        }
        lines.push(Line::from(cells));
    }
    frame.render_widget(Paragraph::new(lines), area);
}

/// Maps a terminal cell inside the keyboard widget back to canvas units,
/// the inverse of the scaling the widget was drawn with. Returns `None` for
/// cells outside the widget.
pub fn keyboard_cell_to_canvas(col: u16, row: u16, area: Rect) -> Option<(f32, f32)> {
    if area.width == 0 || area.height == 0 {
        return None;
    }
    if col < area.x || col >= area.x + area.width || row < area.y || row >= area.y + area.height {
        return None;
    }
    let x = ((col - area.x) as f32 + 0.5) / area.width as f32 * CANVAS_WIDTH;
    let y =
        KEYS_TOP + ((row - area.y) as f32 + 0.5) / area.height as f32 * (CANVAS_HEIGHT - KEYS_TOP);
    Some((x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::locate;

    #[test]
    fn test_cell_outside_widget_is_none() {
        let area = Rect::new(0, 30, 80, 12);
        assert_eq!(keyboard_cell_to_canvas(0, 29, area), None);
        assert_eq!(keyboard_cell_to_canvas(80, 30, area), None);
        assert!(keyboard_cell_to_canvas(0, 30, area).is_some());
    }

    #[test]
    fn test_bottom_row_lands_in_white_band() {
        let area = Rect::new(0, 0, 80, 12);
        let (x, y) = keyboard_cell_to_canvas(1, 11, area).unwrap();
        let hit = locate(x, y).expect("bottom-left cell hits the low A");
        assert_eq!(hit.index(), 0);
    }

    #[test]
    fn test_top_row_lands_in_black_band() {
        let area = Rect::new(0, 0, 80, 12);
        let (_, y) = keyboard_cell_to_canvas(0, 0, area).unwrap();
        assert!(y >= KEYS_TOP);
        assert!(y < CANVAS_HEIGHT * 29.0 / 32.0);
    }
}
