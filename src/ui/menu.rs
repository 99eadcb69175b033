//! The recording selection menu.

use crate::app::App;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};
use ratatui::Frame;

/// Renders the home menu: every recording in the catalog plus the
/// interactive-piano entry.
pub fn render_menu(frame: &mut Frame, app: &App) {
    let size = frame.area();

    let block = Block::default()
        .title(" pianotui ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let inner = block.inner(size);
    frame.render_widget(block, size);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Header
            Constraint::Min(5),    // Entries
            Constraint::Length(1), // Status
            Constraint::Length(1), // Instructions
        ])
        .split(inner);

    frame.render_widget(
        Paragraph::new(vec![
            Line::from(Span::styled(
                "Pick a performance to watch, or play the piano yourself.",
                Style::default().fg(Color::White),
            )),
            Line::from(Span::styled(
                "Markers above the keyboard follow the notes as they sound.",
                Style::default().fg(Color::DarkGray),
            )),
        ]),
        chunks[0],
    );

    let items: Vec<ListItem> = app
        .catalog
        .recordings()
        .iter()
        .map(|recording| ("[MID]", recording.title.as_str()))
        .chain(std::iter::once(("[KEY]", "Interactive piano")))
        .enumerate()
        .map(|(idx, (icon, title))| {
            let style = if idx == app.selected {
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::REVERSED)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{} ", icon), Style::default().fg(Color::DarkGray)),
                Span::styled(title.to_string(), style),
            ]))
        })
        .collect();
    frame.render_widget(List::new(items), chunks[1]);

    if let Some(status) = &app.status {
        frame.render_widget(
            Paragraph::new(Span::styled(
                status.clone(),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::ITALIC),
            )),
            chunks[2],
        );
    }

    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("[Up/Down]", Style::default().fg(Color::Yellow)),
            Span::styled(" Navigate  ", Style::default().fg(Color::DarkGray)),
            Span::styled("[Enter]", Style::default().fg(Color::Yellow)),
            Span::styled(" Select  ", Style::default().fg(Color::DarkGray)),
            Span::styled("[q/Esc]", Style::default().fg(Color::Yellow)),
            Span::styled(" Quit", Style::default().fg(Color::DarkGray)),
        ])),
        chunks[3],
    );
}
