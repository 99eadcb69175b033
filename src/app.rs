//! Application state and the terminal-facing session adapters.
//!
//! `App` carries what survives between screens: the catalog, the audio
//! engine, the menu selection, and a status line. The adapters at the
//! bottom bind the player's collaborator seams to the live terminal and to
//! crossterm's input queue for the duration of one playback session.

use crate::audio::AudioEngine;
use crate::playback::player::{ControlInput, MarkerSurface};
use crate::recording::{Catalog, Rgb};
use crate::ui;
use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::collections::BTreeMap;
use std::io::Stdout;
use std::path::PathBuf;
use std::time::Duration;

/// Application state shared across the menu and both playback modes.
pub struct App {
    pub catalog: Catalog,
    pub engine: AudioEngine,
    pub assets_dir: PathBuf,
    /// Selected menu row; the row after the last recording is the
    /// interactive-piano entry.
    pub selected: usize,
    pub status: Option<String>,
}

impl App {
    /// Builds the app: audio engine first (it can fail), then the catalog,
    /// which always resolves to something playable.
    pub fn new(assets_dir: PathBuf, soundfont: PathBuf) -> Result<Self> {
        let engine = AudioEngine::new(&soundfont).context("Failed to initialize audio engine")?;
        let catalog = Catalog::load_or_builtin(&assets_dir);
        Ok(Self {
            catalog,
            engine,
            assets_dir,
            selected: 0,
            status: None,
        })
    }

    /// Menu rows: one per recording plus the interactive entry.
    pub fn menu_len(&self) -> usize {
        self.catalog.recordings().len() + 1
    }

    pub fn select_prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.menu_len() {
            self.selected += 1;
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }
}

/// Marker strip bound to the live terminal; the player's rendering surface
/// for one session. Draws and erases stage changes in the marker map,
/// `present` repaints the playback screen in one pass.
pub struct TerminalSurface<'a> {
    terminal: &'a mut Terminal<CrosstermBackend<Stdout>>,
    title: String,
    markers: BTreeMap<u32, Rgb>,
}

impl<'a> TerminalSurface<'a> {
    /// Binds the surface and paints the empty keyboard screen.
    pub fn new(
        terminal: &'a mut Terminal<CrosstermBackend<Stdout>>,
        title: String,
    ) -> Result<Self> {
        let mut surface = Self {
            terminal,
            title,
            markers: BTreeMap::new(),
        };
        surface.repaint()?;
        Ok(surface)
    }

    fn repaint(&mut self) -> Result<()> {
        let title = &self.title;
        let markers = &self.markers;
        self.terminal
            .draw(|frame| ui::render_playback(frame, title, markers))?;
        Ok(())
    }
}

impl MarkerSurface for TerminalSurface<'_> {
    fn draw_marker(&mut self, x: f32, color: Rgb) {
        self.markers.insert(x.round() as u32, color);
    }

    fn erase_marker(&mut self, x: f32) {
        self.markers.remove(&(x.round() as u32));
    }

    fn present(&mut self) -> Result<()> {
        self.repaint()
    }

    fn clear_markers(&mut self) -> Result<()> {
        self.markers.clear();
        self.repaint()
    }
}

/// Quit detection polled once per event. Drains crossterm's queue without
/// blocking, so a quit cannot hide behind buffered key chatter.
#[derive(Debug, Default)]
pub struct CrosstermControl;

impl ControlInput for CrosstermControl {
    fn quit_requested(&mut self) -> bool {
        let mut quit = false;
        while event::poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    let ctrl_c = key.code == KeyCode::Char('c')
                        && key.modifiers.contains(KeyModifiers::CONTROL);
                    if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) || ctrl_c {
                        quit = true;
                    }
                }
                Ok(_) => {}
                Err(_) => break,
            }
        }
        quit
    }
}
