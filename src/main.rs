//! pianotui - a terminal piano player and performance visualizer.
//!
//! Replays prerecorded performances on an 88-key terminal keyboard, marking
//! struck keys in the recording's colors while the backing track plays, and
//! offers a clickable three-octave piano.
//!
//! # Features
//!
//! - Five bundled performances with per-recording marker palettes
//! - Chord-accurate marker timing, latency-corrected per recording
//! - SoundFont-based audio via rustysynth and rodio
//! - Interactive keyboard played with the mouse
//! - Catalog override via `recordings.json` in the assets directory
//!
//! # Usage
//!
//! ```bash
//! cargo run                           # Assets from ./assets
//! cargo run -- --assets ~/piano      # Custom assets directory
//! cargo run -- --soundfont gm.sf2    # Custom SoundFont
//! ```

mod app;
mod audio;
mod keys;
mod playback;
mod recording;
mod ui;

use app::{App, CrosstermControl, TerminalSurface};
use playback::player::{PlayOutcome, TimelinePlayer};
use playback::stream::FileEventStream;
use playback::timing::ThreadPacer;

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::time::Duration;

/// Directory holding the per-note MIDI files for the interactive piano.
const NOTES_DIR: &str = "notes";

/// Default SoundFont filename looked up inside the assets directory.
const SOUNDFONT_FILE: &str = "soundfont.sf2";

/// Command-line options for the application.
struct CliOptions {
    /// Directory with recordings, note samples, and the SoundFont.
    assets: PathBuf,
    /// Path to a custom SoundFont file.
    soundfont: Option<PathBuf>,
}

impl CliOptions {
    /// Parses command-line arguments.
    ///
    /// Supports:
    /// - `--assets <dir>` or `-a <dir>`: assets directory (default `assets`)
    /// - `--soundfont <path>` or `-sf <path>`: custom SoundFont file
    /// - `--help` or `-h`: print help and exit
    fn parse() -> Result<Self> {
        let args: Vec<String> = std::env::args().collect();
        let mut assets = PathBuf::from("assets");
        let mut soundfont: Option<PathBuf> = None;
        let mut i = 1;

        while i < args.len() {
            match args[i].as_str() {
                "--assets" | "-a" => {
                    i += 1;
                    if i >= args.len() {
                        eprintln!("Error: --assets requires a path argument");
                        std::process::exit(1);
                    }
                    assets = PathBuf::from(&args[i]);
                }
                "--soundfont" | "-sf" => {
                    i += 1;
                    if i >= args.len() {
                        eprintln!("Error: --soundfont requires a path argument");
                        std::process::exit(1);
                    }
                    soundfont = Some(PathBuf::from(&args[i]));
                }
                "--help" | "-h" => {
                    eprintln!("pianotui - terminal piano player and visualizer");
                    eprintln!();
                    eprintln!(
                        "Usage: {} [OPTIONS]",
                        args.first().unwrap_or(&"pianotui".to_string())
                    );
                    eprintln!();
                    eprintln!("Options:");
                    eprintln!("  -a, --assets DIR       Assets directory (default: assets)");
                    eprintln!("  -sf, --soundfont PATH  Load a specific SoundFont file (.sf2)");
                    eprintln!("  -h, --help             Print this help message");
                    eprintln!();
                    eprintln!("Without --soundfont, DIR/soundfont.sf2 is used.");
                    std::process::exit(0);
                }
                other => {
                    // A bare SoundFont path works as a positional argument
                    if other.ends_with(".sf2") {
                        soundfont = Some(PathBuf::from(other));
                    } else {
                        eprintln!("Unknown option: {}", other);
                        eprintln!("Use --help for usage information");
                        std::process::exit(1);
                    }
                }
            }
            i += 1;
        }

        Ok(Self { assets, soundfont })
    }
}

/// Main entry point.
fn main() -> Result<()> {
    // Parse CLI options first (before any terminal setup)
    let cli = CliOptions::parse()?;

    // Initialize logging (optional, for debugging)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let soundfont = cli
        .soundfont
        .clone()
        .unwrap_or_else(|| cli.assets.join(SOUNDFONT_FILE));
    if !soundfont.exists() {
        anyhow::bail!(
            "SoundFont not found: {} (a .sf2 file is required for audio playback)",
            soundfont.display()
        );
    }

    let mut terminal = setup_terminal().context("Failed to setup terminal")?;
    let mut app = App::new(cli.assets, soundfont).context("Failed to initialize application")?;

    // Run main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    restore_terminal(&mut terminal).context("Failed to restore terminal")?;

    // Handle any errors from the main loop
    result
}

/// Runs the menu loop, dispatching into playback or interactive sessions.
fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|frame| ui::render_menu(frame, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
                        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
                        KeyCode::Enter => {
                            let index = app.selected;
                            if index < app.catalog.recordings().len() {
                                run_playback(terminal, app, index)?;
                            } else {
                                run_interactive(terminal, app)?;
                            }
                        }
                        KeyCode::Esc | KeyCode::Char('q') => return Ok(()),
                        _ => {}
                    }
                }
            }
        }
    }
}

/// Plays one recording: the visual timeline on this thread, audio on its
/// own. Session resources live inside this call; a missing event file
/// returns to the menu with a status instead of tearing the app down.
fn run_playback(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    index: usize,
) -> Result<()> {
    let recording = app.catalog.recordings()[index].clone();
    let mut events = match FileEventStream::open(&recording.events) {
        Ok(events) => events,
        Err(err) => {
            tracing::error!("Cannot open {}: {}", recording.events.display(), err);
            app.set_status(format!(
                "Cannot open {}: {}",
                recording.events.display(),
                err
            ));
            return Ok(());
        }
    };

    let mut surface = TerminalSurface::new(terminal, recording.title.clone())?;
    let mut input = CrosstermControl;
    let mut pacer = ThreadPacer;
    let outcome = TimelinePlayer::new(
        &recording,
        &mut surface,
        &mut app.engine,
        &mut input,
        &mut pacer,
    )
    .play(&mut events);

    match outcome {
        Ok(PlayOutcome::Completed) => app.set_status(format!("Finished {}", recording.title)),
        Ok(PlayOutcome::Cancelled) => app.set_status("Playback stopped"),
        Err(err) => {
            tracing::error!("Playback of {} failed: {:#}", recording.id, err);
            app.set_status(format!("Playback failed: {err}"));
        }
    }
    Ok(())
}

/// The clickable piano. Notes trigger one at a time; a click while the
/// previous note still sounds is dropped rather than overlapped.
fn run_interactive(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
) -> Result<()> {
    let notes_dir = app.assets_dir.join(NOTES_DIR);
    let mut status = String::from("Click a key to play it");
    let mut keyboard_area = Rect::default();

    loop {
        terminal.draw(|frame| {
            keyboard_area = ui::render_interactive(frame, &status);
        })?;

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) {
                        app.engine.stop_playback();
                        return Ok(());
                    }
                }
                Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                    let Some((x, y)) =
                        ui::keyboard_cell_to_canvas(mouse.column, mouse.row, keyboard_area)
                    else {
                        continue;
                    };
                    let Some(key) = keys::locate(x, y) else {
                        continue;
                    };
                    if app.engine.is_busy() {
                        // Let the previous note ring out
                        continue;
                    }
                    let path = notes_dir.join(format!("{}.mid", key.asset_stem()));
                    match app.engine.load_file(&path) {
                        Ok(()) => {
                            app.engine.play_staged();
                            status = format!("Playing {}", key.asset_stem());
                        }
                        Err(err) => {
                            tracing::warn!("Note sample unavailable: {:#}", err);
                            status = format!("No sample for {}", key.asset_stem());
                        }
                    }
                }
                _ => {}
            }
        }
    }
}

/// Sets up the terminal for TUI rendering.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;
    Ok(terminal)
}

/// Restores the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}
