use std::env;
use std::path::PathBuf;
use std::sync::mpsc;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::audio::RodioEngine;
use crate::library::scan_library;
use crate::mpris::ControlCmd;
use crate::notify::{DbusBackend, NotificationGate};
use crate::playback::PlaybackController;

mod event_loop;
mod settings;

/// Music folder: first CLI argument, then `library.folder`, then the working directory.
fn music_dir(configured: Option<PathBuf>) -> PathBuf {
    env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or(configured)
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("Music"))
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load_settings();
    let log_path = settings::init_logging(&settings.logging);
    log::info!("platter starting, log file {:?}", log_path);

    let dir = music_dir(settings.library.folder.clone());
    let albums = scan_library(&dir, &settings.library);

    let engine = RodioEngine::open_default()?;

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx.clone());

    let notifications = &settings.notifications;
    let gate = NotificationGate::new(
        DbusBackend::new(notifications.enabled),
        notifications.alerts,
    );
    // The answer is cached by the gate; nothing waits on it.
    drop(gate.request_permission());

    let mut controller = PlaybackController::new(engine, mpris, gate);
    controller.set_notify_events(notifications.on_track_change, notifications.on_playlist_end);
    let snapshots = controller.subscribe();

    let mut app = App::new(albums);
    app.set_current_dir(dir.display().to_string());
    if !app.has_albums() {
        log::warn!("no playable files under {}", dir.display());
    }

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(
        &mut terminal,
        &settings,
        &mut app,
        &mut controller,
        &snapshots,
        &control_tx,
        &control_rx,
    );

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &run_result {
        log::error!("event loop failed: {e}");
    }
    log::info!("platter exiting");
    run_result
}
