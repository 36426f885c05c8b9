use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::audio::RodioEngine;
use crate::config;
use crate::mpris::ControlCmd;
use crate::playback::{PlaybackController, PlaybackSnapshot};
use crate::ui;

type Controller = PlaybackController<RodioEngine>;

/// State tracked by the runtime event loop across iterations.
struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pending_gg: bool,
    pending_zz: bool,
    last_tick: Instant,
}

impl EventLoopState {
    fn new() -> Self {
        Self {
            pending_gg: false,
            pending_zz: false,
            last_tick: Instant::now(),
        }
    }
}

/// Main terminal event loop: handles input, drives the playback controller's
/// position tick and redraws. Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    controller: &mut Controller,
    snapshots: &mpsc::Receiver<PlaybackSnapshot>,
    control_tx: &mpsc::Sender<ControlCmd>,
    control_rx: &mpsc::Receiver<ControlCmd>,
) -> Result<(), Box<dyn std::error::Error>> {
    let tick = Duration::from_millis(settings.audio.tick_ms.max(1));
    let mut state = EventLoopState::new();

    loop {
        if state.last_tick.elapsed() >= tick {
            controller.tick();
            state.last_tick = Instant::now();
        }

        while let Ok(snapshot) = snapshots.try_recv() {
            app.apply_snapshot(snapshot);
        }

        let display = app.display_indices();
        terminal.draw(|f| ui::draw(f, app, &display, &settings.ui, &settings.controls))?;

        while let Ok(cmd) = control_rx.try_recv() {
            if handle_control_cmd(cmd, settings, app, controller) {
                return Ok(());
            }
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, controller, control_tx, &mut state) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Load the selected album into the controller, starting at the track cursor
/// when the track list has focus.
fn play_selection(app: &mut App, controller: &mut Controller) {
    let Some((idx, start)) = app.selection_to_play() else {
        return;
    };
    controller.select_album(&app.albums[idx], start as isize);
    app.set_playing_album(idx);
}

fn quit(settings: &config::Settings, controller: &mut Controller) {
    let fade = Duration::from_millis(settings.audio.quit_fade_out_ms);
    controller.shutdown_with(|engine| engine.fade_out_and_stop(fade));
}

fn handle_control_cmd(
    cmd: ControlCmd,
    settings: &config::Settings,
    app: &mut App,
    controller: &mut Controller,
) -> bool {
    log::debug!("control command {cmd:?}");
    match cmd {
        ControlCmd::Quit => {
            quit(settings, controller);
            return true;
        }
        ControlCmd::Play => {
            if controller.playlist().is_empty() {
                play_selection(app, controller);
            } else if !controller.is_playing() {
                controller.toggle();
            }
        }
        ControlCmd::Pause => controller.pause(),
        ControlCmd::PlayPause => {
            if controller.playlist().is_empty() {
                play_selection(app, controller);
            } else {
                controller.toggle();
            }
        }
        ControlCmd::Stop => controller.stop(),
        ControlCmd::Next => controller.next(),
        ControlCmd::Prev => controller.previous(),
        ControlCmd::Seek(seconds) => controller.seek_by(seconds),
    }

    false
}

/// Returns true when the user asked to quit.
fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    controller: &mut Controller,
    control_tx: &mpsc::Sender<ControlCmd>,
    state: &mut EventLoopState,
) -> bool {
    if app.filter_mode {
        state.pending_gg = false;
        state.pending_zz = false;
        match key.code {
            KeyCode::Esc => app.clear_filter(),
            KeyCode::Backspace => app.pop_filter_char(),
            KeyCode::Char('j') | KeyCode::Char('n')
                if key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                app.next()
            }
            KeyCode::Char('k') | KeyCode::Char('p')
                if key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                app.prev()
            }
            KeyCode::Char(c) => {
                if !c.is_control() {
                    app.push_filter_char(c);
                }
            }
            KeyCode::Enter => {
                if !app.display_indices().is_empty() {
                    app.exit_filter_mode();
                    play_selection(app, controller);
                }
            }
            _ => {}
        }

        return false;
    }

    if key.code != KeyCode::Char('g') {
        state.pending_gg = false;
    }
    if key.code != KeyCode::Char('z') {
        state.pending_zz = false;
    }

    let scrub = settings.controls.scrub_seconds.min(i64::MAX as u64) as i64;

    match key.code {
        KeyCode::Char('q') => {
            quit(settings, controller);
            return true;
        }
        KeyCode::Char('/') => app.enter_filter_mode(),
        KeyCode::Tab => app.toggle_focus(),
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                app.first();
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => app.last(),
        KeyCode::Char('z') => {
            if state.pending_zz {
                state.pending_zz = false;
                app.reveal_now_playing();
            } else {
                state.pending_zz = true;
            }
        }
        KeyCode::Char('j') | KeyCode::Down => app.next(),
        KeyCode::Char('k') | KeyCode::Up => app.prev(),
        KeyCode::Enter => play_selection(app, controller),
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            let _ = control_tx.send(ControlCmd::PlayPause);
        }
        KeyCode::Char('l') => {
            let _ = control_tx.send(ControlCmd::Next);
        }
        KeyCode::Char('h') => {
            let _ = control_tx.send(ControlCmd::Prev);
        }
        KeyCode::Char('s') => {
            let _ = control_tx.send(ControlCmd::Stop);
        }
        KeyCode::Char('L') => controller.seek_by(scrub),
        KeyCode::Char('H') => controller.seek_by(-scrub),
        _ => {}
    }

    false
}
