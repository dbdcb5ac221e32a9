use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::config::Settings;
use crate::mpris::{ControlCmd, MprisHandle};
use crate::player::{AudioBackend, PlaybackState, Player, PlayerError};
use crate::runtime::mpris_sync::update_mpris;
use crate::ui;

/// How long one tick waits for terminal input. Short enough that
/// control-surface latency and the position bar feel immediate, long
/// enough not to saturate a core.
const INPUT_WAIT: Duration = Duration::from_millis(50);

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    /// Last playback state as emitted to MPRIS.
    last_playback: PlaybackState,
    /// Last track title as emitted to MPRIS.
    last_title: Option<String>,
}

impl EventLoopState {
    /// Construct a new `EventLoopState` seeded from `player`.
    pub fn new<B: AudioBackend>(player: &Player<B>) -> Self {
        Self {
            last_playback: player.state(),
            last_title: player.current_track().map(|t| t.title.clone()),
        }
    }
}

/// Main terminal event loop. Each tick, in fixed order: service at most
/// one pending control-surface request, wait (bounded) for one input
/// event, consume the decoder-finished flag, then sync MPRIS and render.
/// Returns `Ok(())` when shutdown is requested.
pub fn run<B: AudioBackend>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    cfg: &Settings,
    app: &mut App,
    player: &mut Player<B>,
    mpris: &MprisHandle,
    control_rx: &mpsc::Receiver<ControlCmd>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        if let Ok(cmd) = control_rx.try_recv() {
            handle_control_cmd(cmd, app, player, mpris);
        }

        if event::poll(INPUT_WAIT)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if handle_key_event(key, cfg, app, player, mpris) {
                        break;
                    }
                }
                // Resize already woke the poll; the redraw below covers it.
                _ => {}
            }
        }

        if let Err(e) = player.poll_finished() {
            app.set_status(e.to_string());
        }

        sync_mpris_if_changed(state, player, mpris);
        terminal.draw(|f| ui::draw(f, app, player, &cfg.ui, &cfg.controls))?;
    }

    Ok(())
}

/// Emit state to the control surface when it changed since the last
/// tick. Covers mutations that did not go through a handler, like
/// auto-advance on track end.
fn sync_mpris_if_changed<B: AudioBackend>(
    state: &mut EventLoopState,
    player: &Player<B>,
    mpris: &MprisHandle,
) {
    let title = player.current_track().map(|t| t.title.clone());
    if player.state() != state.last_playback || title != state.last_title {
        update_mpris(mpris, player);
        state.last_playback = player.state();
        state.last_title = title;
    }
}

fn note_err(app: &mut App, result: Result<(), PlayerError>) {
    if let Err(e) = result {
        app.set_status(e.to_string());
    }
}

fn handle_control_cmd<B: AudioBackend>(
    cmd: ControlCmd,
    app: &mut App,
    player: &mut Player<B>,
    mpris: &MprisHandle,
) {
    match cmd {
        // Play resumes only; starting playback is a terminal-side action.
        ControlCmd::Play => player.resume(),
        ControlCmd::Pause => player.pause(),
        ControlCmd::Next => note_err(app, player.next()),
        ControlCmd::Prev => note_err(app, player.previous()),
    }
    update_mpris(mpris, player);
}

/// Handle one key press; returns `true` when the app should quit.
fn handle_key_event<B: AudioBackend>(
    key: KeyEvent,
    cfg: &Settings,
    app: &mut App,
    player: &mut Player<B>,
    mpris: &MprisHandle,
) -> bool {
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,

        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Enter => activate_selection(app, player, mpris),

        KeyCode::Char(' ') => {
            player.toggle_pause();
            update_mpris(mpris, player);
        }
        KeyCode::Char('h') => {
            note_err(app, player.previous());
            update_mpris(mpris, player);
        }
        KeyCode::Char('l') => {
            note_err(app, player.next());
            update_mpris(mpris, player);
        }
        KeyCode::Char('H') => {
            let secs = cfg.controls.scrub_seconds.min(i64::MAX as u64) as i64;
            note_err(app, player.seek(-secs));
        }
        KeyCode::Char('L') => {
            let secs = cfg.controls.scrub_seconds.min(i64::MAX as u64) as i64;
            note_err(app, player.seek(secs));
        }
        KeyCode::Char('Z') => {
            note_err(app, player.play_first());
            update_mpris(mpris, player);
        }
        KeyCode::Char('X') => {
            note_err(app, player.play_last());
            update_mpris(mpris, player);
        }

        KeyCode::Char('s') => {
            player.toggle_shuffle();
            update_mpris(mpris, player);
        }
        KeyCode::Char('r') => player.cycle_repeat(),

        KeyCode::Char('=') => player.adjust_volume(5),
        KeyCode::Char('-') => player.adjust_volume(-5),
        KeyCode::Char('+') => player.adjust_volume(1),
        KeyCode::Char('_') => player.adjust_volume(-1),

        _ => {}
    }

    false
}

/// Enter on the parent row goes up, on a directory descends, on a file
/// rebuilds the queue from its siblings and plays it.
fn activate_selection<B: AudioBackend>(
    app: &mut App,
    player: &mut Player<B>,
    mpris: &MprisHandle,
) {
    let target = app.selected_entry().map(|e| (e.path.clone(), e.is_dir));
    match target {
        None => app.enter_parent(),
        Some((path, true)) => app.enter_dir(&path),
        Some((path, false)) => {
            note_err(app, player.open(&path));
            update_mpris(mpris, player);
        }
    }
}
