//! UI rendering helpers for the terminal user interface.
//!
//! Rendering is a pure function of the browser and player state; all
//! mutation happens in the runtime event loop.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::time::Duration;

use crate::app::App;
use crate::config::{ControlsSettings, UiSettings};
use crate::player::{AudioBackend, PlaybackState, Player, RepeatMode};

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64) -> String {
    [
        "[j/k] up/down".to_string(),
        "[enter] open/play".to_string(),
        "[space] play/pause".to_string(),
        "[h/l] prev/next".to_string(),
        format!("[H/L] scrub -/+{}s", scrub_seconds),
        "[Z/X] first/last".to_string(),
        "[s] shuffle".to_string(),
        "[r] repeat".to_string(),
        "[=/-] volume".to_string(),
        "[q] quit".to_string(),
    ]
    .join(" | ")
}

/// Format a duration as `MM:SS`, or `H:MM:SS` above an hour.
fn format_clock(d: Duration) -> String {
    let secs = d.as_secs();
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{:02}:{:02}", m, s)
    }
}

fn repeat_label(mode: RepeatMode) -> &'static str {
    match mode {
        RepeatMode::None => "None",
        RepeatMode::Directory => "Directory",
        RepeatMode::One => "One",
    }
}

/// Render the entire UI into the provided `frame`.
pub fn draw<B: AudioBackend>(
    frame: &mut Frame,
    app: &App,
    player: &Player<B>,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" attacca ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Status box
    let status = {
        let mut parts: Vec<String> = Vec::new();

        match player.state() {
            PlaybackState::Stopped => parts.push("Stopped".to_string()),
            state => {
                if let Some(track) = player.current_track() {
                    let elapsed = format_clock(player.position());
                    let total = player
                        .duration()
                        .map(format_clock)
                        .unwrap_or_else(|| "--:--".to_string());
                    parts.push(format!("Song: {} [{} / {}]", track.title, elapsed, total));
                }
                parts.push(
                    match state {
                        PlaybackState::Playing => "Playing",
                        _ => "Paused",
                    }
                    .to_string(),
                );
            }
        }

        parts.push(format!(
            "Shuffle: {}",
            if player.shuffle() { "ON" } else { "OFF" }
        ));
        parts.push(format!("Repeat: {}", repeat_label(player.repeat())));
        parts.push(format!("Vol: {}%", player.volume()));
        parts.push(format!("Dir: {}", app.cwd.display()));

        if let Some(note) = &app.status {
            parts.push(format!("({note})"));
        }

        parts.join(" • ")
    };

    let status_par = Paragraph::new(status)
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, chunks[1]);

    // Entry list: row 0 is the virtual parent-directory entry.
    {
        let now_playing = player.current_track().map(|t| t.path.clone());
        let queue_len = player.queue().len();

        let mut items: Vec<ListItem> = Vec::with_capacity(app.row_count());
        items.push(ListItem::new(ui_settings.icon_dir_up.clone()));

        for (row, entry) in app.entries.iter().enumerate() {
            let highlighted = row + 1 == app.selected;
            let mut text = String::new();

            if now_playing.as_deref() == Some(entry.path.as_path()) {
                let icon = if highlighted {
                    &ui_settings.icon_now_playing_selected
                } else {
                    &ui_settings.icon_now_playing
                };
                text.push_str(icon);
                text.push(' ');
            }

            text.push_str(&entry.name);
            if entry.is_dir {
                text.push('/');
            } else if let Some(slot) = player.queue().slot_of_path(&entry.path) {
                text.push_str(&format!("  [{}/{}]", slot + 1, queue_len));
            }

            items.push(ListItem::new(text));
        }

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(" browse "))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ListState::default();
        state.select(Some(app.selected));
        frame.render_stateful_widget(list, chunks[2], &mut state);
    }

    // Progress bar
    {
        let (ratio, label) = match (player.state(), player.duration()) {
            (PlaybackState::Stopped, _) => (0.0, "--:-- / --:--".to_string()),
            (_, Some(total)) if !total.is_zero() => {
                let elapsed = player.position();
                let ratio = (elapsed.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0);
                (
                    ratio,
                    format!("{} / {}", format_clock(elapsed), format_clock(total)),
                )
            }
            _ => (0.0, format!("{} / --:--", format_clock(player.position()))),
        };

        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title(" position "))
            .ratio(ratio)
            .label(label);
        frame.render_widget(gauge, chunks[3]);
    }

    // Controls footer
    let footer = Paragraph::new(controls_text(controls_settings.scrub_seconds))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[4]);
}
