//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock};

use crate::app::{App, Focus};
use crate::config::{ControlsSettings, UiSettings};
use crate::playback::{PlaybackSnapshot, PlaybackStatus, format_mmss};

static CONTROLS_MAP: LazyLock<BTreeMap<String, String>> = LazyLock::new(|| {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    map.insert("j/k".to_string(), "up/down".to_string());
    map.insert("tab".to_string(), "albums/tracks".to_string());
    map.insert("gg/G".to_string(), "top/bottom".to_string());
    map.insert("enter".to_string(), "play selection".to_string());
    map.insert("space/p".to_string(), "play/pause".to_string());
    map.insert("h/l".to_string(), "prev/next track".to_string());
    // H/L is filled dynamically from config.
    map.insert("s".to_string(), "stop".to_string());
    map.insert("zz".to_string(), "go to playing".to_string());
    map.insert("/".to_string(), "filter albums".to_string());
    map.insert("q".to_string(), "quit".to_string());
    map
});

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64) -> String {
    // Keep the rendered order stable and human-friendly.
    let order = [
        "j/k", "tab", "h/l", "H/L", "enter", "space/p", "s", "gg/G", "zz", "/", "q",
    ];
    order
        .iter()
        .filter_map(|k| {
            if *k == "H/L" {
                Some(format!("[H/L] scrub -/+{}s", scrub_seconds))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

fn status_word(status: PlaybackStatus) -> &'static str {
    match status {
        PlaybackStatus::Stopped => "Stopped",
        PlaybackStatus::Playing => "Playing",
        PlaybackStatus::Paused => "Paused",
    }
}

/// Status line: playback state, track, filter and directory.
fn status_text(app: &App) -> String {
    let now = &app.now;
    let mut parts: Vec<String> = vec![format!(" {}", status_word(now.status))];

    if now.status != PlaybackStatus::Stopped {
        let mut song = format!("Track: {}", now.title);
        if let Some(i) = now.index {
            song.push_str(&format!(" ({}/{})", i + 1, now.playlist_len));
        }
        parts.push(song);
        if let Some(album) = &now.album_title {
            match now.artist.as_deref() {
                Some(artist) => parts.push(format!("Album: {} - {}", artist, album)),
                None => parts.push(format!("Album: {}", album)),
            }
        }
    }

    let q = app.filter_query.trim();
    if app.filter_mode || !q.is_empty() {
        let mut filter_part = String::from("FILTER:");
        if !q.is_empty() {
            filter_part.push(' ');
            filter_part.push_str(q);
        }
        parts.push(filter_part);
    }

    if let Some(dir) = &app.current_dir {
        parts.push(format!("Dir: {}", dir));
    }

    parts.join(" • ")
}

/// Gauge label: elapsed on the left, remaining (when known) on the right.
fn progress_label(now: &PlaybackSnapshot) -> String {
    let elapsed = format_mmss(now.progress.elapsed_secs);
    if now.length.is_some_and(|d| !d.is_zero()) {
        format!(
            "{} / -{}",
            elapsed.trim_start(),
            format_mmss(now.progress.remaining_secs).trim_start()
        )
    } else {
        elapsed.trim_start().to_string()
    }
}

/// Center the selected row when possible; returns (start, end, selected offset).
fn visible_window(total: usize, height: usize, sel_pos: usize) -> (usize, usize, usize) {
    if total <= height || height == 0 {
        return (0, total, sel_pos);
    }
    let half = height / 2;
    let mut start = sel_pos.saturating_sub(half);
    if start + height > total {
        start = total - height;
    }
    (start, start + height, sel_pos - start)
}

/// Uppercase the characters of `title` at `positions` (fuzzy match highlight).
fn highlight(title: &str, positions: Vec<usize>) -> String {
    let mut rendered = String::new();
    let mut pos_iter = positions.into_iter();
    let mut next_pos = pos_iter.next();

    for (ci, ch) in title.chars().enumerate() {
        if next_pos == Some(ci) {
            for up in ch.to_uppercase() {
                rendered.push(up);
            }
            next_pos = pos_iter.next();
        } else {
            rendered.push(ch);
        }
    }
    rendered
}

fn list_block(title: &'static str, focused: bool) -> Block<'static> {
    let block = Block::default().borders(Borders::ALL).title(title);
    if focused {
        block.border_style(Style::default().add_modifier(Modifier::BOLD))
    } else {
        block
    }
}

fn draw_albums(frame: &mut Frame, app: &App, display: &[usize], area: Rect) {
    let q = app.filter_query.trim();
    let query_lower = if !q.is_empty() && app.uses_lower_titles() {
        Some(q.to_ascii_lowercase())
    } else {
        None
    };
    let total = display.len();
    let sel_pos = display.iter().position(|&i| i == app.selected).unwrap_or(0);
    let (start, end, selected_in_view) =
        visible_window(total, area.height.saturating_sub(2) as usize, sel_pos);

    // Only build ListItems for the visible window.
    let items: Vec<ListItem> = display[start..end]
        .iter()
        .map(|&i| {
            let title = app.albums[i].display();
            let marker = if app.playing_album == Some(i) && app.now.playing() {
                "♪ "
            } else {
                "  "
            };
            let positions = match query_lower.as_deref() {
                _ if q.is_empty() => None,
                Some(ql) => app.fuzzy_match_positions_for_album_lower(i, ql),
                None => App::fuzzy_match_positions(&title, q),
            };
            let text = match positions {
                Some(positions) => highlight(&title, positions),
                None => title,
            };
            ListItem::new(format!("{marker}{text}"))
        })
        .collect();

    let list = List::new(items)
        .block(list_block(" albums ", app.focus == Focus::Albums))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if total > 0 {
        state.select(Some(selected_in_view));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_tracks(frame: &mut Frame, app: &App, area: Rect) {
    let tracks = app.selected_album().map(|a| a.tracks.as_slice()).unwrap_or(&[]);
    let showing_playing = app.playing_album.is_some() && app.playing_album == Some(app.selected);
    let (start, end, selected_in_view) = visible_window(
        tracks.len(),
        area.height.saturating_sub(2) as usize,
        app.track_cursor,
    );

    let items: Vec<ListItem> = tracks[start..end]
        .iter()
        .enumerate()
        .map(|(offset, t)| {
            let i = start + offset;
            let marker = if showing_playing && app.now.index == Some(i) {
                match app.now.status {
                    PlaybackStatus::Playing => "▶ ",
                    _ => "‖ ",
                }
            } else {
                "  "
            };
            let dur = t
                .duration
                .map(|d| format!(" [{}]", format_mmss(d.as_secs()).trim_start()))
                .unwrap_or_default();
            ListItem::new(format!("{marker}{:>2}. {}{dur}", i + 1, t.list_label()))
        })
        .collect();

    let list = List::new(items)
        .block(list_block(" tracks ", app.focus == Focus::Tracks))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if !tracks.is_empty() && app.focus == Focus::Tracks {
        state.select(Some(selected_in_view));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

/// Render the entire UI into the provided `frame` using `app` state and settings.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    display: &[usize],
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
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" platter ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let status_par = Paragraph::new(status_text(app))
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

    let lists = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[2]);
    draw_albums(frame, app, display, lists[0]);
    draw_tracks(frame, app, lists[1]);

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" progress "))
        .gauge_style(Style::default().bold())
        .ratio(app.now.progress.fraction.clamp(0.0, 1.0))
        .label(progress_label(&app.now));
    frame.render_widget(gauge, chunks[3]);

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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::Progress;
    use std::time::Duration;

    #[test]
    fn controls_text_includes_scrub_seconds() {
        let text = controls_text(15);
        assert!(text.contains("[H/L] scrub -/+15s"));
        assert!(text.starts_with("[j/k] up/down"));
        assert!(text.ends_with("[q] quit"));
    }

    #[test]
    fn progress_label_shows_remaining_only_when_length_known() {
        let mut now = PlaybackSnapshot {
            progress: Progress::compute(Duration::from_secs(65), Some(Duration::from_secs(200))),
            length: Some(Duration::from_secs(200)),
            ..PlaybackSnapshot::default()
        };
        assert_eq!(progress_label(&now), "1:05 / -2:15");

        now.length = None;
        now.progress = Progress::compute(Duration::from_secs(65), None);
        assert_eq!(progress_label(&now), "1:05");
    }

    #[test]
    fn visible_window_centers_selection() {
        assert_eq!(visible_window(5, 10, 3), (0, 5, 3));
        assert_eq!(visible_window(100, 10, 50), (45, 55, 5));
        assert_eq!(visible_window(100, 10, 98), (90, 100, 8));
    }

    #[test]
    fn highlight_uppercases_matched_chars() {
        assert_eq!(highlight("abbey road", vec![0, 6]), "Abbey Road");
    }
}
