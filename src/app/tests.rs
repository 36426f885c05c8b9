use super::*;
use crate::library::{Album, Track};
use crate::playback::{PlaybackSnapshot, PlaybackStatus};
use std::path::PathBuf;

fn album(artist: Option<&str>, title: &str, tracks: usize) -> Album {
    Album {
        path: PathBuf::from(format!("/music/{title}")),
        title: title.into(),
        artist: artist.map(Into::into),
        cover: None,
        tracks: (0..tracks)
            .map(|i| Track::from_path(format!("/music/{title}/{i:02}.mp3")))
            .collect(),
    }
}

fn a(title: &str) -> Album {
    album(None, title, 3)
}

#[test]
fn fuzzy_match_simple() {
    let title = "Hello World";
    assert!(App::fuzzy_match_positions(title, "hw").is_some());
    assert!(App::fuzzy_match_positions(title, "ello").is_some());
    assert!(App::fuzzy_match_positions(title, "xyz").is_none());
}

#[test]
fn fuzzy_match_reports_positions() {
    assert_eq!(
        App::fuzzy_match_positions("Abbey Road", "ar"),
        Some(vec![0, 6])
    );
}

#[test]
fn display_indices_respects_filter_query() {
    let mut app = App::new(vec![a("Alpha"), a("Beta"), a("Gamma")]);
    app.push_filter_char('m');
    assert_eq!(app.display_indices(), vec![2]);
}

#[test]
fn display_indices_matches_artist_prefix() {
    let albums = vec![
        album(Some("Metallica"), "Ride the Lightning", 1),
        album(Some("Black Sabbath"), "Paranoid", 1),
    ];

    let mut app = App::new(albums);
    // Fuzzy query: letters appear in order but not necessarily contiguously
    app.filter_query = "mtrl".into();

    assert_eq!(app.display_indices(), vec![0]);
}

#[test]
fn trimming_filter_query_affects_matching() {
    let mut app = App::new(vec![a("Black Sabbath")]);
    app.filter_query = "Black ".into();
    assert_eq!(app.display_indices(), vec![0]);

    app.filter_query = "   ".into();
    assert_eq!(app.display_indices(), vec![0]);
}

#[test]
fn large_library_uses_precomputed_lowercase_titles() {
    let albums: Vec<Album> = (0..150).map(|i| a(&format!("Album {i}"))).collect();
    let mut app = App::new(albums);
    assert!(app.uses_lower_titles());

    app.filter_query = "ALBUM 149".into();
    assert_eq!(app.display_indices(), vec![149]);
    assert_eq!(
        app.fuzzy_match_positions_for_album_lower(3, "a3"),
        Some(vec![0, 6])
    );

    assert!(!App::new(vec![a("x")]).uses_lower_titles());
}

#[test]
fn next_prev_in_view_helpers_work() {
    let mut app = App::new(vec![a("Alpha"), a("Beta"), a("Gamma")]);
    app.filter_query = "et".into(); // only Beta is visible

    assert_eq!(app.next_in_view_from(0), Some(1));
    assert_eq!(app.prev_in_view_from(0), Some(1));
    assert_eq!(app.next_in_view_from(1), Some(1));
    assert_eq!(app.prev_in_view_from(1), Some(1));
}

#[test]
fn filter_moves_selection_into_view() {
    let mut app = App::new(vec![a("Alpha"), a("Beta"), a("Gamma")]);
    app.set_selected(0);
    app.enter_filter_mode();
    for c in "gam".chars() {
        app.push_filter_char(c);
    }
    assert_eq!(app.selected, 2);

    app.exit_filter_mode();
    assert!(!app.filter_mode);
    assert_eq!(app.filter_query, "gam");

    app.clear_filter();
    assert!(app.filter_query.is_empty());
    assert_eq!(app.display_indices().len(), 3);
}

#[test]
fn album_focus_wraps_through_albums() {
    let mut app = App::new(vec![a("A"), a("B"), a("C")]);
    app.prev();
    assert_eq!(app.selected, 2);
    app.next();
    assert_eq!(app.selected, 0);
    app.last();
    assert_eq!(app.selected, 2);
    app.first();
    assert_eq!(app.selected, 0);
}

#[test]
fn track_focus_moves_track_cursor_only() {
    let mut app = App::new(vec![album(None, "A", 4), a("B")]);
    app.toggle_focus();
    assert_eq!(app.focus, Focus::Tracks);

    app.next();
    app.next();
    assert_eq!((app.selected, app.track_cursor), (0, 2));

    app.last();
    assert_eq!(app.track_cursor, 3);
    app.next();
    assert_eq!(app.track_cursor, 0);
    app.prev();
    assert_eq!(app.track_cursor, 3);
    app.first();
    assert_eq!(app.track_cursor, 0);
}

#[test]
fn changing_album_resets_track_cursor() {
    let mut app = App::new(vec![a("A"), a("B")]);
    app.track_cursor = 2;
    app.set_selected(1);
    assert_eq!(app.track_cursor, 0);
}

#[test]
fn focus_stays_on_albums_for_empty_library() {
    let mut app = App::new(Vec::new());
    assert!(!app.has_albums());
    app.toggle_focus();
    assert_eq!(app.focus, Focus::Albums);
    app.next();
    app.last();
    assert_eq!(app.selected, 0);
}

#[test]
fn reveal_now_playing_selects_playing_album_and_track() {
    let mut app = App::new(vec![a("Alpha"), a("Beta")]);
    app.filter_query = "alp".into();
    app.set_playing_album(1);
    app.apply_snapshot(PlaybackSnapshot {
        status: PlaybackStatus::Playing,
        index: Some(2),
        ..PlaybackSnapshot::default()
    });

    app.reveal_now_playing();
    assert!(app.filter_query.is_empty());
    assert_eq!((app.selected, app.track_cursor), (1, 2));
    assert_eq!(app.playing_album, Some(1));
}

#[test]
fn selection_to_play_starts_at_track_cursor_when_tracks_focused() {
    let mut app = App::new(vec![a("Alpha"), album(None, "Beta", 4)]);
    app.set_selected(1);
    assert_eq!(app.selection_to_play(), Some((1, 0)));

    app.toggle_focus();
    app.next();
    app.next();
    assert_eq!(app.selection_to_play(), Some((1, 2)));
}

#[test]
fn nothing_to_play_when_filter_hides_every_album() {
    let mut app = App::new(vec![a("Alpha"), a("Beta")]);
    app.enter_filter_mode();
    for c in "zzz".chars() {
        app.push_filter_char(c);
    }
    app.exit_filter_mode();

    assert!(app.display_indices().is_empty());
    assert_eq!(app.selection_to_play(), None);
    assert_eq!(App::new(Vec::new()).selection_to_play(), None);
}
