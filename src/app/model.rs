//! Application model types: `App` and `Focus`.
//!
//! The `App` struct holds the scanned albums, the cursor in the album and
//! track lists, the album filter, and the last playback snapshot received
//! from the controller.

use crate::library::Album;
use crate::playback::PlaybackSnapshot;

/// Which list receives cursor movement.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Albums,
    Tracks,
}

/// The main application model.
pub struct App {
    pub albums: Vec<Album>,
    /// Album under the cursor (index into `albums`).
    pub selected: usize,
    /// Track under the cursor within the selected album.
    pub track_cursor: usize,
    pub focus: Focus,

    lower_titles: Option<Vec<String>>,

    pub filter_mode: bool,
    pub filter_query: String,
    pub current_dir: Option<String>,

    /// Album whose tracks make up the controller's playlist.
    pub playing_album: Option<usize>,
    /// Latest state published by the playback controller.
    pub now: PlaybackSnapshot,
}

impl App {
    /// Create a new `App` with the provided list of `albums`.
    pub fn new(albums: Vec<Album>) -> Self {
        // Optimization: for larger libraries, precompute lowercase titles to speed up fuzzy
        // filtering (avoid per-char lowercase conversions on every redraw/keystroke).
        let lower_titles = if albums.len() > 100 {
            Some(
                albums
                    .iter()
                    .map(|a| a.display().to_ascii_lowercase())
                    .collect(),
            )
        } else {
            None
        };

        Self {
            albums,
            selected: 0,
            track_cursor: 0,
            focus: Focus::Albums,
            lower_titles,
            filter_mode: false,
            filter_query: String::new(),
            current_dir: None,
            playing_album: None,
            now: PlaybackSnapshot::default(),
        }
    }

    /// Record the current directory in the app state.
    pub fn set_current_dir(&mut self, dir: String) {
        self.current_dir = Some(dir);
    }

    /// Return true if the library contains any albums.
    pub fn has_albums(&self) -> bool {
        !self.albums.is_empty()
    }

    pub fn selected_album(&self) -> Option<&Album> {
        self.albums.get(self.selected)
    }

    /// Album index and starting track for "play selection". `None` when the
    /// selected album is hidden by the filter or the library is empty.
    pub fn selection_to_play(&self) -> Option<(usize, usize)> {
        self.selected_album()?;
        if !self.display_indices().contains(&self.selected) {
            return None;
        }
        let start = match self.focus {
            Focus::Tracks => self.track_cursor,
            Focus::Albums => 0,
        };
        Some((self.selected, start))
    }

    /// Note that the controller's playlist now comes from album `idx`.
    pub fn set_playing_album(&mut self, idx: usize) {
        self.playing_album = Some(idx);
    }

    /// Take in a snapshot from the controller.
    pub fn apply_snapshot(&mut self, snapshot: PlaybackSnapshot) {
        self.now = snapshot;
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Albums if self.selected_album().is_some() => Focus::Tracks,
            _ => Focus::Albums,
        };
    }

    /// Jump the cursor to the playing album and track.
    pub fn reveal_now_playing(&mut self) {
        if let Some(idx) = self.playing_album {
            self.clear_filter();
            self.set_selected(idx);
            if let Some(t) = self.now.index {
                self.track_cursor = t;
            }
        }
    }

    /// Return the display order of album indices after filtering.
    pub fn display_indices(&self) -> Vec<usize> {
        let base = 0..self.albums.len();

        let query = self.filter_query.trim();
        if query.is_empty() {
            return base.collect();
        }

        match self.lower_titles.as_deref() {
            Some(lower_titles) => {
                let query_lower = query.to_ascii_lowercase();
                base.filter(|&i| {
                    Self::fuzzy_match_positions_lower(&lower_titles[i], &query_lower).is_some()
                })
                .collect()
            }
            None => base
                .filter(|&i| {
                    Self::fuzzy_match_positions(&self.albums[i].display(), query).is_some()
                })
                .collect(),
        }
    }

    /// Return true if this `App` uses precomputed lowercase titles.
    pub fn uses_lower_titles(&self) -> bool {
        self.lower_titles.is_some()
    }

    /// Return the next visible index in the current display order after `current`.
    /// Wraps around to the first element.
    pub fn next_in_view_from(&self, current: usize) -> Option<usize> {
        let display = self.display_indices();
        if display.is_empty() {
            return None;
        }

        let pos = display.iter().position(|&i| i == current);
        match pos {
            Some(p) => Some(display[(p + 1) % display.len()]),
            None => Some(display[0]),
        }
    }

    /// Return the previous visible index in the current display order before `current`.
    /// Wraps around to the last element.
    pub fn prev_in_view_from(&self, current: usize) -> Option<usize> {
        let display = self.display_indices();
        if display.is_empty() {
            return None;
        }

        let pos = display.iter().position(|&i| i == current);
        match pos {
            Some(0) => Some(display[display.len() - 1]),
            Some(p) => Some(display[p - 1]),
            None => Some(display[display.len() - 1]),
        }
    }

    /// Set the selected album and ensure it is visible in the display.
    pub fn set_selected(&mut self, idx: usize) {
        if self.selected != idx {
            self.track_cursor = 0;
        }
        self.selected = idx;
        self.ensure_selected_visible();
    }

    /// Fuzzy/subsequence match: return the character positions in `title`
    /// that match `query`, or `None` if not matched.
    pub fn fuzzy_match_positions(title: &str, query: &str) -> Option<Vec<usize>> {
        if query.is_empty() {
            return Some(Vec::new());
        }

        let mut positions: Vec<usize> = Vec::new();
        let mut title_iter = title.chars().enumerate();

        for qc in query.chars() {
            let qc_low = qc.to_ascii_lowercase();
            loop {
                match title_iter.next() {
                    Some((ti, tc)) if tc.to_ascii_lowercase() == qc_low => {
                        positions.push(ti);
                        break;
                    }
                    Some(_) => continue,
                    None => return None,
                }
            }
        }

        Some(positions)
    }

    /// Fuzzy match against the precomputed lowercase title of album `idx`.
    /// `query_lower` must already be lowercase.
    pub fn fuzzy_match_positions_for_album_lower(
        &self,
        idx: usize,
        query_lower: &str,
    ) -> Option<Vec<usize>> {
        let title = self.lower_titles.as_ref()?.get(idx)?;
        Self::fuzzy_match_positions_lower(title, query_lower)
    }

    fn fuzzy_match_positions_lower(title_lower: &str, query_lower: &str) -> Option<Vec<usize>> {
        if query_lower.is_empty() {
            return Some(Vec::new());
        }

        let mut positions: Vec<usize> = Vec::new();
        let mut title_iter = title_lower.chars().enumerate();

        for qc in query_lower.chars() {
            loop {
                match title_iter.next() {
                    Some((ti, tc)) if tc == qc => {
                        positions.push(ti);
                        break;
                    }
                    Some(_) => continue,
                    None => return None,
                }
            }
        }

        Some(positions)
    }

    /// Enter filter mode: album list takes the cursor.
    pub fn enter_filter_mode(&mut self) {
        self.filter_mode = true;
        self.focus = Focus::Albums;
        self.ensure_selected_visible();
    }
    /// Exit filter mode, keeping the query applied.
    pub fn exit_filter_mode(&mut self) {
        self.filter_mode = false;
    }
    /// Clear the active filter and restore selection visibility.
    pub fn clear_filter(&mut self) {
        self.filter_query.clear();
        self.filter_mode = false;
        self.ensure_selected_visible();
    }
    /// Append a character to the filter query and refresh view.
    pub fn push_filter_char(&mut self, c: char) {
        self.filter_query.push(c);
        self.ensure_selected_visible();
    }
    /// Remove the last character from the filter query and refresh view.
    pub fn pop_filter_char(&mut self) {
        self.filter_query.pop();
        self.ensure_selected_visible();
    }

    /// Ensure that `selected` is part of the current filtered view,
    /// otherwise move selection to the first visible album.
    fn ensure_selected_visible(&mut self) {
        let display = self.display_indices();
        if display.is_empty() {
            self.selected = 0;
            self.track_cursor = 0;
            return;
        }

        if !display.contains(&self.selected) {
            self.selected = display[0];
            self.track_cursor = 0;
        }
    }

    /// Move the cursor down in the focused list.
    pub fn next(&mut self) {
        match self.focus {
            Focus::Albums => {
                if let Some(next) = self.next_in_view_from(self.selected) {
                    self.set_selected(next);
                }
            }
            Focus::Tracks => {
                let len = self.selected_album().map_or(0, |a| a.tracks.len());
                if len > 0 {
                    self.track_cursor = (self.track_cursor + 1) % len;
                }
            }
        }
    }

    /// Move the cursor up in the focused list.
    pub fn prev(&mut self) {
        match self.focus {
            Focus::Albums => {
                if let Some(prev) = self.prev_in_view_from(self.selected) {
                    self.set_selected(prev);
                }
            }
            Focus::Tracks => {
                let len = self.selected_album().map_or(0, |a| a.tracks.len());
                if len > 0 {
                    self.track_cursor = (self.track_cursor + len - 1) % len;
                }
            }
        }
    }

    /// Move the cursor to the first entry of the focused list.
    pub fn first(&mut self) {
        match self.focus {
            Focus::Albums => {
                if let Some(&first) = self.display_indices().first() {
                    self.set_selected(first);
                }
            }
            Focus::Tracks => self.track_cursor = 0,
        }
    }

    /// Move the cursor to the last entry of the focused list.
    pub fn last(&mut self) {
        match self.focus {
            Focus::Albums => {
                if let Some(&last) = self.display_indices().last() {
                    self.set_selected(last);
                }
            }
            Focus::Tracks => {
                let len = self.selected_album().map_or(0, |a| a.tracks.len());
                self.track_cursor = len.saturating_sub(1);
            }
        }
    }
}
