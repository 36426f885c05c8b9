use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use crate::audio::{Engine, ItemId};
use crate::library::{Album, Track};
use crate::notify::Notifier;

use super::now_playing::{NowPlaying, NowPlayingSink, PlaybackSnapshot, PlaybackStatus};
use super::progress::{Progress, duration_from_secs_f64};

/// Owner of "what is playing and where".
///
/// All track transitions go through [`PlaybackController::jump_to`]: an index
/// inside the playlist loads and plays that track, anything else (before the
/// first track or past the last one) stops playback. Next, previous and the
/// end-of-track event are callers of that one bounds check.
///
/// The controller is meant to be driven from a single thread; the engine is
/// owned here and nothing else issues engine commands.
pub struct PlaybackController<E: Engine> {
    engine: E,
    album: Option<Album>,
    playlist: Vec<Track>,
    /// Last index a track was started (or attempted) at.
    cursor: usize,
    title: String,
    playing: bool,
    /// End-of-track listener: the only item whose completion may advance.
    listener: Option<ItemId>,
    position: Duration,
    length: Option<Duration>,
    progress: Progress,

    reporter: Box<dyn NowPlayingSink>,
    notifier: Box<dyn Notifier>,
    observers: Vec<Sender<PlaybackSnapshot>>,
    notify_on_track_change: bool,
    notify_on_playlist_end: bool,
}

impl<E: Engine> PlaybackController<E> {
    pub fn new(
        engine: E,
        reporter: impl NowPlayingSink + 'static,
        notifier: impl Notifier + 'static,
    ) -> Self {
        Self {
            engine,
            album: None,
            playlist: Vec::new(),
            cursor: 0,
            title: String::new(),
            playing: false,
            listener: None,
            position: Duration::ZERO,
            length: None,
            progress: Progress::default(),
            reporter: Box::new(reporter),
            notifier: Box::new(notifier),
            observers: Vec::new(),
            notify_on_track_change: true,
            notify_on_playlist_end: false,
        }
    }

    /// Choose which playback events raise a desktop notification.
    pub fn set_notify_events(&mut self, on_track_change: bool, on_playlist_end: bool) {
        self.notify_on_track_change = on_track_change;
        self.notify_on_playlist_end = on_playlist_end;
    }

    /// Receive a snapshot after every state change.
    pub fn subscribe(&mut self) -> Receiver<PlaybackSnapshot> {
        let (tx, rx) = mpsc::channel();
        self.observers.push(tx);
        rx
    }

    /// Replace the playlist with `album`'s tracks and jump to `track_index`.
    pub fn select_album(&mut self, album: &Album, track_index: isize) {
        let mut album = album.clone();
        self.playlist = std::mem::take(&mut album.tracks);
        log::info!(
            "selected album {} ({} tracks)",
            album.display(),
            self.playlist.len()
        );
        self.album = Some(album);
        self.jump_to(track_index);
    }

    /// Play the track at `track_index`, or stop when it is out of range.
    pub fn jump_to(&mut self, track_index: isize) {
        match usize::try_from(track_index)
            .ok()
            .filter(|&i| i < self.playlist.len())
        {
            Some(i) => self.start_track(i),
            None => {
                log::debug!(
                    "index {track_index} outside playlist of {}, stopping",
                    self.playlist.len()
                );
                self.halt();
            }
        }
    }

    /// End-of-track event for `item`.
    ///
    /// Advances to the next track only when `item` is the armed listener;
    /// repeated or stale events are ignored. Returns whether it advanced.
    pub fn advance_on_track_end(&mut self, item: ItemId) -> bool {
        if self.listener != Some(item) {
            log::debug!("ignoring end-of-track for superseded {item}");
            return false;
        }
        self.listener = None;

        let was_last = self.cursor + 1 >= self.playlist.len();
        log::info!("end of track {}, advancing", self.cursor);
        self.jump_to(self.cursor as isize + 1);

        if was_last && self.notify_on_playlist_end {
            let album = self.album.as_ref().map(Album::display).unwrap_or_default();
            self.notifier.notify("Playlist finished", &album);
        }
        true
    }

    pub fn next(&mut self) {
        self.jump_to(self.cursor as isize + 1);
    }

    pub fn previous(&mut self) {
        self.jump_to(self.cursor as isize - 1);
    }

    pub fn pause(&mut self) {
        self.engine.pause();
        self.playing = false;
        self.publish();
    }

    /// Resume the loaded track. Does nothing when no track is loaded.
    pub fn play(&mut self) {
        if self.engine.loaded().is_none() {
            return;
        }
        self.engine.play();
        self.playing = true;
        self.publish();
    }

    /// Pause when playing; otherwise resume, or restart the cursor track after a stop.
    pub fn toggle(&mut self) {
        if self.playing {
            self.pause();
        } else if self.engine.loaded().is_some() {
            self.play();
        } else {
            self.jump_to(self.cursor as isize);
        }
    }

    pub fn stop(&mut self) {
        self.halt();
    }

    /// Hand the engine to `f` for a last command (e.g. a fade-out), then stop.
    pub fn shutdown_with(&mut self, f: impl FnOnce(&mut E)) {
        self.listener = None;
        f(&mut self.engine);
        self.halt();
    }

    /// Recompute the position fields from an engine sample.
    pub fn on_position_tick(&mut self, position: Duration, duration: Option<Duration>) {
        self.position = position;
        self.length = duration;
        self.progress = Progress::compute(position, duration);
        self.publish();
    }

    /// Periodic driver: sample the position and deliver end-of-track events.
    pub fn tick(&mut self) {
        if self.engine.loaded().is_some() {
            let position = self.engine.position();
            let duration = self.engine.duration();
            self.on_position_tick(position, duration);
        }

        while let Some(item) = self.engine.take_finished() {
            self.advance_on_track_end(item);
        }
    }

    /// Seek to `target_fraction` of the loaded track's duration.
    pub fn seek(&mut self, target_fraction: f64) {
        if self.engine.loaded().is_none() || !target_fraction.is_finite() {
            return;
        }
        let Some(duration) = self.engine.duration() else {
            log::debug!("seek ignored, duration unknown");
            return;
        };

        let Some(target) =
            duration_from_secs_f64(duration.as_secs_f64() * target_fraction.clamp(0.0, 1.0))
        else {
            return;
        };
        if let Err(e) = self.engine.seek(target) {
            log::warn!("seek to {target:?} failed: {e}");
        }
    }

    /// Scrub by `seconds` relative to the current position.
    pub fn seek_by(&mut self, seconds: i64) {
        let Some(duration) = self.engine.duration().filter(|d| !d.is_zero()) else {
            return;
        };
        let target = (self.engine.position().as_secs_f64() + seconds as f64).max(0.0);
        self.seek(target / duration.as_secs_f64());
    }

    pub fn current_index(&self) -> Option<usize> {
        self.engine.loaded().map(|_| self.cursor)
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn playlist(&self) -> &[Track] {
        &self.playlist
    }

    pub fn status(&self) -> PlaybackStatus {
        if self.playing {
            PlaybackStatus::Playing
        } else if self.engine.loaded().is_some() {
            PlaybackStatus::Paused
        } else {
            PlaybackStatus::Stopped
        }
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        let index = self.current_index();
        PlaybackSnapshot {
            status: self.status(),
            index,
            track: index.and_then(|i| self.playlist.get(i).cloned()),
            title: self.title.clone(),
            album_title: self.album.as_ref().map(|a| a.title.clone()),
            artist: self.album.as_ref().and_then(|a| a.artist.clone()),
            cover: self.album.as_ref().and_then(|a| a.cover.clone()),
            playlist_len: self.playlist.len(),
            position: self.position,
            length: self.length,
            progress: self.progress,
        }
    }

    fn start_track(&mut self, i: usize) {
        let track = self.playlist[i].clone();

        // Drop interest in the previous item before loading, so its
        // completion can never advance past the new one.
        self.listener = None;
        self.cursor = i;

        let item = match self.engine.load(&track) {
            Ok(item) => item,
            Err(e) => {
                log::warn!("cannot play {}: {e}", track.path.display());
                self.halt();
                return;
            }
        };

        self.title = track.name.clone();
        self.engine.play();
        self.playing = true;
        self.listener = Some(item);
        self.position = Duration::ZERO;
        self.length = self.engine.duration().or(track.duration);
        self.progress = Progress::compute(Duration::ZERO, self.length);

        log::info!(
            "playing {} ({}/{}) as {item}",
            track.name,
            i + 1,
            self.playlist.len()
        );
        self.publish();

        if self.notify_on_track_change {
            let message = match self.album.as_ref().and_then(|a| a.artist.as_deref()) {
                Some(artist) => format!("{} - {}", artist, self.title),
                None => self.title.clone(),
            };
            self.notifier.notify("Now playing", &message);
        }
    }

    /// The stopped terminal state.
    fn halt(&mut self) {
        self.listener = None;
        self.engine.stop();
        self.playing = false;
        self.position = Duration::ZERO;
        self.length = None;
        self.progress = Progress::default();
        self.publish();
    }

    fn publish(&mut self) {
        let snapshot = self.snapshot();
        self.reporter.publish(&NowPlaying::from_snapshot(&snapshot));
        self.observers.retain(|tx| tx.send(snapshot.clone()).is_ok());
    }
}
