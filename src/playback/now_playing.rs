//! Now-playing payload published to the desktop (MPRIS on Linux).

use std::path::PathBuf;
use std::time::Duration;

use crate::library::{Track, file_url};

use super::progress::Progress;

/// The playback state of the controller as seen from outside.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PlaybackStatus {
    #[default]
    Stopped,
    Playing,
    Paused,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum MediaType {
    #[default]
    Audio,
}

impl MediaType {
    /// MIME types the engine can decode for this kind of media.
    pub fn mime_types(self) -> &'static [&'static str] {
        match self {
            MediaType::Audio => &[
                "audio/mpeg",
                "audio/flac",
                "audio/ogg",
                "audio/wav",
                "audio/mp4",
            ],
        }
    }
}

/// Everything the UI reads from the controller, captured after a state change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackSnapshot {
    pub status: PlaybackStatus,
    /// Index into the playlist of the loaded track; `None` when nothing is loaded.
    pub index: Option<usize>,
    pub track: Option<Track>,
    /// Display title of the most recently started track.
    pub title: String,
    pub album_title: Option<String>,
    pub artist: Option<String>,
    pub cover: Option<PathBuf>,
    pub playlist_len: usize,
    pub position: Duration,
    pub length: Option<Duration>,
    pub progress: Progress,
}

impl PlaybackSnapshot {
    pub fn playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }
}

/// Payload for the now-playing surface.
#[derive(Debug, Clone, PartialEq)]
pub struct NowPlaying {
    pub media_type: MediaType,
    pub is_live_stream: bool,
    pub status: PlaybackStatus,
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub asset_url: Option<String>,
    pub art_url: Option<String>,
    pub track_index: Option<usize>,
    pub length: Option<Duration>,
    pub elapsed: Duration,
}

impl NowPlaying {
    pub fn from_snapshot(s: &PlaybackSnapshot) -> Self {
        Self {
            media_type: MediaType::Audio,
            is_live_stream: false,
            status: s.status,
            title: s.track.as_ref().map(|t| t.name.clone()).unwrap_or_default(),
            artist: s.artist.clone().unwrap_or_default(),
            album: s.album_title.clone(),
            asset_url: s.track.as_ref().and_then(Track::url),
            art_url: s.cover.as_deref().and_then(file_url),
            track_index: s.index,
            length: s.length,
            elapsed: s.position,
        }
    }

    /// True when the two payloads differ at most in elapsed time.
    pub fn same_item_and_status(&self, other: &NowPlaying) -> bool {
        self.status == other.status
            && self.title == other.title
            && self.artist == other.artist
            && self.album == other.album
            && self.asset_url == other.asset_url
            && self.art_url == other.art_url
            && self.track_index == other.track_index
            && self.length == other.length
    }
}

/// Receiver of now-playing updates.
pub trait NowPlayingSink {
    fn publish(&self, now: &NowPlaying);
}
