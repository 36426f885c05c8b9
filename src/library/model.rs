use std::path::{self, Path, PathBuf};
use std::time::Duration;

use url::Url;

/// One playable audio file.
///
/// `name` is the last path segment of `path` and is what the player shows as
/// the track title while it plays. Tag fields are filled in by the scanner
/// when the file carries them.
#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    pub path: PathBuf,
    pub name: String,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub duration: Option<Duration>,
}

impl Track {
    /// Build a bare track reference with no tag metadata.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = last_segment(&path);
        Self {
            path,
            name,
            title: None,
            artist: None,
            album: None,
            duration: None,
        }
    }

    /// `file://` URL for the track, as expected by MPRIS clients.
    pub fn url(&self) -> Option<String> {
        file_url(&self.path)
    }

    /// Label for track lists: the tag title when there is one, else the file name.
    pub fn list_label(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }
}

/// A folder of tracks played as one playlist.
#[derive(Clone, Debug, PartialEq)]
pub struct Album {
    pub path: PathBuf,
    pub title: String,
    pub artist: Option<String>,
    pub cover: Option<PathBuf>,
    pub tracks: Vec<Track>,
}

impl Album {
    /// "Artist - Title", or just the title when no artist is known.
    pub fn display(&self) -> String {
        match self.artist.as_deref().map(str::trim) {
            Some(a) if !a.is_empty() => format!("{} - {}", a, self.title),
            _ => self.title.clone(),
        }
    }
}

pub(super) fn last_segment(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}

/// Percent-encoded `file://` URL for `path`; relative paths are resolved
/// against the working directory. `None` when no absolute form exists.
pub fn file_url(path: &Path) -> Option<String> {
    let absolute = path::absolute(path).ok()?;
    Url::from_file_path(absolute).ok().map(String::from)
}
