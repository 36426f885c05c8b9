use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use lofty::prelude::*;
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::model::{Album, Track, last_segment};

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn non_empty(v: Option<std::borrow::Cow<'_, str>>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Read tag metadata for `path`. Files lofty cannot parse keep a bare reference.
fn read_track(path: &Path) -> Track {
    let mut track = Track::from_path(path);

    if let Ok(tagged) = lofty::read_from_path(path) {
        let duration = tagged.properties().duration();
        if !duration.is_zero() {
            track.duration = Some(duration);
        }

        if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
            track.title = non_empty(tag.title());
            track.artist = non_empty(tag.artist());
            track.album = non_empty(tag.album());
        }
    }

    track
}

fn find_cover(dir: &Path, settings: &LibrarySettings) -> Option<PathBuf> {
    let wanted: Vec<String> = settings
        .cover_names
        .iter()
        .map(|n| n.trim().to_ascii_lowercase())
        .collect();

    let mut candidates: Vec<PathBuf> = fs::read_dir(dir)
        .ok()?
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.file_name()
                .and_then(|s| s.to_str())
                .map(|n| wanted.contains(&n.to_ascii_lowercase()))
                .unwrap_or(false)
        })
        .collect();

    // Prefer the earliest name in the configured list.
    candidates.sort_by_key(|p| {
        let n = last_segment(p).to_ascii_lowercase();
        wanted.iter().position(|w| *w == n).unwrap_or(usize::MAX)
    });
    candidates.into_iter().next()
}

fn build_album(
    root: &Path,
    dir: PathBuf,
    mut tracks: Vec<Track>,
    settings: &LibrarySettings,
) -> Album {
    tracks.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

    let title = tracks
        .iter()
        .find_map(|t| t.album.clone())
        .unwrap_or_else(|| last_segment(&dir));

    // Tags win; otherwise an `Artist/Album/` layout names the artist.
    let artist = tracks.iter().find_map(|t| t.artist.clone()).or_else(|| {
        dir.parent()
            .filter(|p| dir != root && *p != root && p.starts_with(root))
            .map(last_segment)
    });

    let cover = find_cover(&dir, settings);

    Album {
        path: dir,
        title,
        artist,
        cover,
        tracks,
    }
}

/// Scan `dir` for audio files and group them into albums, one per folder.
///
/// Albums are ordered by artist then title (case-insensitive); tracks within
/// an album are ordered by file name.
pub fn scan_library(dir: &Path, settings: &LibrarySettings) -> Vec<Album> {
    let mut by_dir: BTreeMap<PathBuf, Vec<Track>> = BTreeMap::new();

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);
    if let Some(d) = settings.max_depth {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if path.is_file() && is_audio_file(path, settings) {
            let parent = path.parent().unwrap_or(dir).to_path_buf();
            by_dir.entry(parent).or_default().push(read_track(path));
        }
    }

    let mut albums: Vec<Album> = by_dir
        .into_iter()
        .map(|(d, tracks)| build_album(dir, d, tracks, settings))
        .collect();

    albums.sort_by(|a, b| {
        let ka = (
            a.artist.as_deref().unwrap_or("").to_lowercase(),
            a.title.to_lowercase(),
        );
        let kb = (
            b.artist.as_deref().unwrap_or("").to_lowercase(),
            b.title.to_lowercase(),
        );
        ka.cmp(&kb)
    });

    log::info!("scanned {} albums under {}", albums.len(), dir.display());
    albums
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn is_audio_file_matches_configured_extensions_case_insensitive() {
        let settings = LibrarySettings::default();
        assert!(is_audio_file(Path::new("/tmp/a.mp3"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.MP3"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.flac"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.m4a"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a.txt"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a"), &settings));
    }

    #[test]
    fn scan_groups_files_by_folder_and_orders_tracks_by_name() {
        let dir = tempdir().unwrap();
        let album = dir.path().join("Artist").join("Record");
        fs::create_dir_all(&album).unwrap();
        fs::write(album.join("02 b.mp3"), b"not a real mp3").unwrap();
        fs::write(album.join("01 a.MP3"), b"not a real mp3").unwrap();
        fs::write(album.join("notes.txt"), b"ignore me").unwrap();

        let albums = scan_library(dir.path(), &LibrarySettings::default());
        assert_eq!(albums.len(), 1);
        let a = &albums[0];
        assert_eq!(a.title, "Record");
        assert_eq!(a.artist.as_deref(), Some("Artist"));
        let names: Vec<&str> = a.tracks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["01 a.MP3", "02 b.mp3"]);
    }

    #[test]
    fn album_directly_under_root_has_no_artist() {
        let dir = tempdir().unwrap();
        let album = dir.path().join("Loose");
        fs::create_dir_all(&album).unwrap();
        fs::write(album.join("x.ogg"), b"not real").unwrap();

        let albums = scan_library(dir.path(), &LibrarySettings::default());
        assert_eq!(albums.len(), 1);
        assert_eq!(albums[0].artist, None);
        assert_eq!(albums[0].display(), "Loose");
    }

    #[test]
    fn albums_sort_by_artist_then_title() {
        let dir = tempdir().unwrap();
        for (artist, title) in [("zed", "One"), ("Abba", "Two"), ("abba", "Arrival")] {
            let d = dir.path().join(artist).join(title);
            fs::create_dir_all(&d).unwrap();
            fs::write(d.join("t.flac"), b"not real").unwrap();
        }

        let albums = scan_library(dir.path(), &LibrarySettings::default());
        let titles: Vec<&str> = albums.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Arrival", "Two", "One"]);
    }

    #[test]
    fn scan_skips_hidden_entries_unless_enabled() {
        let dir = tempdir().unwrap();
        let hidden = dir.path().join(".cache");
        fs::create_dir_all(&hidden).unwrap();
        fs::write(hidden.join("a.mp3"), b"not real").unwrap();
        fs::write(dir.path().join(".b.mp3"), b"not real").unwrap();

        let albums = scan_library(dir.path(), &LibrarySettings::default());
        assert!(albums.is_empty());

        let settings = LibrarySettings {
            include_hidden: true,
            ..LibrarySettings::default()
        };
        let albums = scan_library(dir.path(), &settings);
        let total: usize = albums.iter().map(|a| a.tracks.len()).sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn scan_respects_max_depth() {
        let dir = tempdir().unwrap();
        let d1 = dir.path().join("d1");
        let d2 = d1.join("d2");
        fs::create_dir_all(&d2).unwrap();
        fs::write(d1.join("one.mp3"), b"not real").unwrap();
        fs::write(d2.join("two.mp3"), b"not real").unwrap();

        // WalkDir counts the root as depth 0.
        let settings = LibrarySettings {
            max_depth: Some(2),
            ..LibrarySettings::default()
        };
        let albums = scan_library(dir.path(), &settings);
        assert_eq!(albums.len(), 1);
        assert_eq!(albums[0].title, "d1");
    }

    #[test]
    fn cover_lookup_is_case_insensitive_and_follows_configured_order() {
        let dir = tempdir().unwrap();
        let album = dir.path().join("A");
        fs::create_dir_all(&album).unwrap();
        fs::write(album.join("t.mp3"), b"not real").unwrap();
        fs::write(album.join("Folder.JPG"), b"img").unwrap();
        fs::write(album.join("cover.png"), b"img").unwrap();

        let settings = LibrarySettings {
            cover_names: vec!["cover.png".into(), "folder.jpg".into()],
            ..LibrarySettings::default()
        };
        let albums = scan_library(dir.path(), &settings);
        assert_eq!(albums[0].cover.as_deref(), Some(album.join("cover.png").as_path()));
    }
}
