//! Local song library: one folder per mood under the songs directory,
//! e.g. `songs/happy/*.mp3`, `songs/chill/*.wav`.

use crate::models::Track;
use crate::playlist::filters::TrackFilters;
use crate::playlist::utils::{ToTitleCase, format_duration};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use lofty::prelude::*;
use lofty::probe::Probe;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use urlencoding::encode;

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Mood not found: {0}")]
    MoodNotFound(String),
    #[error("Error reading songs in {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where playlist tracks come from
#[cfg_attr(test, mockall::automock)]
pub trait TrackSource: Send + Sync {
    /// Mood names that have at least one playable file
    fn available_moods(&self) -> Result<Vec<String>, LibraryError>;

    /// Audio files available for a mood, sorted by file name
    fn list_tracks(&self, mood: &str) -> Result<Vec<PathBuf>, LibraryError>;

    /// Build the track record for one file. Never fails: unreadable tags
    /// fall back to the file name.
    fn load_track(&self, mood: &str, path: &Path) -> Track;
}

/// Tags read from an audio file
#[derive(Debug, Default)]
struct TagInfo {
    title: Option<String>,
    artist: Option<String>,
    duration: Option<Duration>,
    cover_art: Option<String>,
}

/// Track source backed by folders on disk
pub struct FsTrackSource {
    songs_dir: PathBuf,
    public_base_url: String,
}

impl FsTrackSource {
    pub fn new(songs_dir: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            songs_dir: songs_dir.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Resolve a mood to its folder name and path
    fn mood_dir(&self, mood: &str) -> Result<(String, PathBuf), LibraryError> {
        let folder = TrackFilters::mood_folder(mood)
            .ok_or_else(|| LibraryError::MoodNotFound(mood.to_string()))?;
        let path = self.songs_dir.join(&folder);
        if !path.is_dir() {
            return Err(LibraryError::MoodNotFound(mood.to_string()));
        }
        Ok((folder, path))
    }

    fn audio_files(dir: &Path) -> Result<Vec<PathBuf>, LibraryError> {
        let entries = std::fs::read_dir(dir).map_err(|source| LibraryError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && TrackFilters::is_audio_file(path))
            .collect();
        files.sort();
        Ok(files)
    }

    /// Public URL the browser plays the file from
    fn public_url(&self, folder: &str, file_name: &str) -> String {
        format!(
            "{}/songs/{}/{}",
            self.public_base_url,
            encode(folder),
            encode(file_name)
        )
    }

    fn read_tags(path: &Path) -> Result<TagInfo, String> {
        let tagged_file = Probe::open(path)
            .map_err(|e| e.to_string())?
            .read()
            .map_err(|e| e.to_string())?;

        let duration = tagged_file.properties().duration();
        let mut info = TagInfo {
            duration: Some(duration),
            ..Default::default()
        };

        if let Some(tag) = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) {
            info.title = tag.title().map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
            info.artist = tag.artist().map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
            info.cover_art = tag.pictures().first().map(|picture| {
                let mime = picture
                    .mime_type()
                    .map(|mime| mime.as_str().to_string())
                    .unwrap_or_else(|| "image/jpeg".to_string());
                format!("data:{};base64,{}", mime, STANDARD.encode(picture.data()))
            });
        }

        Ok(info)
    }
}

impl TrackSource for FsTrackSource {
    fn available_moods(&self) -> Result<Vec<String>, LibraryError> {
        let entries = std::fs::read_dir(&self.songs_dir).map_err(|source| LibraryError::Io {
            path: self.songs_dir.clone(),
            source,
        })?;

        let mut moods: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .filter(|path| {
                Self::audio_files(path)
                    .map(|files| !files.is_empty())
                    .unwrap_or(false)
            })
            .filter_map(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .map(|name| name.to_title_case())
            })
            .collect();

        moods.sort();
        moods.dedup();
        Ok(moods)
    }

    fn list_tracks(&self, mood: &str) -> Result<Vec<PathBuf>, LibraryError> {
        let (_, dir) = self.mood_dir(mood)?;
        Self::audio_files(&dir)
    }

    fn load_track(&self, mood: &str, path: &Path) -> Track {
        let folder = TrackFilters::mood_folder(mood).unwrap_or_default();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| file_name.clone());

        let tags = match Self::read_tags(path) {
            Ok(tags) => {
                tracing::debug!(
                    file = %path.display(),
                    title = ?tags.title,
                    artist = ?tags.artist,
                    "Read track tags"
                );
                tags
            }
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "Error reading metadata, using file name");
                TagInfo::default()
            }
        };

        Track {
            id: format!("{:x}", md5::compute(format!("{folder}/{file_name}"))),
            title: tags.title.unwrap_or(stem),
            artist: tags.artist.unwrap_or_else(|| "Unknown Artist".to_string()),
            duration: format_duration(tags.duration),
            cover_art: tags.cover_art,
            file_path: self.public_url(&folder, &file_name),
            mood: mood.trim().to_string(),
        }
    }
}
