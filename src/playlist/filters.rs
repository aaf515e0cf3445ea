use std::path::Path;

/// Extensions served as playable audio
pub const AUDIO_EXTENSIONS: [&str; 2] = ["mp3", "wav"];

/// Track file filtering using static helper functions
pub struct TrackFilters;

impl TrackFilters {
    /// Check if a directory entry looks like a playable audio file
    pub fn is_audio_file(path: &Path) -> bool {
        let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
            return false;
        };

        // Hidden files and editor/OS leftovers (".DS_Store", "._track.mp3")
        if file_name.starts_with('.') {
            return false;
        }

        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                AUDIO_EXTENSIONS
                    .iter()
                    .any(|allowed| ext.eq_ignore_ascii_case(allowed))
            })
            .unwrap_or(false)
    }

    /// Normalize a user supplied mood to its folder name.
    /// Returns None for anything that could escape the songs directory.
    pub fn mood_folder(mood: &str) -> Option<String> {
        let folder = mood.trim().to_lowercase();
        let is_safe = !folder.is_empty()
            && folder != "."
            && folder != ".."
            && !folder.contains(['/', '\\'])
            && !folder.contains('\0');
        is_safe.then_some(folder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_mp3_and_wav() {
        assert!(TrackFilters::is_audio_file(Path::new("songs/happy/Sunny.mp3")));
        assert!(TrackFilters::is_audio_file(Path::new("songs/happy/Loud.WAV")));
        assert!(TrackFilters::is_audio_file(Path::new("track.Mp3")));
    }

    #[test]
    fn test_rejects_other_files() {
        assert!(!TrackFilters::is_audio_file(Path::new("cover.jpg")));
        assert!(!TrackFilters::is_audio_file(Path::new("notes.txt")));
        assert!(!TrackFilters::is_audio_file(Path::new("mp3")));
        assert!(!TrackFilters::is_audio_file(Path::new(".hidden.mp3")));
        assert!(!TrackFilters::is_audio_file(Path::new("._Sunny.mp3")));
    }

    #[test]
    fn test_mood_folder_normalization() {
        assert_eq!(TrackFilters::mood_folder("Happy"), Some("happy".to_string()));
        assert_eq!(TrackFilters::mood_folder("  Chill "), Some("chill".to_string()));
        assert_eq!(TrackFilters::mood_folder(""), None);
        assert_eq!(TrackFilters::mood_folder(".."), None);
        assert_eq!(TrackFilters::mood_folder("../etc"), None);
        assert_eq!(TrackFilters::mood_folder("a\\b"), None);
    }
}
