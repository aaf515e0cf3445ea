use crate::models::Track;
use std::collections::{BTreeMap, HashSet};

/// Metadata about the playlist composition
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistMetadata {
    pub total_songs: usize,
    pub total_duration: u32, // in seconds, tracks with unknown length excluded
    pub unknown_durations: usize,
    pub mood_distribution: BTreeMap<String, usize>,
    pub artist_count: usize,
}

impl PlaylistMetadata {
    pub fn from_tracks(tracks: &[Track]) -> Self {
        let mut mood_distribution = BTreeMap::new();
        let mut artists = HashSet::new();
        let mut total_duration = 0;
        let mut unknown_durations = 0;

        for track in tracks {
            *mood_distribution.entry(track.mood.clone()).or_insert(0) += 1;
            artists.insert(track.artist.to_lowercase());
            match track.duration_seconds() {
                Some(seconds) => total_duration += seconds,
                None => unknown_durations += 1,
            }
        }

        Self {
            total_songs: tracks.len(),
            total_duration,
            unknown_durations,
            mood_distribution,
            artist_count: artists.len(),
        }
    }

    /// Compact "Happy 12, Sad 8" description for log lines
    pub fn distribution_summary(&self) -> String {
        self.mood_distribution
            .iter()
            .map(|(mood, count)| format!("{mood} {count}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(mood: &str, artist: &str, duration: &str) -> Track {
        Track {
            artist: artist.to_string(),
            duration: duration.to_string(),
            mood: mood.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_metadata_counts_moods_artists_and_duration() {
        let tracks = vec![
            track("Happy", "Artist A", "3:00"),
            track("Happy", "artist a", "2:30"),
            track("Sad", "Artist B", "Unknown"),
        ];

        let metadata = PlaylistMetadata::from_tracks(&tracks);
        assert_eq!(metadata.total_songs, 3);
        assert_eq!(metadata.total_duration, 330);
        assert_eq!(metadata.unknown_durations, 1);
        assert_eq!(metadata.artist_count, 2);
        assert_eq!(metadata.distribution_summary(), "Happy 2, Sad 1");
    }

    #[test]
    fn test_metadata_for_empty_playlist() {
        let metadata = PlaylistMetadata::from_tracks(&[]);
        assert_eq!(metadata.total_songs, 0);
        assert_eq!(metadata.total_duration, 0);
        assert!(metadata.mood_distribution.is_empty());
        assert_eq!(metadata.distribution_summary(), "");
    }
}
