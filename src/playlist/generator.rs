use super::allocator::{AllocationError, MoodWeights, allocate};
use super::metadata::PlaylistMetadata;
use crate::library::{LibraryError, TrackSource};
use crate::models::Track;
use rand::Rng;
use rand::seq::SliceRandom;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlaylistError {
    #[error(transparent)]
    InvalidArgument(#[from] AllocationError),
    #[error(transparent)]
    Library(#[from] LibraryError),
    #[error("No tracks requested: every mood weight is zero")]
    EmptyMix,
}

/// Main playlist generator
pub struct PlaylistGenerator {
    source: Arc<dyn TrackSource>,
    playlist_size: usize,
}

impl PlaylistGenerator {
    pub fn new(source: Arc<dyn TrackSource>, playlist_size: usize) -> Self {
        Self {
            source,
            playlist_size,
        }
    }

    /// Generate a playlist from a single mood
    pub fn generate_single<R: Rng + ?Sized>(
        &self,
        mood: &str,
        rng: &mut R,
    ) -> Result<Vec<Track>, PlaylistError> {
        let weights = MoodWeights::single(mood)?;
        self.generate(&weights, rng)
    }

    /// Generate a playlist from a weighted mix of moods.
    ///
    /// The playlist size is split across moods by [`allocate`], each mood
    /// contributes a random sample of its tracks, and the result is shuffled.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        weights: &MoodWeights,
        rng: &mut R,
    ) -> Result<Vec<Track>, PlaylistError> {
        let allocation = allocate(weights, self.playlist_size);
        if allocation.is_empty() {
            return Err(PlaylistError::EmptyMix);
        }

        let mut tracks = Vec::with_capacity(allocation.total());
        for (mood, count) in allocation.non_zero() {
            let files = self.source.list_tracks(mood)?;
            if files.len() < count {
                tracing::warn!(
                    mood,
                    requested = count,
                    available = files.len(),
                    "Not enough tracks for mood, using all of them"
                );
            }

            tracks.extend(
                files
                    .choose_multiple(rng, count)
                    .map(|path| self.source.load_track(mood, path)),
            );
        }

        tracks.shuffle(rng);

        let metadata = PlaylistMetadata::from_tracks(&tracks);
        tracing::info!(
            songs = metadata.total_songs,
            requested = self.playlist_size,
            artists = metadata.artist_count,
            duration_secs = metadata.total_duration,
            unknown_durations = metadata.unknown_durations,
            moods = %metadata.distribution_summary(),
            "Generated playlist"
        );

        Ok(tracks)
    }
}
