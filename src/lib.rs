//! Mood playlist generator: builds playlists from a local song library by
//! mood, by a weighted mix of moods, or from a free-text mood description.

pub mod analysis;
pub mod client;
pub mod config;
pub mod error;
pub mod library;
pub mod models;
pub mod playlist;
pub mod server;
