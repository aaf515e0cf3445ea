use anyhow::Result;
use clap::Parser;
use mood_playlist_generator::analysis::{MoodAnalyzer, MoodPromptAnalyzer};
use mood_playlist_generator::client::LlmClient;
use mood_playlist_generator::config::{Overrides, load_config};
use mood_playlist_generator::library::{FsTrackSource, TrackSource};
use mood_playlist_generator::server::{AppState, build_router};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "mood-playlist-generator")]
#[command(about = "Mood based playlist server for a local song library")]
#[command(version)]
struct Args {
    /// Directory holding one folder of songs per mood (overrides SONGS_DIR)
    #[arg(short = 's', long = "songs-dir")]
    songs_dir: Option<PathBuf>,

    /// Address to bind (overrides HOST)
    #[arg(long = "host")]
    host: Option<String>,

    /// Port to listen on (overrides PORT)
    #[arg(short = 'p', long = "port")]
    port: Option<u16>,

    /// Base URL browsers use to reach this server (overrides PUBLIC_BASE_URL)
    #[arg(long = "public-base-url")]
    public_base_url: Option<String>,

    /// Number of tracks per generated playlist (overrides PLAYLIST_SIZE)
    #[arg(short = 'n', long = "playlist-size")]
    playlist_size: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    // Load configuration from .env, then apply command line overrides
    let config = load_config()?.with_overrides(Overrides {
        songs_dir: args.songs_dir,
        host: args.host,
        port: args.port,
        public_base_url: args.public_base_url,
        playlist_size: args.playlist_size,
    })?;

    info!(
        "Starting {} v{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    if !config.songs_dir.is_dir() {
        error!(
            "Songs directory '{}' not found. Set SONGS_DIR or pass --songs-dir.",
            config.songs_dir.display()
        );
        return Err(anyhow::anyhow!(
            "Songs directory '{}' not found",
            config.songs_dir.display()
        ));
    }

    let library: Arc<dyn TrackSource> = Arc::new(FsTrackSource::new(
        &config.songs_dir,
        &config.public_base_url(),
    ));
    match library.available_moods() {
        Ok(moods) if moods.is_empty() => warn!(
            songs_dir = %config.songs_dir.display(),
            "No mood folders with .mp3 or .wav files found"
        ),
        Ok(moods) => info!(moods = ?moods, "Found mood folders"),
        Err(e) => warn!(error = %e, "Could not list mood folders"),
    }

    let analyzer = match config.llm.clone() {
        Some(llm) => {
            info!(model = %llm.model, url = %llm.api_url, "Mood prompts go to the language model");
            let model: Arc<dyn MoodAnalyzer> = Arc::new(LlmClient::new(llm));
            MoodPromptAnalyzer::new(Some(model))
        }
        None => {
            info!("LLM_API_KEY not set, mood prompts use keyword matching");
            MoodPromptAnalyzer::keywords_only()
        }
    };

    let state = AppState::new(library, analyzer, config.playlist_size);
    let app = build_router(state, &config.songs_dir);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    info!(
        playlist_size = config.playlist_size,
        "Server running on {} (listening on {})",
        config.public_base_url(),
        config.bind_address()
    );

    axum::serve(listener, app).await?;

    Ok(())
}
