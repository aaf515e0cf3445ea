//! HTTP API for the frontend plus static serving of the song files

use crate::analysis::MoodPromptAnalyzer;
use crate::error::ApiError;
use crate::library::TrackSource;
use crate::models::{AnalyzePromptRequest, HealthResponse, MoodQuery, Track};
use crate::playlist::{MoodWeights, PlaylistGenerator};
use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    routing::{get, post},
};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub library: Arc<dyn TrackSource>,
    pub generator: Arc<PlaylistGenerator>,
    pub analyzer: Arc<MoodPromptAnalyzer>,
}

impl AppState {
    pub fn new(
        library: Arc<dyn TrackSource>,
        analyzer: MoodPromptAnalyzer,
        playlist_size: usize,
    ) -> Self {
        Self {
            generator: Arc::new(PlaylistGenerator::new(library.clone(), playlist_size)),
            library,
            analyzer: Arc::new(analyzer),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState, songs_dir: &Path) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/moods", get(list_moods))
        .route("/api/generate-playlist", get(generate_playlist))
        .route("/api/generate-mixed-playlist", post(generate_mixed_playlist))
        .route("/api/analyze-mood-prompt", post(analyze_mood_prompt))
        .nest_service("/songs", ServeDir::new(songs_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /api/moods
async fn list_moods(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    let library = state.library.clone();
    let moods = tokio::task::spawn_blocking(move || library.available_moods()).await??;
    Ok(Json(moods))
}

/// GET /api/generate-playlist?mood=Happy
async fn generate_playlist(
    State(state): State<AppState>,
    Query(query): Query<MoodQuery>,
) -> Result<Json<Vec<Track>>, ApiError> {
    let mood = query
        .mood
        .map(|mood| mood.trim().to_string())
        .filter(|mood| !mood.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Mood parameter is required".to_string()))?;

    tracing::info!(mood = %mood, "Generating single mood playlist");
    let generator = state.generator.clone();
    let tracks = tokio::task::spawn_blocking(move || {
        generator.generate_single(&mood, &mut rand::thread_rng())
    })
    .await??;

    Ok(Json(tracks))
}

/// POST /api/generate-mixed-playlist with a body like `{"Happy": 60, "Chill": 40}`
async fn generate_mixed_playlist(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Vec<Track>>, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let weights = MoodWeights::from_json(&body)?;

    tracing::info!(weights = ?weights, "Generating mixed playlist");
    let generator = state.generator.clone();
    let tracks = tokio::task::spawn_blocking(move || {
        generator.generate(&weights, &mut rand::thread_rng())
    })
    .await??;

    Ok(Json(tracks))
}

/// POST /api/analyze-mood-prompt with `{"prompt": "..."}`
async fn analyze_mood_prompt(
    State(state): State<AppState>,
    body: Result<Json<AnalyzePromptRequest>, JsonRejection>,
) -> Result<Json<MoodWeights>, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let prompt = request.prompt.trim().to_string();
    if prompt.is_empty() {
        return Err(ApiError::BadRequest("Prompt is required".to_string()));
    }

    let analyzer = state.analyzer.clone();
    let weights = tokio::task::spawn_blocking(move || analyzer.analyze(&prompt)).await?;
    Ok(Json(weights))
}
