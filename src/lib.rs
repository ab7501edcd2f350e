pub mod analytics;
pub mod auth;
pub mod classifier;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod tts;

pub use config::Config;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::services::ServeDir;

use crate::auth::auth_middleware;
use crate::classifier::{ImageClassifier, OpenAiClassifier, RuleTable};
use crate::constants::MAX_UPLOAD_SIZE_BYTES;
use crate::db::Db;
use crate::tts::{GoogleTranslateTts, SpeechSynthesizer};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub config: Config,
    pub rules: Arc<RuleTable>,
    pub ai: Arc<dyn ImageClassifier>,
    pub tts: Arc<dyn SpeechSynthesizer>,
}

impl AppState {
    /// Build the state with the production adapters
    pub fn new(db: Db, config: Config) -> Self {
        let ai = Arc::new(OpenAiClassifier::new(
            config.openai_api_key.clone(),
            config.ai_model.clone(),
            config.ai_confidence_threshold,
        ));
        let tts = Arc::new(GoogleTranslateTts::new(config.audio_dir.clone()));

        Self::with_adapters(db, config, ai, tts)
    }

    /// Build the state with explicit adapters (tests swap in stubs here)
    pub fn with_adapters(
        db: Db,
        config: Config,
        ai: Arc<dyn ImageClassifier>,
        tts: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        Self {
            db,
            config,
            rules: Arc::new(RuleTable::with_builtin_rules()),
            ai,
            tts,
        }
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/auth/me", get(routes::me))
        .route("/api/waste/create", post(routes::create_waste))
        .route("/api/waste/classify-text", post(routes::classify_text))
        .route("/api/waste/classify-image", post(routes::classify_image))
        .route("/api/waste/history", get(routes::waste_history))
        .route("/api/dashboard/summary", get(routes::dashboard_summary))
        .route("/api/dashboard/analytics", get(routes::dashboard_analytics))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::health_check))
        .route("/api/auth/register", post(routes::register_user))
        .route("/api/auth/login", post(routes::login_user))
        .merge(protected)
        .nest_service("/audio", ServeDir::new(&state.config.audio_dir))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE_BYTES))
        .with_state(state)
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "data": null,
            "message": "Route not found",
        })),
    )
}
