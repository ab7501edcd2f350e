use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::AppState;

/// Liveness/readiness probe
///
/// Reports whether the record store accepts reads and whether the audio
/// artifact directory is reachable, alongside the loaded rule count. A
/// missing audio directory degrades the report but does not mark the
/// service unhealthy; it is recreated on the next synthesis.
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let db = state.db.clone();
    let store_status = tokio::task::spawn_blocking(move || match db.begin_read() {
        Ok(_) => "connected",
        Err(e) => {
            tracing::error!("Store read probe failed: {:?}", e);
            "disconnected"
        }
    })
    .await
    .unwrap_or("error");

    let audio_dir_status = match tokio::fs::metadata(&state.config.audio_dir).await {
        Ok(m) if m.is_dir() => "present",
        _ => "missing",
    };

    Json(json!({
        "status": if store_status == "connected" { "healthy" } else { "unhealthy" },
        "database": store_status,
        "audioDir": audio_dir_status,
        "rulesLoaded": state.rules.len(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
