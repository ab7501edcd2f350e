use axum::{extract::State, response::IntoResponse};

use crate::analytics;
use crate::auth::AuthUser;
use crate::db::store;
use crate::error::Result;
use crate::routes::envelope;
use crate::AppState;

/// Dashboard totals for the current user
pub async fn dashboard_summary(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse> {
    let db = state.db.clone();
    let records =
        tokio::task::spawn_blocking(move || store::records_for_user(&db, &user.id)).await??;

    Ok(envelope(
        analytics::summarize(&records),
        "Fetched Dashboard Summary",
    ))
}

/// Percentage breakdowns and per-day classification counts
pub async fn dashboard_analytics(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse> {
    let db = state.db.clone();
    let records =
        tokio::task::spawn_blocking(move || store::records_for_user(&db, &user.id)).await??;

    Ok(envelope(
        analytics::analytics(&records),
        "Fetched Dashboard Analytics",
    ))
}
