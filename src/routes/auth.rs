use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{hash_password, issue_token, verify_password, AuthUser};
use crate::constants::{ERR_BAD_CREDENTIALS, ERR_MISSING_FIELDS};
use crate::db::store;
use crate::error::{AppError, Result};
use crate::models::{User, UserRecord};
use crate::routes::envelope;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Register a new user
///
/// Email is stored trimmed and lowercased and must be unique; the password
/// is stored only as an Argon2 hash. Returns 409 for a duplicate email.
pub async fn register_user(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload.map_err(bad_json)?;

    let username = payload
        .username
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation(ERR_MISSING_FIELDS.to_string()))?
        .to_string();

    let email = payload
        .email
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation(ERR_MISSING_FIELDS.to_string()))?;

    if !email.contains('@') {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }

    let password = payload
        .password
        .clone()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation(ERR_MISSING_FIELDS.to_string()))?;

    if password.len() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    let id = Uuid::new_v4().to_string();
    let db = state.db.clone();

    // Argon2 hashing is CPU-heavy; keep it off the async runtime together
    // with the insert.
    let record = {
        let id = id.clone();
        tokio::task::spawn_blocking(move || -> Result<UserRecord> {
            let now = Utc::now().timestamp();
            let record = UserRecord {
                username,
                email,
                password_hash: hash_password(&password)?,
                is_active: true,
                created_at: now,
                updated_at: now,
            };
            store::insert_user(&db, &id, &record)?;
            Ok(record)
        })
        .await??
    };

    tracing::info!("New user registered: {}", id);

    Ok((
        StatusCode::CREATED,
        envelope(
            json!({
                "id": id,
                "username": record.username,
                "email": record.email,
            }),
            "User created",
        ),
    ))
}

/// Log in with email and password, returning a bearer token
///
/// Unknown email, wrong password and deactivated accounts all produce the
/// same 401 message.
pub async fn login_user(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload.map_err(bad_json)?;

    let email = payload
        .email
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation(ERR_MISSING_FIELDS.to_string()))?;

    let password = payload
        .password
        .clone()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation(ERR_MISSING_FIELDS.to_string()))?;

    let db = state.db.clone();
    let (id, record) = tokio::task::spawn_blocking(move || -> Result<(String, UserRecord)> {
        let (id, record) = store::find_user_by_email(&db, &email)?
            .ok_or_else(|| AppError::Authentication(ERR_BAD_CREDENTIALS.to_string()))?;

        if !record.is_active || !verify_password(&password, &record.password_hash)? {
            return Err(AppError::Authentication(ERR_BAD_CREDENTIALS.to_string()));
        }

        Ok((id, record))
    })
    .await??;

    let token = issue_token(
        &id,
        &record.username,
        &state.config.jwt_secret,
        state.config.jwt_expires_in_hours,
    )?;

    Ok(envelope(token, "Logged in!"))
}

/// Current user's profile, folded together with their impact summary
pub async fn me(State(state): State<AppState>, user: AuthUser) -> Result<impl IntoResponse> {
    let db = state.db.clone();
    let user_id = user.id.clone();

    let (record, records) = tokio::task::spawn_blocking(
        move || -> Result<(UserRecord, Vec<crate::models::WasteRecord>)> {
            let record = store::get_user(&db, &user_id)?
                .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
            let records = store::records_for_user(&db, &user_id)?;
            Ok((record, records))
        },
    )
    .await??;

    let profile = User::from_record(&user.id, &record);
    let impact = crate::analytics::summarize(&records);

    Ok(envelope(
        json!({
            "user": profile,
            "impact": impact,
        }),
        "Fetched profile",
    ))
}

fn bad_json(rejection: JsonRejection) -> AppError {
    tracing::debug!("Rejected request body: {}", rejection);
    AppError::Validation("Invalid JSON format. Please check your request body.".to_string())
}
