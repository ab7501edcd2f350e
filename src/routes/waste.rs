use axum::{
    extract::{rejection::JsonRejection, Multipart, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::path::PathBuf;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::classifier::{AiClassification, ClassificationOutcome};
use crate::constants::{DEFAULT_HISTORY_LIMIT, ERR_MISSING_FIELDS, MAX_HISTORY_LIMIT};
use crate::db::store;
use crate::error::{AppError, Result};
use crate::models::{BinColor, InputType, Source, WasteRecord, WasteRecordResponse, WasteType};
use crate::routes::envelope;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateWasteRequest {
    pub wastename: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

/// Create a waste record from a text item name (rule-based path)
pub async fn create_waste(
    State(state): State<AppState>,
    user: AuthUser,
    payload: std::result::Result<Json<CreateWasteRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload.map_err(|_| {
        AppError::Validation("Invalid JSON format. Please check your request body.".to_string())
    })?;

    let wastename = payload
        .wastename
        .as_deref()
        .ok_or_else(|| AppError::Validation(ERR_MISSING_FIELDS.to_string()))?;

    let classification = state.rules.classify(wastename)?;

    let now = Utc::now().timestamp();
    let record = WasteRecord {
        id: Uuid::new_v4().to_string(),
        user_id: user.id,
        input_type: InputType::Text,
        input_value: classification.item_name.clone(),
        item_name: classification.item_name.clone(),
        waste_type: classification.waste_type,
        bin_color: classification.bin_color,
        suggestion: classification.suggestion.clone(),
        source: Source::RuleBased,
        audio_url: None,
        created_at: now,
        updated_at: now,
    };

    let db = state.db.clone();
    let stored = record.clone();
    tokio::task::spawn_blocking(move || store::insert_waste_record(&db, &stored)).await??;

    Ok((
        StatusCode::CREATED,
        envelope(WasteRecordResponse::from(&record), "Waste Record Created!"),
    ))
}

/// Classify a text item name without persisting anything (preview)
pub async fn classify_text(
    State(state): State<AppState>,
    _user: AuthUser,
    payload: std::result::Result<Json<CreateWasteRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload.map_err(|_| {
        AppError::Validation("Invalid JSON format. Please check your request body.".to_string())
    })?;

    let wastename = payload
        .wastename
        .as_deref()
        .ok_or_else(|| AppError::Validation(ERR_MISSING_FIELDS.to_string()))?;

    let classification = state.rules.classify(wastename)?;

    Ok(envelope(classification, "Classified"))
}

/// Classify an uploaded image through the AI adapter (multipart field "image")
///
/// Pipeline: store upload -> classify -> best-effort TTS -> persist ->
/// unconditional upload cleanup. A model rejection returns 400 and persists
/// nothing; a TTS failure degrades to `audioUrl: null`.
pub async fn classify_image(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> Result<Response> {
    let upload = read_image_field(multipart).await?;
    let upload_path = save_upload(&state, &upload).await?;

    let result = process_image(&state, &user, &upload).await;

    // Temp-file cleanup is unconditional; a failure here must not override
    // the classification result.
    if let Err(e) = tokio::fs::remove_file(&upload_path).await {
        tracing::warn!("Failed to delete uploaded file {:?}: {}", upload_path, e);
    }

    result
}

/// Paginated classification history for the current user, newest first
pub async fn waste_history(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<HistoryParams>,
) -> Result<impl IntoResponse> {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);

    let db = state.db.clone();
    let user_id = user.id.clone();
    let records =
        tokio::task::spawn_blocking(move || store::records_for_user(&db, &user_id)).await??;

    let total = records.len();
    let pages = total.div_ceil(limit);

    // page comes straight from the query string; keep the offset math
    // overflow-safe for absurd page numbers
    let offset = (page - 1).saturating_mul(limit);
    let history: Vec<WasteRecordResponse> = records
        .iter()
        .skip(offset)
        .take(limit)
        .map(WasteRecordResponse::from)
        .collect();

    Ok(envelope(
        json!({
            "history": history,
            "pagination": {
                "page": page,
                "limit": limit,
                "total": total,
                "pages": pages,
            },
        }),
        "Fetched Waste History",
    ))
}

/// An image upload buffered out of the multipart body
struct ImageUpload {
    filename: String,
    content_type: String,
    bytes: Vec<u8>,
}

/// Pull the "image" field out of the multipart body
async fn read_image_field(mut multipart: Multipart) -> Result<ImageUpload> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let content_type = field
            .content_type()
            .unwrap_or("image/jpeg")
            .to_string();

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {}", e)))?
            .to_vec();

        if bytes.is_empty() {
            return Err(AppError::Validation("Uploaded file is empty".to_string()));
        }

        let filename = format!(
            "upload_{}{}",
            Uuid::new_v4().simple(),
            extension_for(&content_type)
        );

        return Ok(ImageUpload {
            filename,
            content_type,
            bytes,
        });
    }

    Err(AppError::Validation("No file uploaded".to_string()))
}

/// Write the upload to the upload directory, returning its path
async fn save_upload(state: &AppState, upload: &ImageUpload) -> Result<PathBuf> {
    let dir = PathBuf::from(&state.config.upload_dir);
    tokio::fs::create_dir_all(&dir).await?;

    let path = dir.join(&upload.filename);
    tokio::fs::write(&path, &upload.bytes).await?;

    Ok(path)
}

/// Classify, synthesize and persist; the caller owns upload cleanup
async fn process_image(state: &AppState, user: &AuthUser, upload: &ImageUpload) -> Result<Response> {
    let outcome = state
        .ai
        .classify(&upload.bytes, &upload.content_type)
        .await?;

    let classification = match outcome {
        ClassificationOutcome::Rejected { reason } => {
            tracing::info!("AI rejected image as non-waste: {}", reason);
            let body = Json(json!({
                "success": false,
                "data": { "isWaste": false, "reason": reason },
                "message": "The image does not appear to contain a waste item",
            }));
            return Ok((StatusCode::BAD_REQUEST, body).into_response());
        }
        ClassificationOutcome::Classified(c) => c,
    };

    let audio_url = synthesize_announcement(state, &classification).await;

    let now = Utc::now().timestamp();
    let record = WasteRecord {
        id: Uuid::new_v4().to_string(),
        user_id: user.id.clone(),
        input_type: InputType::Image,
        input_value: upload.filename.clone(),
        item_name: classification.item_name.clone(),
        waste_type: WasteType::from_label(&classification.waste_type),
        bin_color: BinColor::from_label(&classification.bin_color),
        suggestion: classification.suggestion.clone(),
        source: Source::Ai,
        audio_url: audio_url.clone(),
        created_at: now,
        updated_at: now,
    };

    let db = state.db.clone();
    let stored = record.clone();
    tokio::task::spawn_blocking(move || store::insert_waste_record(&db, &stored)).await??;

    Ok(envelope(
        json!({
            "itemName": classification.item_name,
            "wasteType": classification.waste_type,
            "binColor": classification.bin_color,
            "suggestion": classification.suggestion,
            "confidence": classification.confidence,
            "audioUrl": audio_url,
        }),
        "Image classified",
    )
    .into_response())
}

/// Best-effort speech synthesis; a failure degrades to no audio
async fn synthesize_announcement(
    state: &AppState,
    classification: &AiClassification,
) -> Option<String> {
    let speech_text = format!(
        "This item is {}. Put it in the {} bin. {}",
        classification.waste_type, classification.bin_color, classification.suggestion
    );

    match state.tts.synthesize(&speech_text).await {
        Ok(artifact) => Some(artifact.url),
        Err(e) => {
            tracing::warn!("Audio generation failed: {}", e);
            None
        }
    }
}

/// File extension for a stored upload, by declared content type
fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/png" => ".png",
        "image/webp" => ".webp",
        _ => ".jpg",
    }
}
