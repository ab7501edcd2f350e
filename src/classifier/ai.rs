//! AI image classification adapter.
//!
//! Sends the uploaded image to a remote multimodal model and decodes the
//! free-text reply into a [`ClassificationOutcome`]. The model is asked for
//! strict JSON but is not trusted to return it: the first balanced object is
//! extracted from the reply and every field is validated explicitly.

use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use crate::constants::{AI_DEFAULT_CONFIDENCE, BANNED_ITEM_NAMES};
use crate::error::{AppError, Result};

const OPENAI_CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

const PROMPT: &str = "You are a waste classification assistant.\n\
\n\
Analyze this image.\n\
\n\
If the image does not show a waste item, return ONLY JSON:\n\
{\"isWaste\": false, \"reason\": \"short explanation\"}\n\
\n\
Otherwise return ONLY JSON:\n\
{\n\
\"isWaste\": true,\n\
\"itemName\": \"the specific item, never a generic word like item, object or waste\",\n\
\"wasteType\": \"Biodegradable or Recyclable or General Waste\",\n\
\"binColor\": \"Green or Blue or Black\",\n\
\"suggestion\": \"short disposal instruction\",\n\
\"confidence\": 0-100 number\n\
}\n\
\n\
Do not include explanations.";

/// Decoded AI classification, labels normalized but not yet coerced to the
/// stored enums (the record keeps only biodegradable/non-biodegradable).
#[derive(Debug, Clone)]
pub struct AiClassification {
    pub item_name: String,
    /// "Biodegradable", "Recyclable" or "General Waste"
    pub waste_type: String,
    /// "Green", "Blue" or "Black"
    pub bin_color: String,
    pub suggestion: String,
    pub confidence: u8,
}

/// Outcome of an image classification request
#[derive(Debug, Clone)]
pub enum ClassificationOutcome {
    /// The model decided the image does not show a waste item.
    /// Not an error; the caller persists nothing and reports it as 400.
    Rejected { reason: String },
    Classified(AiClassification),
}

/// Remote image classifier contract
///
/// A trait seam so tests can run the full image path with a stub.
#[async_trait]
pub trait ImageClassifier: Send + Sync {
    async fn classify(&self, image: &[u8], content_type: &str) -> Result<ClassificationOutcome>;
}

/// OpenAI-backed image classifier
pub struct OpenAiClassifier {
    http_client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    confidence_threshold: u8,
}

impl OpenAiClassifier {
    pub fn new(api_key: Option<String>, model: String, confidence_threshold: u8) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_else(|e| {
                tracing::error!("Failed to build HTTP client for AI adapter: {}", e);
                reqwest::Client::new()
            });

        Self {
            http_client,
            api_key,
            model,
            confidence_threshold,
        }
    }
}

#[async_trait]
impl ImageClassifier for OpenAiClassifier {
    async fn classify(&self, image: &[u8], content_type: &str) -> Result<ClassificationOutcome> {
        // Fail fast before any network I/O when the credential is missing
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            AppError::Configuration("OPENAI_API_KEY is not set".to_string())
        })?;

        let image_base64 = base64::engine::general_purpose::STANDARD.encode(image);

        let request_body = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "user",
                    "content": [
                        { "type": "text", "text": PROMPT },
                        {
                            "type": "image_url",
                            "image_url": {
                                "url": format!("data:{};base64,{}", content_type, image_base64)
                            }
                        }
                    ]
                }
            ]
        });

        tracing::debug!(
            model = %self.model,
            image_size = image.len(),
            "Sending classification request to AI model"
        );

        let response = self
            .http_client
            .post(OPENAI_CHAT_COMPLETIONS_URL)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(AppError::Upstream(format!(
                "AI request failed with status {}: {}",
                status, body
            )));
        }

        let chat_response: ChatCompletionResponse = response.json().await?;

        let content = chat_response
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .ok_or_else(|| AppError::Upstream("Empty AI response".to_string()))?;

        parse_ai_response(content, self.confidence_threshold)
    }
}

/// Decode and validate the model's reply
///
/// Applies the full admission policy: rejection pass-through, required
/// fields, confidence clamp/default/threshold, and the generic-name ban.
pub fn parse_ai_response(text: &str, confidence_threshold: u8) -> Result<ClassificationOutcome> {
    let object = extract_json_object(text)
        .ok_or_else(|| AppError::Upstream("No JSON object in AI response".to_string()))?;

    let parsed: Value = serde_json::from_str(object)
        .map_err(|e| AppError::Upstream(format!("Invalid JSON in AI response: {}", e)))?;

    // An explicit rejection is a valid outcome, not a failure
    if parsed.get("isWaste").and_then(Value::as_bool) == Some(false) {
        let reason = parsed
            .get("reason")
            .and_then(Value::as_str)
            .unwrap_or("The image does not appear to contain a waste item")
            .trim()
            .to_string();
        return Ok(ClassificationOutcome::Rejected { reason });
    }

    let item_name = parsed
        .get("itemName")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::InvalidClassification("Missing itemName".to_string()))?;

    let raw_waste_type = parsed
        .get("wasteType")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::InvalidClassification("Missing wasteType".to_string()))?;

    let raw_bin_color = parsed
        .get("binColor")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::InvalidClassification("Missing binColor".to_string()))?;

    let confidence = clamp_confidence(parsed.get("confidence"));
    if confidence < confidence_threshold {
        return Err(AppError::LowConfidence {
            confidence,
            threshold: confidence_threshold,
        });
    }

    if BANNED_ITEM_NAMES
        .iter()
        .any(|banned| item_name.eq_ignore_ascii_case(banned))
    {
        return Err(AppError::InvalidClassification(format!(
            "Generic item name \"{}\"",
            item_name
        )));
    }

    let suggestion = parsed
        .get("suggestion")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(crate::constants::DEFAULT_SUGGESTION)
        .to_string();

    Ok(ClassificationOutcome::Classified(AiClassification {
        item_name: item_name.to_string(),
        waste_type: normalize_waste_type(raw_waste_type),
        bin_color: normalize_bin_color(raw_bin_color),
        suggestion,
        confidence,
    }))
}

/// Extract the first balanced `{...}` block from free text
///
/// Tracks string literals and escapes so braces inside values don't
/// unbalance the scan.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=i]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Clamp a reported confidence to [0, 100]; missing or non-numeric values
/// default to a conservative mid-range figure.
fn clamp_confidence(value: Option<&Value>) -> u8 {
    match value.and_then(Value::as_f64) {
        Some(n) => n.round().clamp(0.0, 100.0) as u8,
        None => AI_DEFAULT_CONFIDENCE,
    }
}

/// Normalize a waste-type label by substring match
fn normalize_waste_type(raw: &str) -> String {
    let v = raw.trim().to_lowercase();
    if v.contains("bio") {
        "Biodegradable".to_string()
    } else if v.contains("recycl") {
        "Recyclable".to_string()
    } else {
        "General Waste".to_string()
    }
}

/// Normalize a bin-color label by substring match
fn normalize_bin_color(raw: &str) -> String {
    let v = raw.trim().to_lowercase();
    if v.contains("green") {
        "Green".to_string()
    } else if v.contains("blue") {
        "Blue".to_string()
    } else {
        "Black".to_string()
    }
}

// Chat Completions API response types
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
}
