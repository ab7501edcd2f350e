use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How the item was submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Text,
    Image,
}

/// Disposal category persisted on a waste record
///
/// The AI adapter reports richer labels ("Recyclable", "General Waste");
/// everything that is not biodegradable is stored as non-biodegradable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WasteType {
    Biodegradable,
    NonBiodegradable,
}

impl WasteType {
    /// Coerce a classifier label to the stored enum, defaulting to
    /// non-biodegradable for anything unrecognized.
    pub fn from_label(label: &str) -> Self {
        if label.trim().eq_ignore_ascii_case("biodegradable") {
            WasteType::Biodegradable
        } else {
            WasteType::NonBiodegradable
        }
    }
}

/// Recommended disposal bin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinColor {
    Green,
    Blue,
    Black,
}

impl BinColor {
    /// Coerce a classifier label to the stored enum, defaulting to black
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "green" => BinColor::Green,
            "blue" => BinColor::Blue,
            _ => BinColor::Black,
        }
    }
}

/// Provenance of a classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Source {
    RuleBased,
    Ai,
}

/// Waste record stored in redb, keyed by UUID string
///
/// Created exactly once per successful classification and immutable
/// afterwards. Field names only matter for JSON responses; bincode
/// encoding is positional.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WasteRecord {
    pub id: String,
    pub user_id: String,
    pub input_type: InputType,
    /// Raw text for text submissions, stored upload filename for images
    pub input_value: String,
    pub item_name: String,
    pub waste_type: WasteType,
    pub bin_color: BinColor,
    pub suggestion: String,
    pub source: Source,
    /// `/audio/<filename>` of the synthesized announcement, when TTS succeeded
    pub audio_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Waste record shape for API responses (RFC3339 timestamps)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WasteRecordResponse {
    pub id: String,
    pub input_type: InputType,
    pub input_value: String,
    pub item_name: String,
    pub waste_type: WasteType,
    pub bin_color: BinColor,
    pub suggestion: String,
    pub source: Source,
    pub audio_url: Option<String>,
    pub created_at: String,
}

impl From<&WasteRecord> for WasteRecordResponse {
    fn from(record: &WasteRecord) -> Self {
        Self {
            id: record.id.clone(),
            input_type: record.input_type,
            input_value: record.input_value.clone(),
            item_name: record.item_name.clone(),
            waste_type: record.waste_type,
            bin_color: record.bin_color,
            suggestion: record.suggestion.clone(),
            source: record.source,
            audio_url: record.audio_url.clone(),
            created_at: timestamp_to_rfc3339(record.created_at),
        }
    }
}

/// Convert Unix timestamp to RFC3339 string, defaulting to now if invalid
pub fn timestamp_to_rfc3339(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .unwrap_or_else(Utc::now)
        .to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> WasteRecord {
        WasteRecord {
            id: "r1".to_string(),
            user_id: "u1".to_string(),
            input_type: InputType::Text,
            input_value: "apple".to_string(),
            item_name: "apple".to_string(),
            waste_type: WasteType::Biodegradable,
            bin_color: BinColor::Green,
            suggestion: "Compost it".to_string(),
            source: Source::RuleBased,
            audio_url: None,
            created_at: 1733788800,
            updated_at: 1733788800,
        }
    }

    #[test]
    fn test_waste_type_from_label() {
        assert_eq!(
            WasteType::from_label("Biodegradable"),
            WasteType::Biodegradable
        );
        assert_eq!(
            WasteType::from_label("  biodegradable  "),
            WasteType::Biodegradable
        );
        // Recyclable and anything unknown go to the landfill category
        assert_eq!(
            WasteType::from_label("Recyclable"),
            WasteType::NonBiodegradable
        );
        assert_eq!(
            WasteType::from_label("General Waste"),
            WasteType::NonBiodegradable
        );
        assert_eq!(WasteType::from_label(""), WasteType::NonBiodegradable);
    }

    #[test]
    fn test_bin_color_from_label() {
        assert_eq!(BinColor::from_label("Green"), BinColor::Green);
        assert_eq!(BinColor::from_label("BLUE"), BinColor::Blue);
        assert_eq!(BinColor::from_label("black"), BinColor::Black);
        assert_eq!(BinColor::from_label("purple"), BinColor::Black);
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(
            serde_json::to_string(&WasteType::NonBiodegradable).unwrap(),
            "\"non-biodegradable\""
        );
        assert_eq!(
            serde_json::to_string(&Source::RuleBased).unwrap(),
            "\"rule-based\""
        );
        assert_eq!(serde_json::to_string(&BinColor::Green).unwrap(), "\"green\"");
    }

    #[test]
    fn test_record_bincode_round_trip() {
        let record = sample_record();
        let bytes = bincode::serialize(&record).unwrap();
        let decoded: WasteRecord = bincode::deserialize(&bytes).unwrap();

        assert_eq!(decoded.item_name, record.item_name);
        assert_eq!(decoded.waste_type, record.waste_type);
        assert_eq!(decoded.bin_color, record.bin_color);
        assert_eq!(decoded.source, record.source);
    }

    #[test]
    fn test_response_uses_rfc3339_created_at() {
        let record = sample_record();
        let response = WasteRecordResponse::from(&record);
        assert!(response.created_at.starts_with("2024-12-"));
    }
}
