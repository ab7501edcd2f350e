//! Dashboard aggregation over a user's waste records.
//!
//! Pure folds over the records loaded from the store; the MongoDB-style
//! aggregation lives here instead of in the database.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{BinColor, WasteRecord, WasteType};

/// Per-bin record counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BinUsage {
    pub green: u64,
    pub blue: u64,
    pub black: u64,
}

/// Dashboard summary: absolute counts
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_items: u64,
    pub biodegradable_count: u64,
    pub non_biodegradable_count: u64,
    pub bin_usage: BinUsage,
}

/// Biodegradable vs non-biodegradable share, in percent
#[derive(Debug, Clone, Serialize)]
pub struct BioSplit {
    pub biodegradable: f64,
    #[serde(rename = "non-biodegradable")]
    pub non_biodegradable: f64,
}

/// Per-bin share, in percent
#[derive(Debug, Clone, Serialize)]
pub struct BinUsagePercentage {
    pub green: f64,
    pub blue: f64,
    pub black: f64,
}

/// One day of classification activity (UTC calendar date)
#[derive(Debug, Clone, Serialize)]
pub struct DailyCount {
    pub date: String,
    pub count: u64,
}

/// Dashboard analytics: percentages and a daily activity series
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub bio_vs_non_bio_percentage: BioSplit,
    pub bin_usage_percentage: BinUsagePercentage,
    pub total_classifications_over_time: Vec<DailyCount>,
}

/// Count records by waste type and bin color
///
/// Zero records is a valid input and yields an all-zero summary.
pub fn summarize(records: &[WasteRecord]) -> Summary {
    let mut summary = Summary {
        total_items: records.len() as u64,
        biodegradable_count: 0,
        non_biodegradable_count: 0,
        bin_usage: BinUsage::default(),
    };

    for record in records {
        match record.waste_type {
            WasteType::Biodegradable => summary.biodegradable_count += 1,
            WasteType::NonBiodegradable => summary.non_biodegradable_count += 1,
        }
        match record.bin_color {
            BinColor::Green => summary.bin_usage.green += 1,
            BinColor::Blue => summary.bin_usage.blue += 1,
            BinColor::Black => summary.bin_usage.black += 1,
        }
    }

    summary
}

/// Compute percentage shares and the daily activity series
pub fn analytics(records: &[WasteRecord]) -> Analytics {
    let summary = summarize(records);
    let total = summary.total_items;

    // BTreeMap keeps the series sorted by date ascending
    let mut by_day: BTreeMap<String, u64> = BTreeMap::new();
    for record in records {
        *by_day.entry(utc_date_string(record.created_at)).or_default() += 1;
    }

    Analytics {
        bio_vs_non_bio_percentage: BioSplit {
            biodegradable: percentage(summary.biodegradable_count, total),
            non_biodegradable: percentage(summary.non_biodegradable_count, total),
        },
        bin_usage_percentage: BinUsagePercentage {
            green: percentage(summary.bin_usage.green, total),
            blue: percentage(summary.bin_usage.blue, total),
            black: percentage(summary.bin_usage.black, total),
        },
        total_classifications_over_time: by_day
            .into_iter()
            .map(|(date, count)| DailyCount { date, count })
            .collect(),
    }
}

/// count / total * 100, rounded to two decimals; 0 when total is 0
fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 / total as f64 * 10_000.0).round() / 100.0
}

/// UTC calendar date ("YYYY-MM-DD") of a Unix timestamp
fn utc_date_string(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .unwrap_or_else(Utc::now)
        .date_naive()
        .to_string()
}
