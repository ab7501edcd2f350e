use serde::Serialize;
use std::collections::HashMap;

use crate::constants::{DEFAULT_SUGGESTION, ERR_EMPTY_ITEM_NAME, RULE_CONFIDENCE};
use crate::error::{AppError, Result};
use crate::models::{BinColor, WasteType};

/// A single disposal rule
#[derive(Debug, Clone)]
pub struct Rule {
    pub waste_type: WasteType,
    pub bin_color: BinColor,
    pub suggestion: &'static str,
}

/// Result of a text classification
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub item_name: String,
    pub waste_type: WasteType,
    pub bin_color: BinColor,
    pub suggestion: String,
    pub confidence: u8,
}

/// Static keyword-to-rule lookup table
///
/// Built once at startup and injected into the app state; never mutated at
/// runtime. Keys are lowercase item names.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: HashMap<&'static str, Rule>,
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::with_builtin_rules()
    }
}

impl RuleTable {
    /// The built-in disposal rules
    pub fn with_builtin_rules() -> Self {
        use BinColor::*;
        use WasteType::*;

        let entries: [(&'static str, WasteType, BinColor, &'static str); 10] = [
            ("banana peel", Biodegradable, Green, "Compost it"),
            ("apple", Biodegradable, Green, "Compost it"),
            ("orange peel", Biodegradable, Green, "Compost it"),
            ("tea bag", Biodegradable, Green, "Compost it"),
            ("eggshell", Biodegradable, Green, "Crush and compost it"),
            (
                "plastic bottle",
                NonBiodegradable,
                Blue,
                "Recycle at a recycling center",
            ),
            (
                "glass bottle",
                NonBiodegradable,
                Blue,
                "Rinse and recycle at a recycling center",
            ),
            (
                "aluminum can",
                NonBiodegradable,
                Blue,
                "Rinse and recycle at a recycling center",
            ),
            ("newspaper", NonBiodegradable, Blue, "Recycle with paper waste"),
            (
                "battery",
                NonBiodegradable,
                Black,
                "Dispose at hazardous waste facility",
            ),
        ];

        let rules = entries
            .into_iter()
            .map(|(name, waste_type, bin_color, suggestion)| {
                (
                    name,
                    Rule {
                        waste_type,
                        bin_color,
                        suggestion,
                    },
                )
            })
            .collect();

        Self { rules }
    }

    /// Classify an item name against the rule table
    ///
    /// Lookup is on the trimmed, lowercased name. A miss is not an error:
    /// unknown items fall back to the non-biodegradable/black default.
    pub fn classify(&self, raw: &str) -> Result<Classification> {
        let item_name = raw.trim();
        if item_name.is_empty() {
            return Err(AppError::Validation(ERR_EMPTY_ITEM_NAME.to_string()));
        }

        let key = item_name.to_lowercase();

        let classification = match self.rules.get(key.as_str()) {
            Some(rule) => Classification {
                item_name: item_name.to_string(),
                waste_type: rule.waste_type,
                bin_color: rule.bin_color,
                suggestion: rule.suggestion.to_string(),
                confidence: RULE_CONFIDENCE,
            },
            None => Classification {
                item_name: item_name.to_string(),
                waste_type: WasteType::NonBiodegradable,
                bin_color: BinColor::Black,
                suggestion: DEFAULT_SUGGESTION.to_string(),
                confidence: RULE_CONFIDENCE,
            },
        };

        Ok(classification)
    }

    /// Whether the table contains a rule for the given (lowercase) key
    pub fn contains(&self, key: &str) -> bool {
        self.rules.contains_key(key)
    }

    /// Number of loaded rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
