use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const DEFAULT_CATEGORY: &str = "general";

/// Passing thresholds for one test, keyed by normalized category name.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct CutoffRecord {
    pub test_id: String,
    #[serde(default)]
    pub thresholds: BTreeMap<String, f64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum CutoffStatus {
    Passed,
    Failed,
    #[serde(rename = "Not Available")]
    NotAvailable,
}

/// Lowercases and trims a category; "gen" is an alias of "general".
/// Missing or blank categories map to "general".
pub fn normalize_category(category: Option<&str>) -> String {
    let normalized = category
        .map(|c| c.trim().to_ascii_lowercase())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

    match normalized.as_str() {
        "gen" => DEFAULT_CATEGORY.to_string(),
        _ => normalized,
    }
}

impl CutoffRecord {
    pub fn new(test_id: &str, thresholds: &[(&str, f64)]) -> Self {
        CutoffRecord {
            test_id: test_id.to_string(),
            thresholds: thresholds
                .iter()
                .map(|(category, score)| (normalize_category(Some(category)), *score))
                .collect(),
        }
    }

    /// Only positive thresholds count as set.
    pub fn threshold_for(&self, category: Option<&str>) -> Option<f64> {
        self.thresholds
            .get(&normalize_category(category))
            .copied()
            .filter(|threshold| *threshold > 0.0)
    }
}
