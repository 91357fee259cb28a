use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::assignment::{CategoryMapping, MappingSummary};
use crate::types::identifiers::RuleSetVersion;

pub const RECORD_FORMAT_VERSION: &str = "1";

/// A persisted category mapping, as handed to rendering and sync layers.
///
/// `summary` is derived from `categories` and re-checked on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRecord {
    pub format_version: String,
    pub rules_version: RuleSetVersion,
    /// Number of correction steps applied after classification.
    pub correction_steps: usize,
    pub created_at: DateTime<Utc>, // informational only
    pub summary: MappingSummary,
    pub categories: CategoryMapping,
}

impl ClassificationRecord {
    pub fn new(
        rules_version: RuleSetVersion,
        correction_steps: usize,
        categories: CategoryMapping,
    ) -> Self {
        Self {
            format_version: RECORD_FORMAT_VERSION.to_string(),
            rules_version,
            correction_steps,
            created_at: Utc::now(),
            summary: categories.summary(),
            categories,
        }
    }
}
