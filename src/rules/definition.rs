use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::types::identifiers::CreatorId;

// Serializable, comparable, canonical:
// every map is a BTreeMap so the JSON form (and its hash) is stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSetDefinition {
    /// Display and tie-break order.
    pub categories: Vec<String>,
    pub default_category: String,
    #[serde(default)]
    pub keyword_rules: BTreeMap<String, Vec<KeywordRule>>,
    /// Category -> zone labels. Labels are matched case-folded, so labels
    /// of one category that differ only by case ("Game", "game") count as
    /// one label and earn one bonus.
    #[serde(default)]
    pub zone_bonus: BTreeMap<String, BTreeSet<String>>,
    #[serde(default)]
    pub name_pattern_bonus: Vec<NamePatternRule>,
    /// Creator name -> category. Absolute precedence over scoring.
    #[serde(default)]
    pub manual: BTreeMap<String, String>,
    /// Creator id -> category. Wins over `manual`.
    #[serde(default)]
    pub manual_ids: BTreeMap<CreatorId, String>,
    #[serde(default)]
    pub scoring: ScoringConfig,
}

impl RuleSetDefinition {
    /// A definition with only categories and a default; everything else empty.
    pub fn new<I, S>(categories: I, default_category: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            categories: categories.into_iter().map(Into::into).collect(),
            default_category: default_category.into(),
            keyword_rules: BTreeMap::new(),
            zone_bonus: BTreeMap::new(),
            name_pattern_bonus: Vec::new(),
            manual: BTreeMap::new(),
            manual_ids: BTreeMap::new(),
            scoring: ScoringConfig::v0(),
        }
    }

    pub fn keyword(mut self, category: &str, keyword: &str, weight: u32) -> Self {
        self.keyword_rules
            .entry(category.to_string())
            .or_default()
            .push(KeywordRule {
                keyword: keyword.to_string(),
                weight,
            });
        self
    }

    pub fn zone(mut self, category: &str, zone: &str) -> Self {
        self.zone_bonus
            .entry(category.to_string())
            .or_default()
            .insert(zone.to_string());
        self
    }

    pub fn name_pattern(mut self, pattern: NamePattern, category: &str, bonus: u32) -> Self {
        self.name_pattern_bonus.push(NamePatternRule {
            pattern,
            category: category.to_string(),
            bonus,
        });
        self
    }

    pub fn manual(mut self, name: &str, category: &str) -> Self {
        self.manual.insert(name.to_string(), category.to_string());
        self
    }

    pub fn manual_id(mut self, id: impl Into<CreatorId>, category: &str) -> Self {
        self.manual_ids.insert(id.into(), category.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub keyword: String,
    pub weight: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamePatternRule {
    pub pattern: NamePattern,
    pub category: String,
    pub bonus: u32,
}

/// How a name-pattern rule matches the case-folded display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum NamePattern {
    Contains(String),
    Regex(String),
}

/// Scoring constants. Part of the definition, so part of its version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Added once per matching zone label.
    pub zone_bonus: u64,
    /// Occurrences of one keyword beyond this count add nothing.
    pub keyword_occurrence_cap: usize,
    pub bio_snippet_chars: usize,
    /// How many collections / tags the reason text quotes.
    pub reason_items: usize,
}

impl ScoringConfig {
    pub fn v0() -> Self {
        Self {
            zone_bonus: 50,
            keyword_occurrence_cap: 5,
            bio_snippet_chars: 30,
            reason_items: 3,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self::v0()
    }
}
