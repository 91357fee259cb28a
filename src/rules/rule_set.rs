use std::collections::{BTreeMap, BTreeSet};

use regex_lite::{Regex, RegexBuilder};
use thiserror::Error;

use super::definition::{NamePattern, RuleSetDefinition, ScoringConfig};
use crate::types::identifiers::{CreatorId, RuleSetVersion};

#[derive(Debug, Error)]
pub enum RuleSetError {
    #[error("Rule set defines no categories")]
    NoCategories,
    #[error("Category names must not be empty")]
    EmptyCategoryName,
    #[error("Duplicate category: {0}")]
    DuplicateCategory(String),
    #[error("Default category `{0}` is not a defined category")]
    UnknownDefaultCategory(String),
    #[error("`{section}` references undefined category `{category}`")]
    UnknownCategory {
        section: &'static str,
        category: String,
    },
    #[error("Empty keyword in category `{0}`")]
    EmptyKeyword(String),
    #[error("Keyword `{keyword}` in category `{category}` has weight 0")]
    ZeroWeight { category: String, keyword: String },
    #[error("Empty zone label in category `{0}`")]
    EmptyZoneLabel(String),
    #[error("Empty name pattern targeting `{0}`")]
    EmptyNamePattern(String),
    #[error("Invalid name pattern `{pattern}`: {reason}")]
    InvalidNamePattern { pattern: String, reason: String },
    #[error("Invalid scoring config: {0}")]
    InvalidScoringConfig(&'static str),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub(crate) enum NameMatcher {
    Contains(String),
    Regex(Regex),
}

impl NameMatcher {
    pub(crate) fn is_match(&self, folded_name: &str) -> bool {
        match self {
            NameMatcher::Contains(needle) => folded_name.contains(needle.as_str()),
            NameMatcher::Regex(re) => re.is_match(folded_name),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledNameRule {
    pub(crate) matcher: NameMatcher,
    pub(crate) category: usize,
    pub(crate) bonus: u64,
}

/// A validated, immutable rule set.
///
/// Built only through [`RuleSet::new`], which checks every category
/// reference, case-folds keywords and zone labels, compiles name patterns
/// and stamps a content-hash version. Category references are resolved to
/// indexes into [`RuleSet::categories`].
#[derive(Debug, Clone)]
pub struct RuleSet {
    definition: RuleSetDefinition,
    version: RuleSetVersion,
    pub(crate) keywords: Vec<Vec<(String, u64)>>,
    pub(crate) zones: Vec<BTreeSet<String>>,
    pub(crate) name_rules: Vec<CompiledNameRule>,
}

impl RuleSet {
    pub fn new(definition: RuleSetDefinition) -> Result<Self, RuleSetError> {
        let index = category_index(&definition.categories)?;

        if !index.contains_key(definition.default_category.as_str()) {
            return Err(RuleSetError::UnknownDefaultCategory(
                definition.default_category.clone(),
            ));
        }

        let scoring = &definition.scoring;
        if scoring.keyword_occurrence_cap == 0 {
            return Err(RuleSetError::InvalidScoringConfig(
                "keyword_occurrence_cap must be at least 1",
            ));
        }

        let resolve = |section: &'static str, category: &str| {
            index
                .get(category)
                .copied()
                .ok_or_else(|| RuleSetError::UnknownCategory {
                    section,
                    category: category.to_string(),
                })
        };

        let mut keywords = vec![Vec::new(); definition.categories.len()];
        for (category, rules) in &definition.keyword_rules {
            let slot = resolve("keyword_rules", category)?;
            for rule in rules {
                if rule.keyword.is_empty() {
                    return Err(RuleSetError::EmptyKeyword(category.clone()));
                }
                if rule.weight == 0 {
                    return Err(RuleSetError::ZeroWeight {
                        category: category.clone(),
                        keyword: rule.keyword.clone(),
                    });
                }
                keywords[slot].push((rule.keyword.to_lowercase(), u64::from(rule.weight)));
            }
        }

        let mut zones = vec![BTreeSet::new(); definition.categories.len()];
        for (category, labels) in &definition.zone_bonus {
            let slot = resolve("zone_bonus", category)?;
            for label in labels {
                let folded = label.trim().to_lowercase();
                if folded.is_empty() {
                    return Err(RuleSetError::EmptyZoneLabel(category.clone()));
                }
                // Case variants of one label collapse here
                zones[slot].insert(folded);
            }
        }

        let mut name_rules = Vec::with_capacity(definition.name_pattern_bonus.len());
        for rule in &definition.name_pattern_bonus {
            let category = resolve("name_pattern_bonus", &rule.category)?;
            let matcher = match &rule.pattern {
                NamePattern::Contains(needle) if needle.is_empty() => {
                    return Err(RuleSetError::EmptyNamePattern(rule.category.clone()));
                }
                NamePattern::Contains(needle) => NameMatcher::Contains(needle.to_lowercase()),
                NamePattern::Regex(expr) if expr.is_empty() => {
                    return Err(RuleSetError::EmptyNamePattern(rule.category.clone()));
                }
                NamePattern::Regex(expr) => {
                    let re = RegexBuilder::new(expr)
                        .case_insensitive(true)
                        .build()
                        .map_err(|e| RuleSetError::InvalidNamePattern {
                            pattern: expr.clone(),
                            reason: e.to_string(),
                        })?;
                    NameMatcher::Regex(re)
                }
            };
            name_rules.push(CompiledNameRule {
                matcher,
                category,
                bonus: u64::from(rule.bonus),
            });
        }

        for category in definition.manual.values() {
            resolve("manual", category)?;
        }
        for category in definition.manual_ids.values() {
            resolve("manual_ids", category)?;
        }

        let canonical = serde_json::to_vec(&definition)?;
        let version = RuleSetVersion::from_content(&canonical);

        Ok(RuleSet {
            definition,
            version,
            keywords,
            zones,
            name_rules,
        })
    }

    pub fn categories(&self) -> &[String] {
        &self.definition.categories
    }

    pub fn default_category(&self) -> &str {
        &self.definition.default_category
    }

    pub fn version(&self) -> &RuleSetVersion {
        &self.version
    }

    pub fn scoring(&self) -> &ScoringConfig {
        &self.definition.scoring
    }

    pub fn definition(&self) -> &RuleSetDefinition {
        &self.definition
    }

    pub fn contains_category(&self, category: &str) -> bool {
        self.definition.categories.iter().any(|c| c == category)
    }

    pub fn manual_names(&self) -> impl Iterator<Item = &str> {
        self.definition.manual.keys().map(String::as_str)
    }

    /// Manual category for a creator; an id entry beats a name entry.
    pub fn manual_category(&self, id: CreatorId, name: &str) -> Option<&str> {
        self.definition
            .manual_ids
            .get(&id)
            .or_else(|| self.definition.manual.get(name))
            .map(String::as_str)
    }
}

fn category_index(categories: &[String]) -> Result<BTreeMap<&str, usize>, RuleSetError> {
    if categories.is_empty() {
        return Err(RuleSetError::NoCategories);
    }

    let mut index = BTreeMap::new();
    for (slot, category) in categories.iter().enumerate() {
        if category.trim().is_empty() {
            return Err(RuleSetError::EmptyCategoryName);
        }
        if index.insert(category.as_str(), slot).is_some() {
            return Err(RuleSetError::DuplicateCategory(category.clone()));
        }
    }
    Ok(index)
}
