use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{check_name_keys, CascadeError};
use crate::classify::reason::REASON_MANUAL_CORRECTION;
use crate::types::assignment::CategoryMapping;
use crate::types::identifiers::CreatorId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebucketTarget {
    pub category: String,
    pub keywords: Vec<String>,
}

/// Re-derive each creator's bucket from the label of the bucket it is in.
///
/// Used to collapse a large, loosely named set of categories (for example
/// one produced by an earlier tool) into a fixed taxonomy. A manual id
/// entry wins, then a manual name entry; otherwise the first target in
/// `priority` with a keyword contained in the current label (case-folded);
/// otherwise `fallback`, or the current label when there is none.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RebucketRules {
    #[serde(default)]
    pub manual: BTreeMap<String, String>,
    #[serde(default)]
    pub manual_ids: BTreeMap<CreatorId, String>,
    pub priority: Vec<RebucketTarget>,
    #[serde(default)]
    pub fallback: Option<String>,
}

impl RebucketRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target<I, S>(mut self, category: &str, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.priority.push(RebucketTarget {
            category: category.to_string(),
            keywords: keywords.into_iter().map(Into::into).collect(),
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

    pub fn fallback(mut self, category: &str) -> Self {
        self.fallback = Some(category.to_string());
        self
    }

    pub fn validate(&self) -> Result<(), CascadeError> {
        let mut targets = self
            .manual
            .values()
            .chain(self.manual_ids.values())
            .chain(self.priority.iter().map(|t| &t.category))
            .chain(self.fallback.iter());
        if targets.any(|t| t.trim().is_empty()) {
            return Err(CascadeError::EmptyTarget("rebucket"));
        }

        if let Some(target) = self
            .priority
            .iter()
            .find(|t| t.keywords.iter().any(|k| k.is_empty()))
        {
            return Err(CascadeError::EmptyKeyword(target.category.clone()));
        }
        Ok(())
    }

    /// Bucket for a creator currently labelled `label`, ignoring the manual
    /// tables.
    pub fn target_for_label(&self, label: &str) -> String {
        let folded = label.to_lowercase();
        self.priority
            .iter()
            .find(|target| {
                target
                    .keywords
                    .iter()
                    .any(|k| folded.contains(k.to_lowercase().as_str()))
            })
            .map(|target| target.category.clone())
            .or_else(|| self.fallback.clone())
            .unwrap_or_else(|| label.to_string())
    }
}

pub fn rebucket(
    mapping: &CategoryMapping,
    rules: &RebucketRules,
) -> Result<CategoryMapping, CascadeError> {
    rules.validate()?;
    let id_covered: BTreeSet<CreatorId> = rules.manual_ids.keys().copied().collect();
    check_name_keys(mapping, rules.manual.keys(), &id_covered)?;

    let mut by_label: BTreeMap<&str, String> = BTreeMap::new();
    for label in mapping.categories() {
        by_label.insert(label, rules.target_for_label(label));
    }

    let mut moved = 0usize;
    let assignments: Vec<_> = mapping
        .assignments()
        .map(|assignment| {
            let mut next = assignment.clone();
            let manual = rules
                .manual_ids
                .get(&assignment.creator_id)
                .or_else(|| rules.manual.get(&assignment.creator_name));
            match manual {
                Some(target) => {
                    next.category = target.clone();
                    next.reason = REASON_MANUAL_CORRECTION.to_string();
                }
                None => {
                    if let Some(target) = by_label.get(assignment.category.as_str()) {
                        next.category = target.clone();
                    }
                }
            }
            if next.category != assignment.category {
                moved += 1;
            }
            next
        })
        .collect();

    let result = CategoryMapping::from_assignments(assignments);
    info!(
        moved,
        categories_before = mapping.len(),
        categories_after = result.len(),
        "Rebucketed mapping"
    );
    Ok(result)
}
