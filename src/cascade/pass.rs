use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{check_name_keys, CascadeError};
use crate::classify::reason::REASON_MANUAL_CORRECTION;
use crate::types::assignment::{CategoryAssignment, CategoryMapping};
use crate::types::identifiers::CreatorId;

/// Every category in `sources` is folded into `target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlanketMerge {
    pub sources: BTreeSet<String>,
    pub target: String,
}

/// One human correction step over a category mapping.
///
/// Within a pass: deletions, then category resolution (blanket merge, then
/// category merge, repeated until the label is stable), then name/id
/// corrections, which win over everything before them. All targets are
/// absolute, so applying a pass twice equals applying it once.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OverridePass {
    pub corrections: BTreeMap<String, String>,
    /// Wins over a name correction for the same creator.
    pub id_corrections: BTreeMap<CreatorId, String>,
    pub category_merges: BTreeMap<String, String>,
    pub blanket_merges: Option<BlanketMerge>,
    pub deletions: BTreeSet<String>,
    pub deleted_ids: BTreeSet<CreatorId>,
}

impl OverridePass {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn correct(mut self, name: &str, category: &str) -> Self {
        self.corrections.insert(name.to_string(), category.to_string());
        self
    }

    pub fn correct_id(mut self, id: impl Into<CreatorId>, category: &str) -> Self {
        self.id_corrections.insert(id.into(), category.to_string());
        self
    }

    pub fn merge(mut self, from: &str, into: &str) -> Self {
        self.category_merges.insert(from.to_string(), into.to_string());
        self
    }

    pub fn blanket<I, S>(mut self, sources: I, target: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blanket_merges = Some(BlanketMerge {
            sources: sources.into_iter().map(Into::into).collect(),
            target: target.to_string(),
        });
        self
    }

    pub fn delete(mut self, name: &str) -> Self {
        self.deletions.insert(name.to_string());
        self
    }

    pub fn delete_id(mut self, id: impl Into<CreatorId>) -> Self {
        self.deleted_ids.insert(id.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Reject empty targets and merge cycles, independent of any mapping.
    pub fn validate(&self) -> Result<(), CascadeError> {
        let mut targets = self
            .corrections
            .values()
            .chain(self.id_corrections.values())
            .chain(self.category_merges.values())
            .chain(self.blanket_merges.iter().map(|b| &b.target));
        if targets.any(|t| t.trim().is_empty()) {
            return Err(CascadeError::EmptyTarget("override pass"));
        }

        let merge_keys = self
            .category_merges
            .keys()
            .chain(self.blanket_merges.iter().flat_map(|b| b.sources.iter()));
        for key in merge_keys {
            self.resolve_category(key)?;
        }
        Ok(())
    }

    /// Final label of `category` under this pass's merge tables.
    pub fn resolve_category(&self, category: &str) -> Result<String, CascadeError> {
        let mut path = vec![category.to_string()];
        let mut current = category.to_string();

        loop {
            let next = self.merge_once(&current);
            if next == current {
                return Ok(current);
            }
            if path.contains(&next) {
                path.push(next);
                return Err(CascadeError::MergeCycle { path });
            }
            path.push(next.clone());
            current = next;
        }
    }

    fn merge_once(&self, category: &str) -> String {
        let folded = match &self.blanket_merges {
            Some(blanket) if blanket.sources.contains(category) => blanket.target.as_str(),
            _ => category,
        };
        self.category_merges
            .get(folded)
            .cloned()
            .unwrap_or_else(|| folded.to_string())
    }

    fn correction_for(&self, assignment: &CategoryAssignment) -> Option<&String> {
        self.id_corrections
            .get(&assignment.creator_id)
            .or_else(|| self.corrections.get(&assignment.creator_name))
    }
}

/// Apply one pass and regroup into canonical order.
pub fn apply_pass(
    mapping: &CategoryMapping,
    pass: &OverridePass,
) -> Result<CategoryMapping, CascadeError> {
    pass.validate()?;

    let id_covered: BTreeSet<CreatorId> = pass
        .id_corrections
        .keys()
        .chain(pass.deleted_ids.iter())
        .copied()
        .collect();
    check_name_keys(
        mapping,
        pass.corrections.keys().chain(pass.deletions.iter()),
        &id_covered,
    )?;
    warn_stale(mapping, pass);

    let mut resolved: BTreeMap<String, String> = BTreeMap::new();
    let mut kept = Vec::with_capacity(mapping.total_assignments());
    let mut deleted = 0usize;
    let mut corrected = 0usize;

    for assignment in mapping.assignments() {
        if pass.deleted_ids.contains(&assignment.creator_id)
            || pass.deletions.contains(&assignment.creator_name)
        {
            deleted += 1;
            continue;
        }

        let mut next = assignment.clone();

        if !resolved.contains_key(&next.category) {
            let target = pass.resolve_category(&next.category)?;
            resolved.insert(next.category.clone(), target);
        }
        if let Some(target) = resolved.get(&next.category) {
            next.category = target.clone();
        }

        if let Some(target) = pass.correction_for(&next) {
            next.category = target.clone();
            next.reason = REASON_MANUAL_CORRECTION.to_string();
            corrected += 1;
        }

        kept.push(next);
    }

    let result = CategoryMapping::from_assignments(kept);
    info!(
        deleted,
        corrected,
        categories_before = mapping.len(),
        categories_after = result.len(),
        "Applied override pass"
    );
    Ok(result)
}

fn warn_stale(mapping: &CategoryMapping, pass: &OverridePass) {
    let names: BTreeSet<&str> = mapping.assignments().map(|a| a.creator_name.as_str()).collect();
    let ids: BTreeSet<CreatorId> = mapping.assignments().map(|a| a.creator_id).collect();

    for name in pass.corrections.keys().chain(pass.deletions.iter()) {
        if !names.contains(name.as_str()) {
            warn!(name = %name, "Correction names no creator in the mapping");
        }
    }
    for id in pass.id_corrections.keys().chain(pass.deleted_ids.iter()) {
        if !ids.contains(id) {
            warn!(creator = %id, "Correction targets no creator in the mapping");
        }
    }
}
