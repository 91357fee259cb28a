pub mod reason;
pub mod scoring;

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::profile::CreatorProfile;
use crate::rules::RuleSet;
use crate::types::assignment::{CategoryAssignment, CategoryMapping};
use crate::types::identifiers::CreatorId;
pub use scoring::{count_occurrences, Scorer, Verdict, VerdictSource, WeightedKeywordScorer};

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("Duplicate creator id: {0}")]
    DuplicateCreatorId(CreatorId),
    #[error("Manual override name `{name}` is shared by creators {ids:?}; key it by id instead")]
    AmbiguousManualName { name: String, ids: Vec<CreatorId> },
}

/// Applies a [`Scorer`] to every profile and groups the results.
///
/// Configuration problems (duplicate ids, ambiguous manual names) are
/// reported before any profile is scored; a batch never fails part-way.
pub struct BatchClassifier<S> {
    scorer: S,
}

impl Default for BatchClassifier<WeightedKeywordScorer> {
    fn default() -> Self {
        Self {
            scorer: WeightedKeywordScorer,
        }
    }
}

impl<S> BatchClassifier<S>
where
    S: Scorer,
{
    pub fn new(scorer: S) -> Self {
        Self { scorer }
    }

    pub fn scorer(&self) -> &S {
        &self.scorer
    }

    /// Score one profile into an assignment.
    pub fn assign(&self, profile: &CreatorProfile, rules: &RuleSet) -> CategoryAssignment {
        let verdict = self.scorer.score(profile, rules);
        debug!(
            creator = %profile.id,
            category = %verdict.category,
            score = verdict.breakdown.as_ref().map_or(0, |b| b.winning_score),
            source = ?verdict.source,
            "Scored profile"
        );
        CategoryAssignment {
            creator_id: profile.id,
            creator_name: profile.name.clone(),
            category: verdict.category,
            reason: verdict.reason,
            score_breakdown: verdict.breakdown,
        }
    }

    pub fn classify_all(
        &self,
        profiles: &[CreatorProfile],
        rules: &RuleSet,
    ) -> Result<CategoryMapping, ClassifyError> {
        check_unique_ids(profiles.iter().map(|p| p.id))?;
        check_manual_names(profiles, rules)?;

        let known: BTreeSet<&str> = profiles.iter().map(|p| p.name.as_str()).collect();
        for name in rules.manual_names().filter(|name| !known.contains(name)) {
            warn!(name, "Manual override names no creator in this batch");
        }

        let mapping =
            CategoryMapping::from_assignments(profiles.iter().map(|p| self.assign(p, rules)));

        info!(
            profiles = profiles.len(),
            categories = mapping.len(),
            rules_version = %rules.version(),
            "Classified batch"
        );
        Ok(mapping)
    }

    /// Score only `profiles` and merge them into an existing mapping.
    ///
    /// Existing assignments, including any corrections they carry, are kept
    /// as they are.
    pub fn classify_into(
        &self,
        mapping: CategoryMapping,
        profiles: &[CreatorProfile],
        rules: &RuleSet,
    ) -> Result<CategoryMapping, ClassifyError> {
        check_unique_ids(
            mapping
                .assignments()
                .map(|a| a.creator_id)
                .chain(profiles.iter().map(|p| p.id)),
        )?;
        check_manual_names(profiles, rules)?;

        let mut assignments = mapping.into_assignments();
        let before = assignments.len();
        assignments.extend(profiles.iter().map(|p| self.assign(p, rules)));

        let merged = CategoryMapping::from_assignments(assignments);
        info!(
            existing = before,
            added = profiles.len(),
            categories = merged.len(),
            "Merged new profiles into mapping"
        );
        Ok(merged)
    }
}

fn check_unique_ids(ids: impl Iterator<Item = CreatorId>) -> Result<(), ClassifyError> {
    let mut sorted: Vec<CreatorId> = ids.collect();
    sorted.sort();

    // Duplicates are adjacent after the sort
    for pair in sorted.windows(2) {
        if pair[0] == pair[1] {
            return Err(ClassifyError::DuplicateCreatorId(pair[0]));
        }
    }
    Ok(())
}

/// A name-keyed manual entry must resolve to at most one creator once
/// id-keyed entries are taken into account.
fn check_manual_names(profiles: &[CreatorProfile], rules: &RuleSet) -> Result<(), ClassifyError> {
    let manual: BTreeSet<&str> = rules.manual_names().collect();
    if manual.is_empty() {
        return Ok(());
    }

    let mut by_name: BTreeMap<&str, Vec<CreatorId>> = BTreeMap::new();
    for profile in profiles {
        if !manual.contains(profile.name.as_str()) {
            continue;
        }
        if rules.definition().manual_ids.contains_key(&profile.id) {
            continue;
        }
        by_name.entry(profile.name.as_str()).or_default().push(profile.id);
    }

    match by_name.into_iter().find(|(_, ids)| ids.len() > 1) {
        Some((name, mut ids)) => {
            ids.sort();
            Err(ClassifyError::AmbiguousManualName {
                name: name.to_string(),
                ids,
            })
        }
        None => Ok(()),
    }
}
