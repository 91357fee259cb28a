pub mod pass;
pub mod rebucket;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::types::assignment::CategoryMapping;
use crate::types::identifiers::CreatorId;
pub use pass::{apply_pass, BlanketMerge, OverridePass};
pub use rebucket::{rebucket, RebucketRules, RebucketTarget};

#[derive(Debug, Error)]
pub enum CascadeError {
    #[error("Correction name `{name}` matches several creators {ids:?}; key it by id instead")]
    AmbiguousName { name: String, ids: Vec<CreatorId> },
    #[error("Category merge cycle: {}", path.join(" -> "))]
    MergeCycle { path: Vec<String> },
    #[error("Empty target category in {0}")]
    EmptyTarget(&'static str),
    #[error("Empty rebucket keyword for target `{0}`")]
    EmptyKeyword(String),
    #[error("Correction step {index} failed: {source}")]
    Step {
        index: usize,
        #[source]
        source: Box<CascadeError>,
    },
}

/// One replayable entry of a correction history.
///
/// Externally tagged (`{"pass": {...}}`): an internally tagged form would
/// buffer the body and lose the numeric keys of `id_corrections`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionStep {
    Pass(OverridePass),
    Rebucket(RebucketRules),
}

impl CorrectionStep {
    pub fn apply(&self, mapping: &CategoryMapping) -> Result<CategoryMapping, CascadeError> {
        match self {
            CorrectionStep::Pass(pass) => apply_pass(mapping, pass),
            CorrectionStep::Rebucket(rules) => rebucket(mapping, rules),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            CorrectionStep::Pass(_) => "pass",
            CorrectionStep::Rebucket(_) => "rebucket",
        }
    }
}

impl From<OverridePass> for CorrectionStep {
    fn from(pass: OverridePass) -> Self {
        CorrectionStep::Pass(pass)
    }
}

impl From<RebucketRules> for CorrectionStep {
    fn from(rules: RebucketRules) -> Self {
        CorrectionStep::Rebucket(rules)
    }
}

/// An ordered correction history. Step N sees the fully resolved output of
/// step N-1; steps are never reordered.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cascade {
    steps: Vec<CorrectionStep>,
}

impl Cascade {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, step: impl Into<CorrectionStep>) -> Self {
        self.steps.push(step.into());
        self
    }

    pub fn push(&mut self, step: impl Into<CorrectionStep>) {
        self.steps.push(step.into());
    }

    pub fn steps(&self) -> &[CorrectionStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn apply(&self, mapping: &CategoryMapping) -> Result<CategoryMapping, CascadeError> {
        let mut current = mapping.normalized();
        for (index, step) in self.steps.iter().enumerate() {
            current = step.apply(&current).map_err(|e| CascadeError::Step {
                index,
                source: Box::new(e),
            })?;
            info!(
                step = index,
                kind = step.kind(),
                creators = current.total_assignments(),
                categories = current.len(),
                "Applied correction step"
            );
        }
        Ok(current)
    }
}

/// Each name key must identify at most one creator not already addressed
/// by id.
pub(crate) fn check_name_keys<'a>(
    mapping: &CategoryMapping,
    names: impl Iterator<Item = &'a String>,
    id_covered: &BTreeSet<CreatorId>,
) -> Result<(), CascadeError> {
    let wanted: BTreeSet<&str> = names.map(String::as_str).collect();
    if wanted.is_empty() {
        return Ok(());
    }

    let mut by_name: BTreeMap<&str, BTreeSet<CreatorId>> = BTreeMap::new();
    for assignment in mapping.assignments() {
        let name = assignment.creator_name.as_str();
        if wanted.contains(name) && !id_covered.contains(&assignment.creator_id) {
            by_name.entry(name).or_default().insert(assignment.creator_id);
        }
    }

    match by_name.into_iter().find(|(_, ids)| ids.len() > 1) {
        Some((name, ids)) => Err(CascadeError::AmbiguousName {
            name: name.to_string(),
            ids: ids.into_iter().collect(),
        }),
        None => Ok(()),
    }
}
