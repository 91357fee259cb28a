use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::identifiers::CreatorId;

/// Score components of one category for one profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: String,
    pub keyword: u64,
    pub zone: u64,
    pub name_pattern: u64,
    pub total: u64,
}

/// Every category that received a non-zero score, in rule set order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub winning_score: u64,
    pub scores: Vec<CategoryScore>,
}

/// The engine's output unit: one creator placed in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryAssignment {
    pub creator_id: CreatorId,
    pub creator_name: String,
    pub category: String,
    /// Generated for human audit, never treated as ground truth.
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_breakdown: Option<ScoreBreakdown>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CategoryBucket {
    category: String,
    assignments: Vec<CategoryAssignment>,
}

/// Category name -> assignments, in review order.
///
/// Buckets are ordered by descending size with an alphabetical tie-break,
/// assignments inside a bucket by creator name then id. Empty buckets never
/// exist. Serializes as an ordered JSON object and deserializes without
/// reordering, so a persisted mapping round-trips byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CategoryMapping {
    buckets: Vec<CategoryBucket>,
}

impl CategoryMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group assignments by their category and apply the canonical ordering.
    pub fn from_assignments<I>(assignments: I) -> Self
    where
        I: IntoIterator<Item = CategoryAssignment>,
    {
        let mut grouped: BTreeMap<String, Vec<CategoryAssignment>> = BTreeMap::new();
        for assignment in assignments {
            grouped
                .entry(assignment.category.clone())
                .or_default()
                .push(assignment);
        }

        let mut buckets: Vec<CategoryBucket> = grouped
            .into_iter()
            .map(|(category, mut assignments)| {
                assignments.sort_by(|a, b| {
                    a.creator_name
                        .cmp(&b.creator_name)
                        .then_with(|| a.creator_id.cmp(&b.creator_id))
                });
                CategoryBucket {
                    category,
                    assignments,
                }
            })
            .collect();

        // BTreeMap iteration already yields names ascending; the sort is stable.
        buckets.sort_by(|a, b| b.assignments.len().cmp(&a.assignments.len()));

        debug_assert!(buckets.windows(2).all(|w| {
            let (a, b) = (&w[0], &w[1]);
            a.assignments.len() > b.assignments.len()
                || (a.assignments.len() == b.assignments.len() && a.category < b.category)
        }));

        Self { buckets }
    }

    /// Re-derive the canonical ordering from this mapping's assignments.
    pub fn normalized(&self) -> Self {
        Self::from_assignments(self.assignments().cloned())
    }

    pub fn is_normalized(&self) -> bool {
        *self == self.normalized()
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.buckets.iter().map(|b| b.category.as_str())
    }

    pub fn get(&self, category: &str) -> Option<&[CategoryAssignment]> {
        self.buckets
            .iter()
            .find(|b| b.category == category)
            .map(|b| b.assignments.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[CategoryAssignment])> {
        self.buckets
            .iter()
            .map(|b| (b.category.as_str(), b.assignments.as_slice()))
    }

    /// All assignments, bucket by bucket.
    pub fn assignments(&self) -> impl Iterator<Item = &CategoryAssignment> {
        self.buckets.iter().flat_map(|b| b.assignments.iter())
    }

    pub fn into_assignments(self) -> Vec<CategoryAssignment> {
        self.buckets
            .into_iter()
            .flat_map(|b| b.assignments.into_iter())
            .collect()
    }

    pub fn find(&self, id: CreatorId) -> Option<&CategoryAssignment> {
        self.assignments().find(|a| a.creator_id == id)
    }

    /// Number of non-empty categories.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn total_assignments(&self) -> usize {
        self.buckets.iter().map(|b| b.assignments.len()).sum()
    }

    pub fn summary(&self) -> MappingSummary {
        MappingSummary {
            total_creators: self.total_assignments(),
            category_count: self.len(),
            counts: self
                .buckets
                .iter()
                .map(|b| CategoryCount {
                    category: b.category.clone(),
                    count: b.assignments.len(),
                })
                .collect(),
        }
    }

    /// Creators whose bucket differs between `before` and `self`.
    ///
    /// Creators are matched by id. Sorted by creator name, then id.
    pub fn moves_since(&self, before: &CategoryMapping) -> Vec<AssignmentMove> {
        let old: BTreeMap<CreatorId, &CategoryAssignment> =
            before.assignments().map(|a| (a.creator_id, a)).collect();
        let new: BTreeMap<CreatorId, &CategoryAssignment> =
            self.assignments().map(|a| (a.creator_id, a)).collect();

        let mut moves = Vec::new();

        for (id, prev) in &old {
            match new.get(id) {
                Some(next) if next.category == prev.category => {}
                Some(next) => moves.push(AssignmentMove {
                    creator_id: *id,
                    creator_name: next.creator_name.clone(),
                    from: Some(prev.category.clone()),
                    to: Some(next.category.clone()),
                }),
                None => moves.push(AssignmentMove {
                    creator_id: *id,
                    creator_name: prev.creator_name.clone(),
                    from: Some(prev.category.clone()),
                    to: None,
                }),
            }
        }

        for (id, next) in &new {
            if !old.contains_key(id) {
                moves.push(AssignmentMove {
                    creator_id: *id,
                    creator_name: next.creator_name.clone(),
                    from: None,
                    to: Some(next.category.clone()),
                });
            }
        }

        moves.sort_by(|a, b| {
            a.creator_name
                .cmp(&b.creator_name)
                .then_with(|| a.creator_id.cmp(&b.creator_id))
        });
        moves
    }
}

impl Serialize for CategoryMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.buckets.len()))?;
        for bucket in &self.buckets {
            map.serialize_entry(&bucket.category, &bucket.assignments)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CategoryMapping {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(MappingVisitor)
    }
}

struct MappingVisitor;

impl<'de> Visitor<'de> for MappingVisitor {
    type Value = CategoryMapping;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an object of category name to assignment list")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut buckets: Vec<CategoryBucket> = Vec::new();
        let mut seen: BTreeSet<CreatorId> = BTreeSet::new();

        while let Some((category, assignments)) =
            access.next_entry::<String, Vec<CategoryAssignment>>()?
        {
            if buckets.iter().any(|b| b.category == category) {
                return Err(de::Error::custom(format!("duplicate category `{category}`")));
            }
            if assignments.is_empty() {
                return Err(de::Error::custom(format!("category `{category}` is empty")));
            }
            if let Some(stray) = assignments.iter().find(|a| a.category != category) {
                return Err(de::Error::custom(format!(
                    "creator {} is listed under `{category}` but assigned to `{}`",
                    stray.creator_id, stray.category
                )));
            }
            // A creator sits in exactly one bucket
            if let Some(repeat) = assignments.iter().find(|a| !seen.insert(a.creator_id)) {
                return Err(de::Error::custom(format!(
                    "duplicate creator id {} (listed again under `{category}`)",
                    repeat.creator_id
                )));
            }
            buckets.push(CategoryBucket {
                category,
                assignments,
            });
        }

        Ok(CategoryMapping { buckets })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

/// Bucket sizes in mapping order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingSummary {
    pub total_creators: usize,
    pub category_count: usize,
    pub counts: Vec<CategoryCount>,
}

/// One creator's change of bucket between two mappings.
/// `from: None` means newly added, `to: None` means removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentMove {
    pub creator_id: CreatorId,
    pub creator_name: String,
    pub from: Option<String>,
    pub to: Option<String>,
}
