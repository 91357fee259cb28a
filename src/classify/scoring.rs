use crate::classify::reason::{self, REASON_DEFAULT_CATEGORY, REASON_MANUAL_OVERRIDE};
use crate::profile::CreatorProfile;
use crate::rules::RuleSet;
use crate::types::assignment::{CategoryScore, ScoreBreakdown};

/// Where a verdict came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictSource {
    Manual,
    Scored,
    Default,
}

/// The scorer's decision for one profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub category: String,
    pub reason: String,
    pub source: VerdictSource,
    /// `None` for manual overrides: no scoring takes place.
    pub breakdown: Option<ScoreBreakdown>,
}

pub trait Scorer {
    /// Per-category score components, one entry per category of
    /// `rules.categories()`, in that order.
    fn category_scores(&self, profile: &CreatorProfile, rules: &RuleSet) -> Vec<CategoryScore>;

    /// Manual override first, then strict-maximum selection with a
    /// first-listed tie-break, then the default category.
    fn score(&self, profile: &CreatorProfile, rules: &RuleSet) -> Verdict {
        if let Some(category) = rules.manual_category(profile.id, &profile.name) {
            return Verdict {
                category: category.to_string(),
                reason: REASON_MANUAL_OVERRIDE.to_string(),
                source: VerdictSource::Manual,
                breakdown: None,
            };
        }

        let scores = self.category_scores(profile, rules);
        debug_assert_eq!(scores.len(), rules.categories().len());

        // Strictly greater: an equal later score never displaces an earlier one.
        let mut best: Option<&CategoryScore> = None;
        for candidate in &scores {
            if best.map_or(true, |b| candidate.total > b.total) {
                best = Some(candidate);
            }
        }

        let winner = best.filter(|b| b.total > 0).map(|b| (b.category.clone(), b.total));
        let breakdown = ScoreBreakdown {
            winning_score: winner.as_ref().map_or(0, |(_, total)| *total),
            scores: scores.iter().filter(|s| s.total > 0).cloned().collect(),
        };

        match winner {
            Some((category, _)) => Verdict {
                category,
                reason: reason::describe(profile, rules.scoring()),
                source: VerdictSource::Scored,
                breakdown: Some(breakdown),
            },
            None => Verdict {
                category: rules.default_category().to_string(),
                reason: REASON_DEFAULT_CATEGORY.to_string(),
                source: VerdictSource::Default,
                breakdown: Some(breakdown),
            },
        }
    }
}

/// v0: zone bonus + name-pattern bonus + capped weighted keyword counts.
///
/// Keywords match as case-insensitive literal substrings of the combined
/// profile text; occurrences are counted without overlap.
#[derive(Debug, Default, Clone, Copy)]
pub struct WeightedKeywordScorer;

impl Scorer for WeightedKeywordScorer {
    fn category_scores(&self, profile: &CreatorProfile, rules: &RuleSet) -> Vec<CategoryScore> {
        let text = profile.searchable_text();
        let zones = profile.folded_zones();
        let folded_name = profile.name.to_lowercase();
        let scoring = rules.scoring();

        let mut scores: Vec<CategoryScore> = rules
            .categories()
            .iter()
            .map(|category| CategoryScore {
                category: category.clone(),
                keyword: 0,
                zone: 0,
                name_pattern: 0,
                total: 0,
            })
            .collect();

        for (slot, labels) in rules.zones.iter().enumerate() {
            let hits = labels.iter().filter(|label| zones.contains(*label)).count() as u64;
            let bonus = hits.saturating_mul(scoring.zone_bonus);
            scores[slot].zone = scores[slot].zone.saturating_add(bonus);
        }

        // Every matching rule fires, not just the first.
        for rule in &rules.name_rules {
            if rule.matcher.is_match(&folded_name) {
                let slot = &mut scores[rule.category];
                slot.name_pattern = slot.name_pattern.saturating_add(rule.bonus);
            }
        }

        if !text.is_empty() {
            for (slot, keywords) in rules.keywords.iter().enumerate() {
                for (keyword, weight) in keywords {
                    let occurrences = count_occurrences(&text, keyword, scoring.keyword_occurrence_cap);
                    scores[slot].keyword = scores[slot]
                        .keyword
                        .saturating_add(weight.saturating_mul(occurrences as u64));
                }
            }
        }

        // Totals saturate: an oversized bonus in the config must not wrap.
        for score in &mut scores {
            score.total = score
                .keyword
                .saturating_add(score.zone)
                .saturating_add(score.name_pattern);
        }
        scores
    }
}

/// Non-overlapping occurrences of `needle` in `haystack`, stopping at `cap`.
pub fn count_occurrences(haystack: &str, needle: &str, cap: usize) -> usize {
    if needle.is_empty() {
        return 0;
    }
    haystack.matches(needle).take(cap).count()
}
