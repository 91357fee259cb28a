use bucket_core::classify::reason::{snippet, REASON_DEFAULT_CATEGORY, REASON_HIGHEST_SCORE, REASON_MANUAL_OVERRIDE};
use bucket_core::classify::{count_occurrences, Scorer, VerdictSource, WeightedKeywordScorer};
use bucket_core::profile::CreatorProfile;
use bucket_core::rules::{NamePattern, RuleSet, RuleSetDefinition};

fn math_life() -> RuleSetDefinition {
    RuleSetDefinition::new(["Math", "Life"], "Life").keyword("Math", "calculus", 10)
}

fn rules(definition: RuleSetDefinition) -> RuleSet {
    RuleSet::new(definition).unwrap()
}

fn score_of(rules: &RuleSet, profile: &CreatorProfile, category: &str) -> u64 {
    WeightedKeywordScorer
        .category_scores(profile, rules)
        .into_iter()
        .find(|s| s.category == category)
        .map(|s| s.total)
        .unwrap()
}

#[test]
fn invariant_manual_override_beats_adversarial_text() {
    let rules = rules(math_life().manual("Bob", "Life").zone("Math", "Science"));
    let profile = CreatorProfile::new(1u64, "Bob")
        .with_bio("calculus calculus calculus calculus calculus calculus")
        .with_tags(["calculus"])
        .with_content_zones(["Science"]);

    let verdict = WeightedKeywordScorer.score(&profile, &rules);

    assert_eq!(verdict.category, "Life");
    assert_eq!(verdict.reason, REASON_MANUAL_OVERRIDE);
    assert_eq!(verdict.source, VerdictSource::Manual);
    assert!(verdict.breakdown.is_none());
}

#[test]
fn invariant_manual_id_beats_manual_name() {
    let rules = rules(math_life().manual("Bob", "Life").manual_id(1u64, "Math"));
    let profile = CreatorProfile::new(1u64, "Bob");

    assert_eq!(WeightedKeywordScorer.score(&profile, &rules).category, "Math");
}

#[test]
fn invariant_keyword_score_monotone_up_to_cap() {
    let rules = rules(math_life());
    let mut previous = 0;

    for count in 0..=5 {
        let bio = vec!["calculus"; count].join(" ");
        let profile = CreatorProfile::new(1u64, "P").with_bio(bio);
        let score = score_of(&rules, &profile, "Math");

        assert_eq!(score, 10 * count as u64);
        assert!(score >= previous);
        previous = score;
    }
}

#[test]
fn invariant_occurrences_beyond_cap_add_nothing() {
    let rules = rules(math_life());
    let five = CreatorProfile::new(1u64, "P").with_bio(vec!["calculus"; 5].join(" "));
    let fifty = CreatorProfile::new(2u64, "Q").with_bio(vec!["calculus"; 50].join(" "));

    assert_eq!(score_of(&rules, &five, "Math"), 50);
    assert_eq!(score_of(&rules, &fifty, "Math"), 50);
}

#[test]
fn invariant_cap_applies_per_keyword_across_fields() {
    let rules = rules(math_life().keyword("Math", "proof", 1));
    let profile = CreatorProfile::new(1u64, "P")
        .with_bio("calculus calculus calculus")
        .with_collections(["Calculus I", "Calculus II", "Calculus III"])
        .with_tags(["proof"]);

    // calculus: 6 occurrences capped at 5; proof: 1
    assert_eq!(score_of(&rules, &profile, "Math"), 10 * 5 + 1);
}

#[test]
fn invariant_empty_profile_gets_default_with_zero_score() {
    let rules = rules(math_life());
    let profile = CreatorProfile::new(1u64, "Nobody");

    let verdict = WeightedKeywordScorer.score(&profile, &rules);

    assert_eq!(verdict.category, "Life");
    assert_eq!(verdict.reason, REASON_DEFAULT_CATEGORY);
    assert_eq!(verdict.source, VerdictSource::Default);
    let breakdown = verdict.breakdown.unwrap();
    assert_eq!(breakdown.winning_score, 0);
    assert!(breakdown.scores.is_empty());
}

#[test]
fn invariant_tie_goes_to_first_listed_category() {
    let definition = RuleSetDefinition::new(["A", "B", "Default"], "Default")
        .keyword("A", "alpha", 10)
        .keyword("B", "beta", 10);
    let rules = rules(definition);

    let profile = CreatorProfile::new(1u64, "Tie")
        .with_bio("alpha alpha alpha alpha alpha beta beta beta beta beta");

    let verdict = WeightedKeywordScorer.score(&profile, &rules);
    assert_eq!(verdict.category, "A");
    assert_eq!(verdict.breakdown.unwrap().winning_score, 50);

    // Listing order, not text order, decides
    let flipped = RuleSetDefinition::new(["B", "A", "Default"], "Default")
        .keyword("A", "alpha", 10)
        .keyword("B", "beta", 10);
    let verdict = WeightedKeywordScorer.score(&profile, &RuleSet::new(flipped).unwrap());
    assert_eq!(verdict.category, "B");
}

#[test]
fn invariant_zone_bonus_is_fixed_per_matching_label() {
    let definition = math_life().zone("Math", "Science").zone("Math", "Knowledge");
    let rules = rules(definition);

    let one = CreatorProfile::new(1u64, "P").with_content_zones(["SCIENCE", "Music"]);
    let two = CreatorProfile::new(2u64, "Q").with_content_zones(["science", "knowledge"]);

    assert_eq!(score_of(&rules, &one, "Math"), 50);
    assert_eq!(score_of(&rules, &two, "Math"), 100);
}

#[test]
fn invariant_zone_bonus_applies_without_any_text() {
    let rules = rules(math_life().zone("Math", "Science"));
    let profile = CreatorProfile::new(1u64, "P").with_content_zones(["Science"]);

    let verdict = WeightedKeywordScorer.score(&profile, &rules);
    assert_eq!(verdict.category, "Math");
    assert_eq!(verdict.source, VerdictSource::Scored);
}

#[test]
fn invariant_every_matching_name_pattern_fires() {
    let definition = math_life()
        .name_pattern(NamePattern::Contains("Math".into()), "Math", 20)
        .name_pattern(NamePattern::Regex(r"^prof\b".into()), "Math", 7)
        .name_pattern(NamePattern::Contains("vlog".into()), "Life", 30);
    let rules = rules(definition);

    let profile = CreatorProfile::new(1u64, "PROF MathLover");
    let scores = WeightedKeywordScorer.category_scores(&profile, &rules);

    assert_eq!(scores[0].category, "Math");
    assert_eq!(scores[0].name_pattern, 27);
    assert_eq!(scores[0].total, 27);
    assert_eq!(scores[1].total, 0);
}

#[test]
fn invariant_keywords_match_case_insensitive_substrings() {
    let rules = rules(RuleSetDefinition::new(["AI", "Life"], "Life").keyword("AI", "GPT", 4));
    let profile = CreatorProfile::new(1u64, "P").with_recent_post_titles(["ChatGPT tricks", "gpt-4 review"]);

    assert_eq!(score_of(&rules, &profile, "AI"), 8);
}

#[test]
fn invariant_keywords_never_span_fields() {
    let rules = rules(RuleSetDefinition::new(["X", "Life"], "Life").keyword("X", "ab", 1));
    let profile = CreatorProfile::new(1u64, "P").with_tags(["a", "b"]);

    assert_eq!(score_of(&rules, &profile, "X"), 0);
}

#[test]
fn invariant_note_never_scores() {
    let rules = rules(math_life());
    let profile = CreatorProfile::new(1u64, "P").with_note("calculus calculus");

    assert_eq!(WeightedKeywordScorer.score(&profile, &rules).category, "Life");
}

#[test]
fn invariant_breakdown_lists_nonzero_categories_in_rule_order() {
    let definition = RuleSetDefinition::new(["A", "B", "C"], "C")
        .keyword("A", "apple", 1)
        .keyword("C", "cherry", 3)
        .zone("A", "Food");
    let rules = rules(definition);
    let profile = CreatorProfile::new(1u64, "P")
        .with_bio("apple cherry")
        .with_content_zones(["Food"]);

    let breakdown = WeightedKeywordScorer.score(&profile, &rules).breakdown.unwrap();
    let listed: Vec<(&str, u64, u64, u64)> = breakdown
        .scores
        .iter()
        .map(|s| (s.category.as_str(), s.keyword, s.zone, s.total))
        .collect();

    assert_eq!(listed, vec![("A", 1, 50, 51), ("C", 3, 0, 3)]);
    assert_eq!(breakdown.winning_score, 51);
}

#[test]
fn invariant_reason_quotes_bio_collections_and_tags() {
    let rules = rules(math_life());
    let profile = CreatorProfile::new(1u64, "P")
        .with_bio("Teaching calculus to everyone who wants to learn it")
        .with_collections(["Limits", "Derivatives", "Integrals", "Series"])
        .with_tags(["math", "math", "calculus"]);

    let verdict = WeightedKeywordScorer.score(&profile, &rules);

    assert_eq!(
        verdict.reason,
        "bio: Teaching calculus to everyone... | collections: Limits, Derivatives, Integrals | tags: math, calculus"
    );
}

#[test]
fn invariant_reason_falls_back_when_nothing_to_quote() {
    let rules = rules(math_life());
    let profile = CreatorProfile::new(1u64, "P").with_recent_post_titles(["calculus"]);

    let verdict = WeightedKeywordScorer.score(&profile, &rules);
    assert_eq!(verdict.category, "Math");
    assert_eq!(verdict.reason, REASON_HIGHEST_SCORE);
}

#[test]
fn invariant_snippet_counts_characters_not_bytes() {
    assert_eq!(snippet("short", 30), "short");
    assert_eq!(snippet("数学分析与高等代数", 4), "数学分析...");
    assert_eq!(snippet("exactly", 7), "exactly");
}

#[test]
fn invariant_occurrence_count_is_non_overlapping_and_capped() {
    assert_eq!(count_occurrences("aaaa", "aa", 10), 2);
    assert_eq!(count_occurrences("x x x x x x x", "x", 5), 5);
    assert_eq!(count_occurrences("anything", "", 5), 0);
}

#[test]
fn invariant_oversized_bonuses_saturate() {
    let mut definition = RuleSetDefinition::new(["A", "B"], "B")
        .zone("A", "x")
        .zone("A", "y")
        .keyword("A", "alpha", u32::MAX);
    definition.scoring.zone_bonus = u64::MAX / 2 + 1;
    let rules = rules(definition);
    let profile = CreatorProfile::new(1u64, "P")
        .with_bio("alpha")
        .with_content_zones(["x", "y"]);

    let verdict = WeightedKeywordScorer.score(&profile, &rules);

    assert_eq!(verdict.category, "A");
    let breakdown = verdict.breakdown.unwrap();
    assert_eq!(breakdown.scores[0].zone, u64::MAX);
    assert_eq!(breakdown.scores[0].keyword, u64::from(u32::MAX));
    assert_eq!(breakdown.winning_score, u64::MAX);
}

#[test]
fn invariant_zone_labels_differing_by_case_earn_one_bonus() {
    let rules = rules(math_life().zone("Math", "Game").zone("Math", "game"));
    let profile = CreatorProfile::new(1u64, "P").with_content_zones(["GAME"]);

    assert_eq!(score_of(&rules, &profile, "Math"), 50);
}
