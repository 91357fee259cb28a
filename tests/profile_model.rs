use bucket_core::profile::{CreatorId, CreatorProfile};

#[test]
fn invariant_missing_and_null_fields_decode_to_empty() {
    let json = r#"{
        "id": 7,
        "name": "Alice",
        "bio": null,
        "collections": null,
        "tags": ["math"]
    }"#;

    let profile: CreatorProfile = serde_json::from_str(json).unwrap();

    assert_eq!(profile.id, CreatorId::new(7));
    assert_eq!(profile.name, "Alice");
    assert_eq!(profile.bio, "");
    assert_eq!(profile.verification_text, "");
    assert!(profile.collections.is_empty());
    assert!(profile.series.is_empty());
    assert!(profile.recent_post_titles.is_empty());
    assert!(profile.content_zones.is_empty());
    assert!(profile.article_titles.is_empty());
    assert_eq!(profile.note, "");
    assert_eq!(profile.tags, vec!["math".to_string()]);
}

#[test]
fn invariant_id_is_required() {
    let result: Result<CreatorProfile, _> = serde_json::from_str(r#"{"name": "NoId"}"#);
    assert!(result.is_err());
}

#[test]
fn invariant_searchable_text_is_case_folded_in_field_order() {
    let profile = CreatorProfile::new(1u64, "Name Is Not Text")
        .with_bio("Bio")
        .with_verification_text("Verified")
        .with_collections(["Col A", "Col B"])
        .with_series(["Series"])
        .with_recent_post_titles(["Post"])
        .with_tags(["Tag", "Tag"])
        .with_article_titles(["Article"])
        .with_note("NOTE never scored");

    let text = profile.searchable_text();

    assert_eq!(text, "bio\nverified\ncol a\ncol b\nseries\npost\ntag\narticle");
    assert!(!text.contains("note"));
    assert!(!text.contains("name is not text"));
}

#[test]
fn invariant_empty_profile_has_empty_text() {
    let profile = CreatorProfile::new(1u64, "Empty");
    assert_eq!(profile.searchable_text(), "");
    assert!(profile.folded_zones().is_empty());
}

#[test]
fn invariant_zones_are_folded_and_deduplicated() {
    let profile =
        CreatorProfile::new(1u64, "Z").with_content_zones(["Science", " science ", "GAMES", ""]);

    let zones: Vec<String> = profile.folded_zones().into_iter().collect();
    assert_eq!(zones, vec!["games".to_string(), "science".to_string()]);
}

#[test]
fn invariant_profile_roundtrips_through_json() {
    let profile = CreatorProfile::new(99u64, "Round")
        .with_bio("trip")
        .with_tags(["a", "b"])
        .with_note("kept");

    let json = serde_json::to_string(&profile).unwrap();
    let back: CreatorProfile = serde_json::from_str(&json).unwrap();

    assert_eq!(back, profile);
}
