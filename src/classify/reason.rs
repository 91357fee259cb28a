use crate::profile::CreatorProfile;
use crate::rules::ScoringConfig;

pub const REASON_MANUAL_OVERRIDE: &str = "manual override";
pub const REASON_DEFAULT_CATEGORY: &str = "no distinguishing signal, default category";
pub const REASON_HIGHEST_SCORE: &str = "highest aggregate score";
pub const REASON_MANUAL_CORRECTION: &str = "manual correction";

const PART_SEPARATOR: &str = " | ";
const ELLIPSIS: &str = "...";

/// Short audit text for a scored profile: bio snippet, leading collections
/// and leading tags, whichever are present.
pub fn describe(profile: &CreatorProfile, scoring: &ScoringConfig) -> String {
    let mut parts = Vec::with_capacity(3);

    let bio = profile.bio.trim();
    if !bio.is_empty() {
        parts.push(format!("bio: {}", snippet(bio, scoring.bio_snippet_chars)));
    }

    let collections = leading(&profile.collections, scoring.reason_items);
    if !collections.is_empty() {
        parts.push(format!("collections: {}", collections.join(", ")));
    }

    let tags = leading(&profile.tags, scoring.reason_items);
    if !tags.is_empty() {
        parts.push(format!("tags: {}", tags.join(", ")));
    }

    if parts.is_empty() {
        REASON_HIGHEST_SCORE.to_string()
    } else {
        parts.join(PART_SEPARATOR)
    }
}

/// First `max_chars` characters, with an ellipsis when cut. Whitespace
/// before the ellipsis is dropped.
pub fn snippet(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", text[..cut].trim_end()),
        None => text.to_string(),
    }
}

fn leading(items: &[String], limit: usize) -> Vec<&str> {
    let mut out: Vec<&str> = Vec::with_capacity(limit);
    for item in items.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        if out.len() == limit {
            break;
        }
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}
