use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

use crate::types::identifiers::CreatorId;

/// Joins text fields in the combined search text. A keyword never spans it.
pub const FIELD_SEPARATOR: char = '\n';

/// One content creator's metadata, as supplied by the fetch layer.
///
/// Every text field may be missing or `null` on the wire; both decode to
/// empty. `note` is informational and never scored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatorProfile {
    pub id: CreatorId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bio: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub verification_text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub collections: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub series: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub recent_post_titles: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content_zones: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub article_titles: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub note: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl CreatorProfile {
    pub fn new(id: impl Into<CreatorId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            bio: String::new(),
            verification_text: String::new(),
            collections: Vec::new(),
            series: Vec::new(),
            recent_post_titles: Vec::new(),
            content_zones: Vec::new(),
            tags: Vec::new(),
            article_titles: Vec::new(),
            note: String::new(),
        }
    }

    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = bio.into();
        self
    }

    pub fn with_verification_text(mut self, text: impl Into<String>) -> Self {
        self.verification_text = text.into();
        self
    }

    pub fn with_collections<I, S>(mut self, titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.collections = titles.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_series<I, S>(mut self, titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.series = titles.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_recent_post_titles<I, S>(mut self, titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.recent_post_titles = titles.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_content_zones<I, S>(mut self, zones: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.content_zones = zones.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_article_titles<I, S>(mut self, titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.article_titles = titles.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    /// Case-folded concatenation of every scored text field.
    ///
    /// Order: bio, verification text, collections, series, recent post
    /// titles, tags, article titles. Tags are a set: repeats are dropped.
    pub fn searchable_text(&self) -> String {
        let mut seen_tags = BTreeSet::new();
        let unique_tags = self
            .tags
            .iter()
            .filter(|tag| seen_tags.insert(tag.as_str()));

        let fields = std::iter::once(&self.bio)
            .chain(std::iter::once(&self.verification_text))
            .chain(self.collections.iter())
            .chain(self.series.iter())
            .chain(self.recent_post_titles.iter())
            .chain(unique_tags)
            .chain(self.article_titles.iter())
            .filter(|field| !field.is_empty());

        let mut text = String::new();
        for field in fields {
            if !text.is_empty() {
                text.push(FIELD_SEPARATOR);
            }
            text.push_str(&field.to_lowercase());
        }
        text
    }

    /// Case-folded zone labels, deduplicated.
    pub fn folded_zones(&self) -> BTreeSet<String> {
        self.content_zones
            .iter()
            .map(|zone| zone.trim().to_lowercase())
            .filter(|zone| !zone.is_empty())
            .collect()
    }
}
