//! Post snapshots and the typed list of fields they are compared on.
//!
//! A [`Snapshot`] is a value: once built it is never edited in place. Every
//! save produces a fresh one that is wrapped in a new revision.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// The editable state of a post at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    /// Rich-text markup.
    pub content: String,
    #[serde(default)]
    pub category: Option<DbId>,
    /// Blank entries are kept as stored and ignored by comparisons.
    #[serde(default)]
    pub tags: Vec<String>,
    /// `None` and a blank string both mean "no image".
    #[serde(default)]
    pub featured_image_url: Option<String>,
    #[serde(default)]
    pub seo_title: String,
    #[serde(default)]
    pub seo_description: String,
}

impl Snapshot {
    /// Reject snapshots that must not enter history.
    ///
    /// Only title and content are required (blank after trimming counts as
    /// missing). Every other field is accepted as-is so that whatever the
    /// live post holds can always be captured before a restore.
    pub fn validate_for_history(&self) -> Result<(), CoreError> {
        if self.title.trim().is_empty() {
            return Err(CoreError::Validation("Title must not be empty".into()));
        }
        if self.content.trim().is_empty() {
            return Err(CoreError::Validation("Content must not be empty".into()));
        }
        Ok(())
    }

    /// Tags as a set: trimmed, blanks dropped, duplicates collapsed.
    pub fn tag_set(&self) -> BTreeSet<String> {
        self.tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Content length in characters (not bytes).
    pub fn content_chars(&self) -> usize {
        self.content.chars().count()
    }
}

/// A comparable field of a [`Snapshot`].
///
/// Declaration order is the order fields are listed in change summaries and
/// comparison views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotField {
    Title,
    Content,
    Excerpt,
    Category,
    Tags,
    FeaturedImageUrl,
    SeoTitle,
    SeoDescription,
}

impl SnapshotField {
    /// Every field, in declaration order.
    pub const ALL: [SnapshotField; 8] = [
        Self::Title,
        Self::Content,
        Self::Excerpt,
        Self::Category,
        Self::Tags,
        Self::FeaturedImageUrl,
        Self::SeoTitle,
        Self::SeoDescription,
    ];

    /// Fields named in a revision's change summary. Image and SEO edits are
    /// still recorded in the diff but never mentioned in the summary.
    pub const SUMMARY: [SnapshotField; 5] = [
        Self::Title,
        Self::Content,
        Self::Excerpt,
        Self::Category,
        Self::Tags,
    ];

    /// Fields counted by the change badge shown next to a comparison.
    pub const WATCHED: [SnapshotField; 6] = [
        Self::Title,
        Self::Content,
        Self::Excerpt,
        Self::FeaturedImageUrl,
        Self::Category,
        Self::Tags,
    ];

    /// Stable machine name, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Content => "content",
            Self::Excerpt => "excerpt",
            Self::Category => "category",
            Self::Tags => "tags",
            Self::FeaturedImageUrl => "featured_image_url",
            Self::SeoTitle => "seo_title",
            Self::SeoDescription => "seo_description",
        }
    }

    /// Human label used in change summaries.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Content => "content",
            Self::Excerpt => "excerpt",
            Self::Category => "category",
            Self::Tags => "tags",
            Self::FeaturedImageUrl => "featured image",
            Self::SeoTitle => "SEO title",
            Self::SeoDescription => "SEO description",
        }
    }

    pub fn is_watched(&self) -> bool {
        Self::WATCHED.contains(self)
    }

    pub fn is_summarized(&self) -> bool {
        Self::SUMMARY.contains(self)
    }
}

impl std::fmt::Display for SnapshotField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
