//! Revision records: a versioned snapshot plus who made it and what changed.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::field_diff::FieldChanges;
use crate::snapshot::{Snapshot, SnapshotField};
use crate::types::{DbId, Timestamp};

/// Why a revision was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevisionKind {
    /// Recorded by a regular save.
    Auto,
    /// Explicit checkpoint, including restores.
    Manual,
    Publish,
}

impl RevisionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Manual => "manual",
            Self::Publish => "publish",
        }
    }
}

impl std::fmt::Display for RevisionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RevisionKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "manual" => Ok(Self::Manual),
            "publish" => Ok(Self::Publish),
            other => Err(CoreError::Validation(format!(
                "Invalid revision kind '{other}'. Must be one of: auto, manual, publish"
            ))),
        }
    }
}

/// The user a revision is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Editor {
    pub id: DbId,
    pub name: String,
    pub email: String,
}

/// Changes relative to the previous revision, cached at creation time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevisionDiff {
    pub fields_changed: Vec<SnapshotField>,
    pub added_tags: Vec<String>,
    pub removed_tags: Vec<String>,
    pub content_length_change: i64,
}

impl From<&FieldChanges> for RevisionDiff {
    fn from(changes: &FieldChanges) -> Self {
        Self {
            fields_changed: changes.changed_fields(),
            added_tags: changes.added_tags.clone(),
            removed_tags: changes.removed_tags.clone(),
            content_length_change: changes.content_length_change,
        }
    }
}

/// A stored, immutable entry in a post's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revision {
    pub id: DbId,
    pub post_id: DbId,
    /// 1-based, strictly increasing per post, never reused.
    pub version: i32,
    pub snapshot: Snapshot,
    pub edited_by: Editor,
    pub created_at: Timestamp,
    pub kind: RevisionKind,
    pub changes_summary: String,
    pub diff: RevisionDiff,
}

impl Revision {
    pub fn summary(&self) -> RevisionSummary {
        RevisionSummary {
            version: self.version,
            kind: self.kind,
            edited_by_name: self.edited_by.name.clone(),
            created_at: self.created_at,
            changes_summary: self.changes_summary.clone(),
            fields_changed: self.diff.fields_changed.clone(),
        }
    }
}

/// Timeline row shown in the revision list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevisionSummary {
    pub version: i32,
    pub kind: RevisionKind,
    pub edited_by_name: String,
    pub created_at: Timestamp,
    pub changes_summary: String,
    pub fields_changed: Vec<SnapshotField>,
}

/// A caller's request to record a snapshot.
#[derive(Debug, Clone)]
pub struct NewRevision {
    pub post_id: DbId,
    pub snapshot: Snapshot,
    pub edited_by: Editor,
    pub kind: RevisionKind,
    /// Overrides the summary derived from the field comparison.
    pub summary: Option<String>,
}

impl NewRevision {
    pub fn new(post_id: DbId, snapshot: Snapshot, edited_by: Editor, kind: RevisionKind) -> Self {
        Self {
            post_id,
            snapshot,
            edited_by,
            kind,
            summary: None,
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }
}

/// A fully derived revision waiting for the backend to assign its id.
#[derive(Debug, Clone)]
pub struct PendingRevision {
    pub post_id: DbId,
    pub version: i32,
    pub snapshot: Snapshot,
    pub edited_by: Editor,
    pub kind: RevisionKind,
    pub changes_summary: String,
    pub diff: RevisionDiff,
    pub created_at: Timestamp,
}

impl PendingRevision {
    pub fn into_revision(self, id: DbId) -> Revision {
        Revision {
            id,
            post_id: self.post_id,
            version: self.version,
            snapshot: self.snapshot,
            edited_by: self.edited_by,
            created_at: self.created_at,
            kind: self.kind,
            changes_summary: self.changes_summary,
            diff: self.diff,
        }
    }
}
