//! Revision model.
//!
//! Snapshots and cached diffs are stored as JSONB; the editor is denormalized
//! into three columns so history survives user renames.

use folio_core::error::CoreError;
use folio_core::revision::{Editor, Revision, RevisionDiff, RevisionKind};
use folio_core::snapshot::Snapshot;
use folio_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `revisions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RevisionRow {
    pub id: DbId,
    pub post_id: DbId,
    pub version: i32,
    pub snapshot: Json<Snapshot>,
    pub editor_id: DbId,
    pub editor_name: String,
    pub editor_email: String,
    pub kind: String,
    pub changes_summary: String,
    pub diff: Json<RevisionDiff>,
    pub created_at: Timestamp,
}

impl TryFrom<RevisionRow> for Revision {
    type Error = CoreError;

    fn try_from(row: RevisionRow) -> Result<Self, Self::Error> {
        let kind: RevisionKind = row.kind.parse().map_err(|_| {
            CoreError::Internal(format!(
                "Revision {} has unknown kind '{}'",
                row.id, row.kind
            ))
        })?;

        Ok(Revision {
            id: row.id,
            post_id: row.post_id,
            version: row.version,
            snapshot: row.snapshot.0,
            edited_by: Editor {
                id: row.editor_id,
                name: row.editor_name,
                email: row.editor_email,
            },
            created_at: row.created_at,
            kind,
            changes_summary: row.changes_summary,
            diff: row.diff.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use folio_core::snapshot::SnapshotField;

    use super::*;

    fn row(kind: &str) -> RevisionRow {
        RevisionRow {
            id: 41,
            post_id: 9,
            version: 3,
            snapshot: Json(Snapshot {
                title: "Sourdough".into(),
                content: "Feed the starter.".into(),
                tags: vec!["bread".into()],
                ..Default::default()
            }),
            editor_id: 5,
            editor_name: "Ada".into(),
            editor_email: "ada@example.com".into(),
            kind: kind.into(),
            changes_summary: "Updated content".into(),
            diff: Json(RevisionDiff {
                fields_changed: vec![SnapshotField::Content],
                content_length_change: 4,
                ..Default::default()
            }),
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn row_converts_to_revision() {
        let revision = Revision::try_from(row("publish")).unwrap();
        assert_eq!(revision.id, 41);
        assert_eq!(revision.version, 3);
        assert_eq!(revision.kind, RevisionKind::Publish);
        assert_eq!(revision.edited_by.name, "Ada");
        assert_eq!(revision.snapshot.title, "Sourdough");
        assert_eq!(revision.diff.fields_changed, vec![SnapshotField::Content]);
    }

    #[test]
    fn unknown_kind_is_internal_error() {
        assert_matches!(
            Revision::try_from(row("draft")),
            Err(CoreError::Internal(msg)) if msg.contains("draft")
        );
    }

    #[test]
    fn diff_column_accepts_empty_object() {
        let diff: RevisionDiff = serde_json::from_str("{}").unwrap();
        assert_eq!(diff, RevisionDiff::default());
    }
}
