//! Renderable comparisons between two snapshots or revisions.
//!
//! The left side is always treated as "old" and the right side as "new"; the
//! caller picks the order. The word diff is only computed when the content
//! field actually changed.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::CoreError;
use crate::field_diff::{compare, FieldDiff};
use crate::revision::Revision;
use crate::snapshot::{Snapshot, SnapshotField};
use crate::word_diff::{diff_words, DiffStats, DiffToken};

/// A comparison ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeSet {
    /// Version of the old side, when it came from a revision.
    pub from_version: Option<i32>,
    /// Version of the new side, when it came from a revision.
    pub to_version: Option<i32>,
    pub field_diffs: BTreeMap<SnapshotField, FieldDiff>,
    /// Word diff of `content`; empty when content is unchanged.
    pub token_diff: Vec<DiffToken>,
    pub token_stats: DiffStats,
    pub fields_changed: Vec<SnapshotField>,
    pub total_changed_fields: usize,
    pub added_tags: Vec<String>,
    pub removed_tags: Vec<String>,
    pub content_length_change: i64,
}

/// Compare revision `a` (old) against revision `b` (new).
///
/// Both revisions must belong to the same post.
pub fn present(a: &Revision, b: &Revision) -> Result<ChangeSet, CoreError> {
    if a.post_id != b.post_id {
        return Err(CoreError::Validation(format!(
            "Cannot compare revisions of different posts ({} and {})",
            a.post_id, b.post_id
        )));
    }
    let mut change_set = present_snapshots(&a.snapshot, &b.snapshot);
    change_set.from_version = Some(a.version);
    change_set.to_version = Some(b.version);
    Ok(change_set)
}

/// Compare two bare snapshots, e.g. a stored revision against the live post.
pub fn present_snapshots(old: &Snapshot, new: &Snapshot) -> ChangeSet {
    let changes = compare(old, new);
    let token_diff = if changes.is_changed(SnapshotField::Content) {
        diff_words(&old.content, &new.content)
    } else {
        Vec::new()
    };
    let fields_changed = changes.changed_fields();

    ChangeSet {
        from_version: None,
        to_version: None,
        token_stats: DiffStats::from_tokens(&token_diff),
        token_diff,
        total_changed_fields: fields_changed.len(),
        fields_changed,
        field_diffs: changes.fields,
        added_tags: changes.added_tags,
        removed_tags: changes.removed_tags,
        content_length_change: changes.content_length_change,
    }
}

/// Number of changed fields among the watched set (title, content, excerpt,
/// featured image, category, tags).
pub fn count_changes(change_set: &ChangeSet) -> usize {
    change_set
        .field_diffs
        .values()
        .filter(|d| d.changed && d.field.is_watched())
        .count()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::revision::{Editor, PendingRevision, RevisionDiff, RevisionKind};
    use crate::word_diff::{reconstruct_new, reconstruct_old, TokenKind};

    fn snap(title: &str, content: &str) -> Snapshot {
        Snapshot {
            title: title.into(),
            content: content.into(),
            tags: vec!["recipe".into()],
            ..Default::default()
        }
    }

    fn revision(post_id: i64, version: i32, snapshot: Snapshot) -> Revision {
        PendingRevision {
            post_id,
            version,
            snapshot,
            edited_by: Editor {
                id: 1,
                name: "Julia".into(),
                email: "julia@example.com".into(),
            },
            kind: RevisionKind::Auto,
            changes_summary: String::new(),
            diff: RevisionDiff::default(),
            created_at: chrono::Utc::now(),
        }
        .into_revision(version as i64)
    }

    #[test]
    fn content_change_carries_word_diff() {
        let a = revision(1, 1, snap("Pesto", "Blend basil and oil."));
        let b = revision(1, 3, snap("Pesto", "Blend basil, pine nuts and oil."));
        let cs = present(&a, &b).unwrap();

        assert_eq!(cs.from_version, Some(1));
        assert_eq!(cs.to_version, Some(3));
        assert_eq!(cs.fields_changed, vec![SnapshotField::Content]);
        assert!(!cs.token_diff.is_empty());
        assert_eq!(reconstruct_old(&cs.token_diff), "Blend basil and oil.");
        assert_eq!(reconstruct_new(&cs.token_diff), "Blend basil, pine nuts and oil.");
        assert!(cs.token_stats.added > 0);
    }

    #[test]
    fn unchanged_content_skips_word_diff() {
        let a = revision(1, 1, snap("Pesto", "Blend basil and oil."));
        let b = revision(1, 2, snap("Basil pesto", "Blend basil and oil."));
        let cs = present(&a, &b).unwrap();
        assert!(cs.token_diff.is_empty());
        assert_eq!(cs.token_stats, DiffStats::default());
        assert_eq!(cs.fields_changed, vec![SnapshotField::Title]);
    }

    #[test]
    fn whitespace_only_content_edit_is_not_diffed() {
        let cs = present_snapshots(&snap("T", "Stir."), &snap("T", "Stir.\n"));
        assert!(cs.token_diff.is_empty());
        assert_eq!(cs.total_changed_fields, 0);
    }

    #[test]
    fn title_and_content_both_reported() {
        let v1 = revision(1, 1, snap("Pesto", "Blend basil."));
        let v3 = revision(1, 3, snap("Genovese pesto", "Pound basil in a mortar."));
        let cs = present(&v1, &v3).unwrap();
        assert!(cs.fields_changed.contains(&SnapshotField::Title));
        assert!(cs.fields_changed.contains(&SnapshotField::Content));
        assert!(cs
            .token_diff
            .iter()
            .any(|t| t.kind == TokenKind::Removed && t.text == "Blend"));
    }

    #[test]
    fn different_posts_are_rejected() {
        let a = revision(1, 1, snap("A", "a"));
        let b = revision(2, 1, snap("B", "b"));
        assert_matches!(present(&a, &b), Err(CoreError::Validation(_)));
    }

    #[test]
    fn count_changes_only_counts_watched_fields() {
        let old = snap("Pesto", "Blend.");
        let new = Snapshot {
            title: "Pesto alla genovese".into(),
            seo_title: "Authentic pesto".into(),
            seo_description: "Basil, pine nuts, parmesan.".into(),
            tags: vec!["recipe".into(), "italian".into()],
            ..old.clone()
        };
        let cs = present_snapshots(&old, &new);
        assert_eq!(cs.total_changed_fields, 4);
        assert_eq!(count_changes(&cs), 2);
        assert_eq!(cs.added_tags, vec!["italian"]);
    }
}
