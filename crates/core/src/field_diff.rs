//! Field-by-field snapshot comparison and change summaries.
//!
//! Scalar fields compare on trimmed values, with a missing value and an empty
//! string treated as the same "empty". Tags compare as sets. The raw values
//! are kept on both sides so a UI can render exactly what was stored.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::Value;

use crate::diff::DiffStatus;
use crate::snapshot::{Snapshot, SnapshotField};

/// Summary recorded for the first revision of a post.
pub const INITIAL_VERSION_SUMMARY: &str = "Initial version";

/// Summary recorded when a save changed nothing.
pub const NO_CHANGES_SUMMARY: &str = "No changes";

/// The comparison of one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDiff {
    pub field: SnapshotField,
    pub old_value: Value,
    pub new_value: Value,
    pub changed: bool,
    pub status: DiffStatus,
}

/// Result of comparing two snapshots field by field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChanges {
    pub fields: BTreeMap<SnapshotField, FieldDiff>,
    /// Tags present only in the new snapshot, sorted.
    pub added_tags: Vec<String>,
    /// Tags present only in the old snapshot, sorted.
    pub removed_tags: Vec<String>,
    /// `chars(new.content) - chars(old.content)`.
    pub content_length_change: i64,
}

impl FieldChanges {
    /// Changed fields in summary order.
    pub fn changed_fields(&self) -> Vec<SnapshotField> {
        self.fields
            .values()
            .filter(|d| d.changed)
            .map(|d| d.field)
            .collect()
    }

    pub fn is_changed(&self, field: SnapshotField) -> bool {
        self.fields.get(&field).is_some_and(|d| d.changed)
    }

    pub fn has_changes(&self) -> bool {
        self.fields.values().any(|d| d.changed)
    }
}

/// Compare `old` against `new` across every [`SnapshotField`].
pub fn compare(old: &Snapshot, new: &Snapshot) -> FieldChanges {
    let old_tags = old.tag_set();
    let new_tags = new.tag_set();
    let added_tags: Vec<String> = new_tags.difference(&old_tags).cloned().collect();
    let removed_tags: Vec<String> = old_tags.difference(&new_tags).cloned().collect();

    let fields = SnapshotField::ALL
        .iter()
        .map(|&field| {
            let diff = match field {
                SnapshotField::Title => text_diff(field, &old.title, &new.title),
                SnapshotField::Content => text_diff(field, &old.content, &new.content),
                SnapshotField::Excerpt => text_diff(field, &old.excerpt, &new.excerpt),
                SnapshotField::SeoTitle => text_diff(field, &old.seo_title, &new.seo_title),
                SnapshotField::SeoDescription => {
                    text_diff(field, &old.seo_description, &new.seo_description)
                }
                SnapshotField::FeaturedImageUrl => optional_text_diff(
                    field,
                    old.featured_image_url.as_deref(),
                    new.featured_image_url.as_deref(),
                ),
                SnapshotField::Category => {
                    let changed = old.category != new.category;
                    FieldDiff {
                        field,
                        old_value: old.category.map_or(Value::Null, Value::from),
                        new_value: new.category.map_or(Value::Null, Value::from),
                        changed,
                        status: DiffStatus::classify(
                            old.category.is_none(),
                            new.category.is_none(),
                            changed,
                        ),
                    }
                }
                SnapshotField::Tags => tags_diff(
                    old,
                    new,
                    &old_tags,
                    &new_tags,
                    !added_tags.is_empty() || !removed_tags.is_empty(),
                ),
            };
            (field, diff)
        })
        .collect();

    FieldChanges {
        fields,
        added_tags,
        removed_tags,
        content_length_change: new.content_chars() as i64 - old.content_chars() as i64,
    }
}

/// Whether any field differs between the two snapshots.
pub fn has_changes(old: &Snapshot, new: &Snapshot) -> bool {
    compare(old, new).has_changes()
}

/// Build the human-readable summary stored on a revision.
///
/// `None` means there was no earlier revision to compare with. Only the
/// [`SnapshotField::SUMMARY`] fields are named.
pub fn changes_summary(changes: Option<&FieldChanges>) -> String {
    let Some(changes) = changes else {
        return INITIAL_VERSION_SUMMARY.to_string();
    };
    let labels: Vec<&str> = changes
        .changed_fields()
        .iter()
        .filter(|field| field.is_summarized())
        .map(SnapshotField::label)
        .collect();
    if labels.is_empty() {
        NO_CHANGES_SUMMARY.to_string()
    } else {
        format!("Updated {}", labels.join(", "))
    }
}

fn text_diff(field: SnapshotField, old: &str, new: &str) -> FieldDiff {
    let (old_trim, new_trim) = (old.trim(), new.trim());
    let changed = old_trim != new_trim;
    FieldDiff {
        field,
        old_value: Value::String(old.to_string()),
        new_value: Value::String(new.to_string()),
        changed,
        status: DiffStatus::classify(old_trim.is_empty(), new_trim.is_empty(), changed),
    }
}

fn optional_text_diff(field: SnapshotField, old: Option<&str>, new: Option<&str>) -> FieldDiff {
    let mut diff = text_diff(field, old.unwrap_or(""), new.unwrap_or(""));
    if old.is_none() {
        diff.old_value = Value::Null;
    }
    if new.is_none() {
        diff.new_value = Value::Null;
    }
    diff
}

fn tags_diff(
    old: &Snapshot,
    new: &Snapshot,
    old_tags: &BTreeSet<String>,
    new_tags: &BTreeSet<String>,
    changed: bool,
) -> FieldDiff {
    FieldDiff {
        field: SnapshotField::Tags,
        old_value: Value::from(old.tags.clone()),
        new_value: Value::from(new.tags.clone()),
        changed,
        status: DiffStatus::classify(old_tags.is_empty(), new_tags.is_empty(), changed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Snapshot {
        Snapshot {
            title: "Lemon tart".into(),
            excerpt: "A sharp, buttery tart.".into(),
            content: "<p>Blind bake the shell.</p>".into(),
            category: Some(3),
            tags: vec!["dessert".into(), "citrus".into()],
            featured_image_url: None,
            seo_title: "Lemon tart recipe".into(),
            seo_description: String::new(),
        }
    }

    fn tags(list: &[&str]) -> Snapshot {
        Snapshot {
            tags: list.iter().map(|t| t.to_string()).collect(),
            ..base()
        }
    }

    #[test]
    fn identical_snapshots_have_no_changes() {
        let changes = compare(&base(), &base());
        assert!(!changes.has_changes());
        assert!(changes.changed_fields().is_empty());
        assert_eq!(changes.content_length_change, 0);
        assert!(!has_changes(&base(), &base()));
    }

    #[test]
    fn whitespace_only_edit_is_not_a_change() {
        let new = Snapshot {
            title: "  Lemon tart \n".into(),
            ..base()
        };
        let changes = compare(&base(), &new);
        assert!(!changes.is_changed(SnapshotField::Title));
        // Raw value is preserved for display.
        assert_eq!(changes.fields[&SnapshotField::Title].new_value, "  Lemon tart \n");
    }

    #[test]
    fn missing_and_empty_image_are_equivalent() {
        let new = Snapshot {
            featured_image_url: Some(String::new()),
            ..base()
        };
        let changes = compare(&base(), &new);
        let diff = &changes.fields[&SnapshotField::FeaturedImageUrl];
        assert!(!diff.changed);
        assert_eq!(diff.old_value, Value::Null);
        assert_eq!(diff.new_value, "");
    }

    #[test]
    fn status_reflects_emptiness() {
        let new = Snapshot {
            seo_description: "Tangy lemon curd in a crisp shell.".into(),
            excerpt: String::new(),
            title: "Lemon meringue tart".into(),
            ..base()
        };
        let changes = compare(&base(), &new);
        assert_eq!(changes.fields[&SnapshotField::SeoDescription].status, DiffStatus::Added);
        assert_eq!(changes.fields[&SnapshotField::Excerpt].status, DiffStatus::Removed);
        assert_eq!(changes.fields[&SnapshotField::Title].status, DiffStatus::Changed);
        assert_eq!(changes.fields[&SnapshotField::Content].status, DiffStatus::Unchanged);
    }

    #[test]
    fn category_compared_by_id() {
        let new = Snapshot {
            category: None,
            ..base()
        };
        let changes = compare(&base(), &new);
        let diff = &changes.fields[&SnapshotField::Category];
        assert!(diff.changed);
        assert_eq!(diff.old_value, 3);
        assert_eq!(diff.new_value, Value::Null);
    }

    #[test]
    fn tag_order_and_duplicates_are_irrelevant() {
        let changes = compare(&tags(&["dessert", "citrus"]), &tags(&["citrus", "dessert", "citrus"]));
        assert!(!changes.is_changed(SnapshotField::Tags));
        assert!(changes.added_tags.is_empty());
        assert!(changes.removed_tags.is_empty());
    }

    #[test]
    fn tag_sets_are_symmetric() {
        let a = tags(&["dessert", "citrus", "baking"]);
        let b = tags(&["citrus", "summer", "no-bake"]);

        let forward = compare(&a, &b);
        assert_eq!(forward.added_tags, vec!["no-bake", "summer"]);
        assert_eq!(forward.removed_tags, vec!["baking", "dessert"]);
        assert!(forward.is_changed(SnapshotField::Tags));

        let backward = compare(&b, &a);
        assert_eq!(backward.added_tags, forward.removed_tags);
        assert_eq!(backward.removed_tags, forward.added_tags);
    }

    #[test]
    fn content_length_change_counts_characters() {
        let new = Snapshot {
            content: "<p>Blind bake the shell until golden.</p>".into(),
            ..base()
        };
        assert_eq!(compare(&base(), &new).content_length_change, 13);
        assert_eq!(compare(&new, &base()).content_length_change, -13);
    }

    // -- changes_summary -----------------------------------------------------

    #[test]
    fn summary_without_previous_is_initial_version() {
        assert_eq!(changes_summary(None), "Initial version");
    }

    #[test]
    fn summary_with_nothing_changed() {
        let changes = compare(&base(), &base());
        assert_eq!(changes_summary(Some(&changes)), "No changes");
    }

    #[test]
    fn summary_lists_labels_in_declared_order() {
        let new = Snapshot {
            tags: vec!["dessert".into()],
            content: "<p>Bake the shell.</p>".into(),
            title: "Lime tart".into(),
            seo_title: "Lime tart recipe".into(),
            ..base()
        };
        let changes = compare(&base(), &new);
        assert_eq!(
            changes_summary(Some(&changes)),
            "Updated title, content, tags"
        );
    }

    #[test]
    fn seo_and_image_edits_stay_out_of_summary() {
        let new = Snapshot {
            seo_title: "Lime tart recipe".into(),
            featured_image_url: Some("/uploads/tart.jpg".into()),
            ..base()
        };
        let changes = compare(&base(), &new);
        assert!(changes.has_changes());
        assert_eq!(
            changes.changed_fields(),
            vec![SnapshotField::FeaturedImageUrl, SnapshotField::SeoTitle]
        );
        assert_eq!(changes_summary(Some(&changes)), NO_CHANGES_SUMMARY);
    }
}
