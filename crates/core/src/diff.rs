//! Shared diff-status enum for field-level comparisons.
//!
//! Each compared snapshot field is classified by whether its value appeared,
//! disappeared, changed in place, or stayed the same.

use serde::{Deserialize, Serialize};

/// The status of a field in a snapshot comparison.
///
/// - `Added`     -- empty on the old side, set on the new side.
/// - `Removed`   -- set on the old side, empty on the new side.
/// - `Changed`   -- set on both sides with different values.
/// - `Unchanged` -- equivalent on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffStatus {
    Added,
    Removed,
    Changed,
    Unchanged,
}

impl DiffStatus {
    /// Classify a field from the emptiness of each side and whether it changed.
    pub fn classify(old_empty: bool, new_empty: bool, changed: bool) -> Self {
        match (changed, old_empty, new_empty) {
            (false, _, _) => Self::Unchanged,
            (true, true, false) => Self::Added,
            (true, false, true) => Self::Removed,
            (true, _, _) => Self::Changed,
        }
    }

    /// String representation for display, logging, and database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Changed => "changed",
            Self::Unchanged => "unchanged",
        }
    }
}

impl std::fmt::Display for DiffStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
