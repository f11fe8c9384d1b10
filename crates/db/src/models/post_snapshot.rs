//! Live post state model.

use folio_core::snapshot::Snapshot;
use folio_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `post_snapshots` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PostSnapshotRow {
    pub post_id: DbId,
    pub snapshot: Json<Snapshot>,
    pub updated_at: Timestamp,
}
