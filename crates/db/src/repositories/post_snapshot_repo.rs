//! Repository for the `post_snapshots` table (live post state).

use folio_core::snapshot::Snapshot;
use folio_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::post_snapshot::PostSnapshotRow;

const COLUMNS: &str = "post_id, snapshot, updated_at";

pub struct PostSnapshotRepo;

impl PostSnapshotRepo {
    pub async fn find(pool: &PgPool, post_id: DbId) -> Result<Option<PostSnapshotRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM post_snapshots WHERE post_id = $1");
        sqlx::query_as::<_, PostSnapshotRow>(&query)
            .bind(post_id)
            .fetch_optional(pool)
            .await
    }

    /// Insert or replace the live snapshot of a post.
    pub async fn upsert(
        pool: &PgPool,
        post_id: DbId,
        snapshot: &Snapshot,
    ) -> Result<PostSnapshotRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO post_snapshots (post_id, snapshot)
             VALUES ($1, $2)
             ON CONFLICT (post_id)
             DO UPDATE SET snapshot = EXCLUDED.snapshot, updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PostSnapshotRow>(&query)
            .bind(post_id)
            .bind(Json(snapshot))
            .fetch_one(pool)
            .await
    }
}
