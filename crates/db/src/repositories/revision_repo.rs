//! Repository for the `revisions` table.
//!
//! Revisions are immutable once inserted. The only delete is capped-history
//! eviction, which always keeps the newest rows.

use folio_core::revision::PendingRevision;
use folio_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::revision::RevisionRow;

/// Column list for revisions queries.
const COLUMNS: &str = "id, post_id, version, snapshot, editor_id, editor_name, editor_email, \
                       kind, changes_summary, diff, created_at";

/// Provides insert, read, and eviction operations for post revisions.
pub struct RevisionRepo;

impl RevisionRepo {
    /// Insert a fully derived revision. The `(post_id, version)` unique
    /// constraint rejects a version another writer already took.
    pub async fn create(pool: &PgPool, pending: &PendingRevision) -> Result<RevisionRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO revisions
                (post_id, version, snapshot, editor_id, editor_name, editor_email,
                 kind, changes_summary, diff, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RevisionRow>(&query)
            .bind(pending.post_id)
            .bind(pending.version)
            .bind(Json(&pending.snapshot))
            .bind(pending.edited_by.id)
            .bind(&pending.edited_by.name)
            .bind(&pending.edited_by.email)
            .bind(pending.kind.as_str())
            .bind(&pending.changes_summary)
            .bind(Json(&pending.diff))
            .bind(pending.created_at)
            .fetch_one(pool)
            .await
    }

    /// The highest-versioned revision of a post.
    pub async fn find_latest(pool: &PgPool, post_id: DbId) -> Result<Option<RevisionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM revisions
             WHERE post_id = $1
             ORDER BY version DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, RevisionRow>(&query)
            .bind(post_id)
            .fetch_optional(pool)
            .await
    }

    /// List all retained revisions for a post, ordered newest first.
    pub async fn list_by_post(pool: &PgPool, post_id: DbId) -> Result<Vec<RevisionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM revisions
             WHERE post_id = $1
             ORDER BY version DESC"
        );
        sqlx::query_as::<_, RevisionRow>(&query)
            .bind(post_id)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_post_and_version(
        pool: &PgPool,
        post_id: DbId,
        version: i32,
    ) -> Result<Option<RevisionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM revisions
             WHERE post_id = $1 AND version = $2"
        );
        sqlx::query_as::<_, RevisionRow>(&query)
            .bind(post_id)
            .bind(version)
            .fetch_optional(pool)
            .await
    }

    /// Delete every revision of a post except the newest `keep`.
    ///
    /// Returns the number of rows removed.
    pub async fn delete_beyond(pool: &PgPool, post_id: DbId, keep: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM revisions
             WHERE post_id = $1
               AND version NOT IN (
                   SELECT version FROM revisions
                   WHERE post_id = $1
                   ORDER BY version DESC
                   LIMIT $2
               )",
        )
        .bind(post_id)
        .bind(keep)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
