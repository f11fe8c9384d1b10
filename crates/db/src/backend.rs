//! `folio-core` storage traits implemented over PostgreSQL.
//!
//! Every `sqlx::Error` is classified here so nothing above this crate needs
//! to know about sqlx.

use async_trait::async_trait;
use folio_core::error::CoreError;
use folio_core::history::RevisionBackend;
use folio_core::restore::PostStore;
use folio_core::revision::{PendingRevision, Revision};
use folio_core::snapshot::Snapshot;
use folio_core::types::DbId;

use crate::repositories::{PostSnapshotRepo, RevisionRepo};
use crate::DbPool;

/// PostgreSQL unique-constraint violation.
const UNIQUE_VIOLATION: &str = "23505";

/// Classify a sqlx error as a [`CoreError`].
///
/// Unique violations become `Conflict` (another writer took the version);
/// everything else is a retryable `Storage` failure.
pub fn storage_error(err: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            let constraint = db_err.constraint().unwrap_or("unknown");
            return CoreError::Conflict(format!(
                "Duplicate value violates unique constraint: {constraint}"
            ));
        }
    }
    tracing::error!(error = %err, "Database error");
    CoreError::Storage(err.to_string())
}

// ---------------------------------------------------------------------------
// Revisions
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct PgRevisionBackend {
    pool: DbPool,
}

impl PgRevisionBackend {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RevisionBackend for PgRevisionBackend {
    async fn latest(&self, post_id: DbId) -> Result<Option<Revision>, CoreError> {
        RevisionRepo::find_latest(&self.pool, post_id)
            .await
            .map_err(storage_error)?
            .map(Revision::try_from)
            .transpose()
    }

    async fn insert(&self, pending: PendingRevision) -> Result<Revision, CoreError> {
        let row = RevisionRepo::create(&self.pool, &pending)
            .await
            .map_err(storage_error)?;
        Revision::try_from(row)
    }

    async fn list(&self, post_id: DbId) -> Result<Vec<Revision>, CoreError> {
        RevisionRepo::list_by_post(&self.pool, post_id)
            .await
            .map_err(storage_error)?
            .into_iter()
            .map(Revision::try_from)
            .collect()
    }

    async fn find(&self, post_id: DbId, version: i32) -> Result<Option<Revision>, CoreError> {
        RevisionRepo::find_by_post_and_version(&self.pool, post_id, version)
            .await
            .map_err(storage_error)?
            .map(Revision::try_from)
            .transpose()
    }

    async fn evict_beyond(&self, post_id: DbId, keep: usize) -> Result<usize, CoreError> {
        let keep = i64::try_from(keep).unwrap_or(i64::MAX);
        let removed = RevisionRepo::delete_beyond(&self.pool, post_id, keep)
            .await
            .map_err(storage_error)?;
        Ok(usize::try_from(removed).unwrap_or(usize::MAX))
    }

    async fn ping(&self) -> Result<(), CoreError> {
        crate::health_check(&self.pool).await.map_err(storage_error)
    }
}

// ---------------------------------------------------------------------------
// Live posts
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct PgPostStore {
    pool: DbPool,
}

impl PgPostStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn current_snapshot(&self, post_id: DbId) -> Result<Snapshot, CoreError> {
        PostSnapshotRepo::find(&self.pool, post_id)
            .await
            .map_err(storage_error)?
            .map(|row| row.snapshot.0)
            .ok_or_else(|| CoreError::post_not_found(post_id))
    }

    async fn set_current_snapshot(&self, post_id: DbId, snapshot: &Snapshot) -> Result<(), CoreError> {
        PostSnapshotRepo::upsert(&self.pool, post_id, snapshot)
            .await
            .map_err(storage_error)?;
        Ok(())
    }
}
