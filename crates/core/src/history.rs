//! The revision store: a capped, per-post, append-only timeline.
//!
//! [`RevisionStore`] owns the rules (validation, version numbering, diffing
//! against the previous revision, eviction) and delegates persistence to a
//! [`RevisionBackend`]. Appends for the same post are serialized through
//! [`PostLocks`]; reads go straight to the backend.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::CoreError;
use crate::field_diff::{changes_summary, compare};
use crate::locks::{PostGuard, PostLocks};
use crate::revision::{NewRevision, PendingRevision, Revision, RevisionDiff};
use crate::types::DbId;

/// Default number of revisions retained per post.
pub const DEFAULT_HISTORY_CAP: usize = 50;

/// Retention and restore policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryPolicy {
    /// Maximum revisions kept per post (at least 1).
    pub cap: usize,
    /// Record the live post state before a restore overwrites it.
    pub snapshot_before_restore: bool,
}

impl HistoryPolicy {
    pub fn new(cap: usize, snapshot_before_restore: bool) -> Self {
        Self {
            cap: cap.max(1),
            snapshot_before_restore,
        }
    }
}

impl Default for HistoryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAP, true)
    }
}

/// Durable storage for revisions.
///
/// `insert` must publish the revision atomically: concurrent readers see
/// either the whole record or nothing.
#[async_trait]
pub trait RevisionBackend: Send + Sync {
    /// The highest-version revision for the post.
    async fn latest(&self, post_id: DbId) -> Result<Option<Revision>, CoreError>;

    /// Persist a revision and return it with its assigned id.
    async fn insert(&self, pending: PendingRevision) -> Result<Revision, CoreError>;

    /// All retained revisions for the post, most recent first.
    async fn list(&self, post_id: DbId) -> Result<Vec<Revision>, CoreError>;

    async fn find(&self, post_id: DbId, version: i32) -> Result<Option<Revision>, CoreError>;

    /// Delete the oldest revisions so at most `keep` remain. Returns how many
    /// were deleted.
    async fn evict_beyond(&self, post_id: DbId, keep: usize) -> Result<usize, CoreError>;

    /// Cheap liveness check used by the health endpoint.
    async fn ping(&self) -> Result<(), CoreError>;
}

/// Revision timeline for every post.
pub struct RevisionStore {
    backend: Arc<dyn RevisionBackend>,
    locks: PostLocks,
    policy: HistoryPolicy,
}

impl RevisionStore {
    pub fn new(backend: Arc<dyn RevisionBackend>, policy: HistoryPolicy) -> Self {
        Self {
            backend,
            locks: PostLocks::new(),
            policy,
        }
    }

    pub fn policy(&self) -> &HistoryPolicy {
        &self.policy
    }

    /// Take the write lock for a post. Hold the guard across several
    /// [`append_locked`](Self::append_locked) calls to keep them contiguous.
    pub async fn lock_post(&self, post_id: DbId) -> PostGuard {
        self.locks.lock(post_id).await
    }

    /// Record a new revision for `new.post_id`.
    pub async fn append(&self, new: NewRevision) -> Result<Revision, CoreError> {
        let guard = self.lock_post(new.post_id).await;
        self.append_locked(&guard, new).await
    }

    /// Record a new revision while already holding the post's lock.
    pub async fn append_locked(
        &self,
        guard: &PostGuard,
        new: NewRevision,
    ) -> Result<Revision, CoreError> {
        if guard.post_id() != new.post_id {
            return Err(CoreError::Internal(format!(
                "Lock held for post {} but appending to post {}",
                guard.post_id(),
                new.post_id
            )));
        }
        new.snapshot.validate_for_history()?;

        let previous = self.backend.latest(new.post_id).await?;
        let (version, diff, derived_summary) = match &previous {
            Some(prev) => {
                let changes = compare(&prev.snapshot, &new.snapshot);
                (
                    prev.version + 1,
                    RevisionDiff::from(&changes),
                    changes_summary(Some(&changes)),
                )
            }
            None => (1, RevisionDiff::default(), changes_summary(None)),
        };

        let pending = PendingRevision {
            post_id: new.post_id,
            version,
            snapshot: new.snapshot,
            edited_by: new.edited_by,
            kind: new.kind,
            changes_summary: new.summary.unwrap_or(derived_summary),
            diff,
            created_at: chrono::Utc::now(),
        };
        let revision = self.backend.insert(pending).await?;

        tracing::info!(
            post_id = revision.post_id,
            version = revision.version,
            kind = %revision.kind,
            user_id = revision.edited_by.id,
            summary = %revision.changes_summary,
            "Revision recorded"
        );

        self.evict(revision.post_id).await;
        Ok(revision)
    }

    /// Trim history to the cap. Failures are reported but never fail the
    /// append that triggered them.
    async fn evict(&self, post_id: DbId) {
        match self.backend.evict_beyond(post_id, self.policy.cap).await {
            Ok(0) => {}
            Ok(evicted) => {
                tracing::debug!(post_id, evicted, cap = self.policy.cap, "Evicted old revisions");
            }
            Err(err) => {
                tracing::warn!(
                    post_id,
                    cap = self.policy.cap,
                    error = %err,
                    "Failed to evict old revisions; history exceeds cap"
                );
            }
        }
    }

    /// Retained revisions, most recent first. Unknown posts yield an empty list.
    pub async fn list(&self, post_id: DbId) -> Result<Vec<Revision>, CoreError> {
        self.backend.list(post_id).await
    }

    pub async fn get_by_version(&self, post_id: DbId, version: i32) -> Result<Revision, CoreError> {
        self.backend
            .find(post_id, version)
            .await?
            .ok_or_else(|| CoreError::revision_not_found(post_id, version))
    }

    pub async fn latest(&self, post_id: DbId) -> Result<Option<Revision>, CoreError> {
        self.backend.latest(post_id).await
    }

    pub async fn ping(&self) -> Result<(), CoreError> {
        self.backend.ping().await
    }
}
