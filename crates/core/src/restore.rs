//! Restoring a post to an earlier revision.
//!
//! A restore never rewrites history. It appends a new revision carrying the
//! target's snapshot and then asks the post-storage collaborator to make that
//! snapshot live. The live state being replaced is first recorded as its own
//! revision when it is not already the latest one.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::CoreError;
use crate::field_diff::has_changes;
use crate::history::RevisionStore;
use crate::locks::PostGuard;
use crate::revision::{Editor, NewRevision, Revision, RevisionKind};
use crate::snapshot::Snapshot;
use crate::types::DbId;

/// The post-storage collaborator that owns the live post content.
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn current_snapshot(&self, post_id: DbId) -> Result<Snapshot, CoreError>;

    async fn set_current_snapshot(&self, post_id: DbId, snapshot: &Snapshot) -> Result<(), CoreError>;
}

/// Summary recorded on the revisions produced by a restore: the restore
/// itself and, when one is taken, the capture of the replaced live state.
pub fn restore_summary(version: i32) -> String {
    format!("Restored to version {version}")
}

/// Result of a successful restore.
#[derive(Debug, Clone)]
pub struct RestoreOutcome {
    /// The snapshot that is now live.
    pub snapshot: Snapshot,
    /// The revision recording the restore.
    pub revision: Revision,
    /// The revision capturing the replaced live state, if one was needed.
    pub safety_revision: Option<Revision>,
    pub restored_from: i32,
}

pub struct RestoreController {
    store: Arc<RevisionStore>,
    posts: Arc<dyn PostStore>,
}

impl RestoreController {
    pub fn new(store: Arc<RevisionStore>, posts: Arc<dyn PostStore>) -> Self {
        Self { store, posts }
    }

    /// Make revision `target_version` the live state of `post_id`.
    ///
    /// If any history append fails the live post is left untouched. If the
    /// final live update fails the restore revision is already recorded and
    /// the error is returned; callers retry the whole restore.
    pub async fn restore(
        &self,
        post_id: DbId,
        target_version: i32,
        actor: &Editor,
    ) -> Result<RestoreOutcome, CoreError> {
        let guard = self.store.lock_post(post_id).await;
        let target = self.store.get_by_version(post_id, target_version).await?;

        let safety_revision = if self.store.policy().snapshot_before_restore {
            self.capture_live_state(&guard, target_version, actor).await?
        } else {
            None
        };

        let revision = self
            .store
            .append_locked(
                &guard,
                NewRevision::new(post_id, target.snapshot, actor.clone(), RevisionKind::Manual)
                    .with_summary(restore_summary(target_version)),
            )
            .await?;

        if let Err(err) = self.posts.set_current_snapshot(post_id, &revision.snapshot).await {
            tracing::error!(
                post_id,
                restored_from = target_version,
                revision = revision.version,
                error = %err,
                "Restore recorded in history but live post update failed"
            );
            return Err(err);
        }

        tracing::info!(
            post_id,
            restored_from = target_version,
            new_version = revision.version,
            user_id = actor.id,
            "Post restored"
        );

        Ok(RestoreOutcome {
            snapshot: revision.snapshot.clone(),
            revision,
            safety_revision,
            restored_from: target_version,
        })
    }

    /// Record the live post if it differs from the latest stored revision.
    async fn capture_live_state(
        &self,
        guard: &PostGuard,
        target_version: i32,
        actor: &Editor,
    ) -> Result<Option<Revision>, CoreError> {
        let post_id = guard.post_id();
        let live = match self.posts.current_snapshot(post_id).await {
            Ok(snapshot) => snapshot,
            // Nothing live yet, so nothing can be lost.
            Err(CoreError::NotFound { .. }) => return Ok(None),
            Err(err) => return Err(err),
        };

        let latest = self.store.latest(post_id).await?;
        if latest.is_some_and(|r| !has_changes(&r.snapshot, &live)) {
            return Ok(None);
        }

        let revision = self
            .store
            .append_locked(
                guard,
                NewRevision::new(post_id, live, actor.clone(), RevisionKind::Manual)
                    .with_summary(restore_summary(target_version)),
            )
            .await?;
        tracing::debug!(post_id, version = revision.version, "Captured live state before restore");
        Ok(Some(revision))
    }
}
