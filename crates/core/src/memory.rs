//! In-process storage backends.
//!
//! Used by tests and by the API server when no `DATABASE_URL` is configured.
//! Nothing survives a restart.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::CoreError;
use crate::history::RevisionBackend;
use crate::restore::PostStore;
use crate::revision::{PendingRevision, Revision};
use crate::snapshot::Snapshot;
use crate::types::DbId;

/// Revision history held in memory, newest first per post.
pub struct MemoryRevisionBackend {
    revisions: RwLock<HashMap<DbId, VecDeque<Revision>>>,
    next_id: AtomicI64,
}

impl MemoryRevisionBackend {
    pub fn new() -> Self {
        Self {
            revisions: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for MemoryRevisionBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RevisionBackend for MemoryRevisionBackend {
    async fn latest(&self, post_id: DbId) -> Result<Option<Revision>, CoreError> {
        Ok(self
            .revisions
            .read()
            .await
            .get(&post_id)
            .and_then(|history| history.front().cloned()))
    }

    async fn insert(&self, pending: PendingRevision) -> Result<Revision, CoreError> {
        let mut revisions = self.revisions.write().await;
        let history = revisions.entry(pending.post_id).or_default();
        if history.front().is_some_and(|top| top.version >= pending.version) {
            return Err(CoreError::Conflict(format!(
                "Version {} of post {} already exists",
                pending.version, pending.post_id
            )));
        }
        let revision = pending.into_revision(self.next_id.fetch_add(1, Ordering::Relaxed));
        history.push_front(revision.clone());
        Ok(revision)
    }

    async fn list(&self, post_id: DbId) -> Result<Vec<Revision>, CoreError> {
        Ok(self
            .revisions
            .read()
            .await
            .get(&post_id)
            .map(|history| history.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn find(&self, post_id: DbId, version: i32) -> Result<Option<Revision>, CoreError> {
        Ok(self
            .revisions
            .read()
            .await
            .get(&post_id)
            .and_then(|history| history.iter().find(|r| r.version == version).cloned()))
    }

    async fn evict_beyond(&self, post_id: DbId, keep: usize) -> Result<usize, CoreError> {
        let mut revisions = self.revisions.write().await;
        let Some(history) = revisions.get_mut(&post_id) else {
            return Ok(0);
        };
        let excess = history.len().saturating_sub(keep);
        history.truncate(history.len() - excess);
        Ok(excess)
    }

    async fn ping(&self) -> Result<(), CoreError> {
        Ok(())
    }
}

/// Live post state held in memory.
#[derive(Default)]
pub struct MemoryPostStore {
    posts: RwLock<HashMap<DbId, Snapshot>>,
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn current_snapshot(&self, post_id: DbId) -> Result<Snapshot, CoreError> {
        self.posts
            .read()
            .await
            .get(&post_id)
            .cloned()
            .ok_or_else(|| CoreError::post_not_found(post_id))
    }

    async fn set_current_snapshot(&self, post_id: DbId, snapshot: &Snapshot) -> Result<(), CoreError> {
        self.posts.write().await.insert(post_id, snapshot.clone());
        Ok(())
    }
}
