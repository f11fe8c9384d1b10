//! Per-post mutual exclusion for history writes.
//!
//! Appends (and the eviction they trigger) for one post must not interleave,
//! while writes to different posts proceed independently. Each post id maps to
//! its own `tokio` mutex; entries nobody holds or waits on are pruned once the
//! map grows past [`PRUNE_THRESHOLD`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::types::DbId;

/// Number of tracked posts above which idle entries are dropped.
pub const PRUNE_THRESHOLD: usize = 1024;

/// Registry of per-post locks.
#[derive(Default)]
pub struct PostLocks {
    locks: Mutex<HashMap<DbId, Arc<AsyncMutex<()>>>>,
}

/// Proof that the holder has exclusive write access to one post's history.
///
/// Released on drop.
pub struct PostGuard {
    post_id: DbId,
    _guard: OwnedMutexGuard<()>,
}

impl PostGuard {
    pub fn post_id(&self) -> DbId {
        self.post_id
    }
}

impl PostLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `post_id`.
    pub async fn lock(&self, post_id: DbId) -> PostGuard {
        let mutex = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            if locks.len() > PRUNE_THRESHOLD {
                // The map itself holds one reference; anything more is a holder or waiter.
                locks.retain(|_, m| Arc::strong_count(m) > 1);
            }
            Arc::clone(locks.entry(post_id).or_default())
        };
        PostGuard {
            post_id,
            _guard: mutex.lock_owned().await,
        }
    }

    /// Number of posts currently tracked.
    pub fn tracked(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
