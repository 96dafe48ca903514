//! Synthesis lock.
//!
//! One row per story in the lock store. Acquisition is a conditional insert
//! that never blocks or queues: losers are told to retry later. The store is
//! the only source of truth, so independent worker processes exclude each
//! other too.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use loreweave_core::error::DomainError;
use loreweave_core::model::LockHolder;
use loreweave_core::repository::LockStore;
use tracing::{debug, error, instrument};
use uuid::Uuid;

/// Per-story mutual exclusion backed by a [`LockStore`].
#[derive(Clone)]
pub struct SynthesisLock {
    store: Arc<dyn LockStore>,
}

impl SynthesisLock {
    /// Creates a lock over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn LockStore>) -> Self {
        Self { store }
    }

    /// Tries to take the lock. `true` means the caller may proceed.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the store round trip fails.
    #[instrument(skip(self, now), fields(story_id = %story_id))]
    pub async fn acquire(
        &self,
        story_id: Uuid,
        holder: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let acquired = self.store.try_insert(story_id, holder, now).await?;
        debug!(acquired, "synthesis lock attempt");
        Ok(acquired)
    }

    /// Drops the lock row, whoever holds it.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the store round trip fails.
    pub async fn release(&self, story_id: Uuid) -> Result<(), DomainError> {
        self.store.delete(story_id).await
    }

    /// Current holder, for diagnostics.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the store round trip fails.
    pub async fn holder(&self, story_id: Uuid) -> Result<Option<LockHolder>, DomainError> {
        self.store.holder(story_id).await
    }

    /// Acquires the lock and wraps it in a guard that releases it on every
    /// exit path. `None` means somebody else holds it.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the store round trip fails.
    pub async fn guard(
        &self,
        story_id: Uuid,
        holder: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<LockGuard>, DomainError> {
        if self.acquire(story_id, holder, now).await? {
            Ok(Some(LockGuard {
                store: Arc::clone(&self.store),
                story_id,
                released: false,
            }))
        } else {
            Ok(None)
        }
    }
}

/// A held synthesis lock.
///
/// Call [`LockGuard::release`] on the normal path. If the guard is dropped
/// instead (error, timeout, cancelled future), the delete is spawned on the
/// current runtime.
#[must_use = "dropping the guard releases the lock"]
pub struct LockGuard {
    store: Arc<dyn LockStore>,
    story_id: Uuid,
    released: bool,
}

impl LockGuard {
    /// Story this guard locks.
    #[must_use]
    pub fn story_id(&self) -> Uuid {
        self.story_id
    }

    /// Releases the lock now.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the delete fails. The guard
    /// does not retry in that case.
    pub async fn release(mut self) -> Result<(), DomainError> {
        self.released = true;
        self.store.delete(self.story_id).await
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let store = Arc::clone(&self.store);
        let story_id = self.story_id;
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    match store.delete(story_id).await {
                        Ok(()) => debug!(%story_id, "synthesis lock released on drop"),
                        Err(e) => error!(%story_id, error = %e, "failed to release synthesis lock on drop"),
                    }
                });
            }
            Err(_) => {
                error!(%story_id, "no runtime to release synthesis lock; it is orphaned");
            }
        }
    }
}
