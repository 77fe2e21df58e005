//! Per-user write serialization.
//!
//! A send is a read-modify-write of the user's conversation. Two concurrent
//! sends for the same user must not interleave, or one pair could be built
//! from a stale history. Different users never contend.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use parley_types::user::UserId;

/// One async mutex per user with an operation in flight.
///
/// An entry lives only while some guard holds or waits on it; the last
/// guard to drop removes it.
#[derive(Default)]
pub struct UserLocks {
    inner: DashMap<UserId, Arc<Mutex<()>>>,
}

/// Exclusive access to one user's conversation.
pub struct UserLockGuard<'a> {
    locks: &'a UserLocks,
    user_id: UserId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `user_id`'s conversation.
    ///
    /// The lock is held until the returned guard is dropped.
    pub async fn lock(&self, user_id: UserId) -> UserLockGuard<'_> {
        // Clone the Arc out so the map shard is released before awaiting.
        let mutex = self
            .inner
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        UserLockGuard {
            locks: self,
            user_id,
            guard: Some(mutex.lock_owned().await),
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.inner.len()
    }
}

impl Drop for UserLockGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Waiters hold their own clone, so a count of one means only the map
        // still references the mutex. New lockers clone under the shard lock
        // that `remove_if` holds, so they cannot slip in between.
        self.locks
            .inner
            .remove_if(&self.user_id, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
