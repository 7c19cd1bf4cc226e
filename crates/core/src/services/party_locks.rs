//! Per-party serialization of mutating operations.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OwnedMutexGuard;

/// Lazily-allocated per-party async mutexes.
///
/// Every mutating party operation runs its read-decide-write sequence under
/// the party's lock, so concurrent joins cannot overshoot `max_participants`
/// and concurrent votes cannot lose a decrement.
#[derive(Debug, Default, Clone)]
pub struct PartyLocks {
    locks: Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>,
}

impl PartyLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for `party_id`, waiting if another operation on the
    /// same party is in flight.
    ///
    /// Entries no longer held by any guard are evicted on the way in, so the
    /// map only tracks parties with operations in flight.
    pub async fn acquire(&self, party_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self
                .locks
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks
                .entry(party_id.to_string())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_same_party_operations_are_serialized() {
        let locks = PartyLocks::new();
        let in_flight = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let locks = locks.clone();
            let in_flight = in_flight.clone();
            handles.push(tokio::spawn(async move {
                let _guard = locks.acquire("p1").await;
                let active = in_flight.fetch_add(1, Ordering::SeqCst);
                assert_eq!(active, 0);
                tokio::task::yield_now().await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_different_parties_do_not_block_each_other() {
        let locks = PartyLocks::new();
        let _a = locks.acquire("p1").await;
        // Must not deadlock.
        let _b = locks.acquire("p2").await;
    }

    #[tokio::test]
    async fn test_released_entries_are_evicted() {
        let locks = PartyLocks::new();
        drop(locks.acquire("p1").await);
        let _guard = locks.acquire("p2").await;

        let map = locks.locks.lock().unwrap();
        assert!(!map.contains_key("p1"));
        assert!(map.contains_key("p2"));
    }
}
