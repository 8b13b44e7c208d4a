use moka::sync::Cache;
use sfetch_envelope::Nonce;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Outcome of presenting a nonce to the [`ReplayGuard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// First sighting; the nonce is now remembered.
    Fresh,
    /// Already remembered.
    Replayed,
    /// Every slot holds an unexpired nonce; nothing was recorded.
    Full,
}

impl Admission {
    #[must_use]
    pub const fn is_fresh(self) -> bool {
        matches!(self, Self::Fresh)
    }
}

/// Bounded set of recently accepted nonces.
///
/// Entries expire after `retention`, never earlier. When all `capacity` slots hold
/// unexpired nonces, new nonces are refused ([`Admission::Full`]) instead of evicting
/// one that could still be replayed.
#[derive(Clone)]
pub struct ReplayGuard {
    seen: Cache<Nonce, ()>,
    tracked: Arc<AtomicU64>,
    capacity: u64,
    retention: Duration,
}

impl ReplayGuard {
    #[must_use]
    pub fn new(retention: Duration, capacity: u64) -> Self {
        let tracked = Arc::new(AtomicU64::new(0));
        let released = Arc::clone(&tracked);
        let seen = Cache::builder()
            .time_to_live(retention)
            .eviction_listener(move |_nonce, (), _cause| {
                let _ = released.fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                    Some(n.saturating_sub(1))
                });
            })
            .build();
        Self { seen, tracked, capacity, retention }
    }

    /// Records `nonce` unless it is already known or the set is full.
    ///
    /// A single atomic check-and-insert: among concurrent callers presenting the
    /// same nonce exactly one observes [`Admission::Fresh`].
    pub fn check_and_insert(&self, nonce: Nonce) -> Admission {
        if self.seen.contains_key(&nonce) {
            return Admission::Replayed;
        }

        if !self.reserve() {
            // Expired entries are only released during maintenance.
            self.seen.run_pending_tasks();
            if !self.reserve() {
                return Admission::Full;
            }
        }

        if self.seen.entry(nonce).or_insert(()).is_fresh() {
            Admission::Fresh
        } else {
            self.release();
            Admission::Replayed
        }
    }

    #[must_use]
    pub fn contains(&self, nonce: &Nonce) -> bool {
        self.seen.contains_key(nonce)
    }

    /// How long an accepted nonce is remembered.
    #[must_use]
    pub const fn retention(&self) -> Duration {
        self.retention
    }

    #[must_use]
    pub const fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Number of occupied slots, after pending expirations are applied.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.seen.run_pending_tasks();
        self.tracked.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn reserve(&self) -> bool {
        self.tracked
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < self.capacity).then_some(n + 1)
            })
            .is_ok()
    }

    fn release(&self) {
        let _ = self
            .tracked
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| Some(n.saturating_sub(1)));
    }
}

impl fmt::Debug for ReplayGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplayGuard")
            .field("retention", &self.retention)
            .field("capacity", &self.capacity)
            .field("tracked", &self.tracked.load(Ordering::Relaxed))
            .finish()
    }
}
