//! Retention store interface and the in-process backend.
//!
//! Every backend enforces its [`RetentionPolicy`] inside `put`, and every
//! read returns batches ordered by `(created_at, storage key)`.

use std::sync::{Mutex, PoisonError};

use board_core::error::Result;
use tracing::debug;

use crate::batch::Batch;

/// Default capacity of the equipment history.
pub const DEFAULT_CAPACITY: usize = 5;

/// Number of batches shown on list-style reports of a bounded store.
pub const RECENT_WINDOW: usize = 5;

// ── RetentionPolicy ───────────────────────────────────────────────────────────

/// How many batches a store keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionPolicy {
    /// Keep at most `capacity` batches, evicting the oldest.
    Bounded { capacity: usize },
    /// Keep every batch.
    Unbounded,
}

impl RetentionPolicy {
    pub fn capacity(&self) -> Option<usize> {
        match self {
            RetentionPolicy::Bounded { capacity } => Some(*capacity),
            RetentionPolicy::Unbounded => None,
        }
    }
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        RetentionPolicy::Bounded {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

// ── RetentionStore ────────────────────────────────────────────────────────────

/// Keyed store of batches.
///
/// `put` is serialized by each backend so that capacity enforcement and the
/// insert are observed together.
pub trait RetentionStore: Send + Sync {
    fn policy(&self) -> RetentionPolicy;

    /// Persist `batch`, applying the retention policy.
    fn put(&self, batch: Batch) -> Result<()>;

    /// Every stored batch, oldest first.
    fn list_all(&self) -> Result<Vec<Batch>>;

    /// At most `n` batches, newest first.
    fn list_recent(&self, n: usize) -> Result<Vec<Batch>> {
        let mut all = self.list_all()?;
        all.reverse();
        all.truncate(n);
        Ok(all)
    }

    /// The newest batch, if any.
    fn latest(&self) -> Result<Option<Batch>> {
        Ok(self.list_recent(1)?.into_iter().next())
    }

    fn count(&self) -> Result<usize> {
        Ok(self.list_all()?.len())
    }
}

// ── MemoryStore ───────────────────────────────────────────────────────────────

#[derive(Default)]
struct MemoryInner {
    next_seq: u64,
    /// Kept sorted by `(created_at, seq)`.
    entries: Vec<(u64, Batch)>,
}

/// In-process store for either policy.
pub struct MemoryStore {
    policy: RetentionPolicy,
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    pub fn new(policy: RetentionPolicy) -> Self {
        Self {
            policy,
            inner: Mutex::new(MemoryInner::default()),
        }
    }

    pub fn bounded(capacity: usize) -> Self {
        Self::new(RetentionPolicy::Bounded { capacity })
    }

    pub fn unbounded() -> Self {
        Self::new(RetentionPolicy::Unbounded)
    }
}

impl RetentionStore for MemoryStore {
    fn policy(&self) -> RetentionPolicy {
        self.policy
    }

    fn put(&self, batch: Batch) -> Result<()> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.entries.push((seq, batch));
        inner
            .entries
            .sort_by(|(sa, a), (sb, b)| (a.created_at(), sa).cmp(&(b.created_at(), sb)));

        if let Some(capacity) = self.policy.capacity() {
            let excess = inner.entries.len().saturating_sub(capacity);
            if excess > 0 {
                inner.entries.drain(..excess);
                debug!("Evicted {} oldest batch(es) from memory store", excess);
            }
        }

        Ok(())
    }

    fn list_all(&self) -> Result<Vec<Batch>> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(inner.entries.iter().map(|(_, b)| b.clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use board_core::models::Records;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(secs: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, secs).unwrap()
    }

    fn batch(name: &str, secs: u32) -> Batch {
        Batch::assemble(name, None, Records::Headlines(vec![name.to_string()]), at(secs))
    }

    fn names(batches: &[Batch]) -> Vec<String> {
        batches.iter().map(|b| b.source_name().to_string()).collect()
    }

    #[test]
    fn test_bounded_keeps_newest_capacity() {
        let store = MemoryStore::bounded(5);
        for i in 0..12u32 {
            store.put(batch(&format!("b{}", i), i)).unwrap();
            let count = store.count().unwrap();
            assert!(count <= 5, "count {} exceeds capacity after insert {}", count, i);
            assert_eq!(count, (i as usize + 1).min(5));
        }
        let retained = store.list_all().unwrap();
        assert_eq!(names(&retained), vec!["b7", "b8", "b9", "b10", "b11"]);
    }

    #[test]
    fn test_unbounded_keeps_everything() {
        let store = MemoryStore::unbounded();
        for i in 0..20u32 {
            store.put(batch(&format!("b{}", i), i)).unwrap();
        }
        assert_eq!(store.count().unwrap(), 20);
        assert_eq!(store.policy(), RetentionPolicy::Unbounded);
    }

    #[test]
    fn test_list_recent_newest_first() {
        let store = MemoryStore::unbounded();
        store.put(batch("old", 1)).unwrap();
        store.put(batch("mid", 2)).unwrap();
        store.put(batch("new", 3)).unwrap();

        assert_eq!(names(&store.list_recent(2).unwrap()), vec!["new", "mid"]);
        assert_eq!(names(&store.list_recent(10).unwrap()), vec!["new", "mid", "old"]);
        assert_eq!(names(&store.list_all().unwrap()), vec!["old", "mid", "new"]);
    }

    #[test]
    fn test_latest() {
        let store = MemoryStore::bounded(5);
        assert!(store.latest().unwrap().is_none());
        store.put(batch("a", 1)).unwrap();
        store.put(batch("b", 2)).unwrap();
        assert_eq!(store.latest().unwrap().unwrap().source_name(), "b");
    }

    #[test]
    fn test_same_timestamp_orders_by_insertion() {
        let store = MemoryStore::unbounded();
        store.put(batch("first", 5)).unwrap();
        store.put(batch("second", 5)).unwrap();
        assert_eq!(names(&store.list_all().unwrap()), vec!["first", "second"]);
        assert_eq!(store.latest().unwrap().unwrap().source_name(), "second");
    }

    #[test]
    fn test_bounded_evicts_oldest_by_created_at() {
        let store = MemoryStore::bounded(2);
        store.put(batch("late", 9)).unwrap();
        store.put(batch("early", 1)).unwrap();
        store.put(batch("middle", 5)).unwrap();
        assert_eq!(names(&store.list_all().unwrap()), vec!["middle", "late"]);
    }

    #[test]
    fn test_policy_capacity() {
        assert_eq!(RetentionPolicy::default().capacity(), Some(DEFAULT_CAPACITY));
        assert_eq!(RetentionPolicy::Unbounded.capacity(), None);
    }
}
