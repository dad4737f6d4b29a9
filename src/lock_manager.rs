//! Per-page shared/exclusive locking with upgrades and a timeout standing
//! in for real deadlock detection (see Non-goals in SPEC_FULL.md §1).
//!
//! Locks for all pages live behind one `Mutex<Inner>` plus a `Condvar`
//! notified on every release, so waiters block instead of busy-polling,
//! bounding the total wait at 300ms.

use std::collections::{HashMap, HashSet};
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::{debug, trace};

use crate::page_id::PageId;
use crate::transaction::TransactionId;
use crate::types::VoidResult;
use crate::DbError;

const LOCK_TIMEOUT: Duration = Duration::from_millis(300);
const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LockMode {
    Shared,
    Exclusive,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Permission {
    ReadOnly,
    ReadWrite,
}

impl Permission {
    pub fn to_lock_mode(self) -> LockMode {
        match self {
            Permission::ReadOnly => LockMode::Shared,
            Permission::ReadWrite => LockMode::Exclusive,
        }
    }
}

struct PageLockState {
    mode: LockMode,
    holders: HashSet<TransactionId>,
}

#[derive(Default)]
struct Inner {
    pages: HashMap<PageId, PageLockState>,
    held_by: HashMap<TransactionId, HashSet<PageId>>,
}

impl Inner {
    fn holds(&self, tid: TransactionId, pid: PageId) -> bool {
        self.held_by
            .get(&tid)
            .map(|pages| pages.contains(&pid))
            .unwrap_or(false)
    }
}

/// Guards `{per-page lock state, per-transaction held-page set}` behind one
/// mutex, with a condvar to wake waiters on release.
pub struct LockManager {
    inner: Mutex<Inner>,
    released: Condvar,
}

impl LockManager {
    pub fn new() -> Self {
        LockManager {
            inner: Mutex::new(Inner::default()),
            released: Condvar::new(),
        }
    }

    pub fn holds_lock(&self, tid: TransactionId, pid: PageId) -> bool {
        self.inner.lock().unwrap().holds(tid, pid)
    }

    pub fn acquire(&self, tid: TransactionId, pid: PageId, perm: Permission) -> VoidResult {
        match perm.to_lock_mode() {
            LockMode::Shared => self.acquire_shared(tid, pid),
            LockMode::Exclusive => self.acquire_exclusive(tid, pid),
        }
    }

    pub fn acquire_shared(&self, tid: TransactionId, pid: PageId) -> VoidResult {
        let start = Instant::now();
        let mut guard = self.inner.lock().unwrap();

        if guard.holds(tid, pid) {
            return Ok(());
        }

        loop {
            let blocked = matches!(
                guard.pages.get(&pid),
                Some(state) if state.mode == LockMode::Exclusive
            );
            if !blocked {
                break;
            }
            match self.wait_slice(guard, start) {
                Ok(g) => guard = g,
                Err(timed_out_guard) => return self.timeout(timed_out_guard, tid, pid, "acquire_shared"),
            }
        }

        let state = guard.pages.entry(pid).or_insert_with(|| PageLockState {
            mode: LockMode::Shared,
            holders: HashSet::new(),
        });
        state.mode = LockMode::Shared;
        state.holders.insert(tid);
        guard.held_by.entry(tid).or_default().insert(pid);
        trace!("{} acquired SHARED on {}", tid, pid);
        Ok(())
    }

    pub fn acquire_exclusive(&self, tid: TransactionId, pid: PageId) -> VoidResult {
        let start = Instant::now();
        let mut guard = self.inner.lock().unwrap();

        loop {
            let can_take = match guard.pages.get(&pid) {
                None => true,
                Some(state) => {
                    state.holders.is_empty()
                        || (state.holders.len() == 1 && state.holders.contains(&tid))
                }
            };
            if can_take {
                break;
            }
            match self.wait_slice(guard, start) {
                Ok(g) => guard = g,
                Err(timed_out_guard) => {
                    return self.timeout(timed_out_guard, tid, pid, "acquire_exclusive")
                }
            }
        }

        let state = guard.pages.entry(pid).or_insert_with(|| PageLockState {
            mode: LockMode::Exclusive,
            holders: HashSet::new(),
        });
        state.mode = LockMode::Exclusive;
        state.holders.clear();
        state.holders.insert(tid);
        guard.held_by.entry(tid).or_default().insert(pid);
        trace!("{} acquired EXCLUSIVE on {}", tid, pid);
        Ok(())
    }

    pub fn release(&self, tid: TransactionId, pid: PageId) {
        let mut guard = self.inner.lock().unwrap();
        if let Some(state) = guard.pages.get_mut(&pid) {
            state.holders.remove(&tid);
            if state.holders.is_empty() {
                guard.pages.remove(&pid);
            }
        }
        if let Some(pages) = guard.held_by.get_mut(&tid) {
            pages.remove(&pid);
            if pages.is_empty() {
                guard.held_by.remove(&tid);
            }
        }
        debug!("{} released lock on {}", tid, pid);
        drop(guard);
        self.released.notify_all();
    }

    pub fn pages_held_by(&self, tid: TransactionId) -> Vec<PageId> {
        self.inner
            .lock()
            .unwrap()
            .held_by
            .get(&tid)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn release_all(&self, tid: TransactionId) {
        let pages: Vec<PageId> = {
            let guard = self.inner.lock().unwrap();
            guard
                .held_by
                .get(&tid)
                .map(|set| set.iter().copied().collect())
                .unwrap_or_default()
        };
        for pid in pages {
            self.release(tid, pid);
        }
    }

    /// Waits on the condvar for at most one `POLL_INTERVAL`, bounded by
    /// what remains of the overall 300ms budget.
    ///
    /// Returns the reacquired guard on success, or the guard (still held)
    /// wrapped in `Err` once the 300ms budget is exhausted, signaling the
    /// caller to abort.
    fn wait_slice<'a>(
        &'a self,
        guard: MutexGuard<'a, Inner>,
        start: Instant,
    ) -> Result<MutexGuard<'a, Inner>, MutexGuard<'a, Inner>> {
        let elapsed = start.elapsed();
        if elapsed >= LOCK_TIMEOUT {
            return Err(guard);
        }
        let wait_slice = (LOCK_TIMEOUT - elapsed).min(POLL_INTERVAL);
        let (guard, _) = self.released.wait_timeout(guard, wait_slice).unwrap();
        if start.elapsed() >= LOCK_TIMEOUT {
            Err(guard)
        } else {
            Ok(guard)
        }
    }

    fn timeout(
        &self,
        guard: MutexGuard<'_, Inner>,
        tid: TransactionId,
        pid: PageId,
        op: &str,
    ) -> VoidResult {
        debug!("{} timed out in {} on {}, aborting", tid, op, pid);
        drop(guard);
        self.release_all(tid);
        Err(DbError::TransactionAborted(format!(
            "{} timed out waiting for a lock on {}",
            tid, pid
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_locks_are_compatible() {
        let lm = LockManager::new();
        let pid = PageId::new(1, 0);
        let t1 = TransactionId::new();
        let t2 = TransactionId::new();
        lm.acquire_shared(t1, pid).unwrap();
        lm.acquire_shared(t2, pid).unwrap();
        assert!(lm.holds_lock(t1, pid));
        assert!(lm.holds_lock(t2, pid));
    }

    #[test]
    fn exclusive_upgrade_from_sole_shared_holder_does_not_block() {
        let lm = LockManager::new();
        let pid = PageId::new(1, 0);
        let t1 = TransactionId::new();
        lm.acquire_shared(t1, pid).unwrap();
        let start = Instant::now();
        lm.acquire_exclusive(t1, pid).unwrap();
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn exclusive_then_shared_times_out_and_releases() {
        let lm = LockManager::new();
        let pid = PageId::new(1, 0);
        let t1 = TransactionId::new();
        let t2 = TransactionId::new();
        lm.acquire_exclusive(t1, pid).unwrap();

        let start = Instant::now();
        let result = lm.acquire_shared(t2, pid);
        assert!(result.is_err());
        assert!(start.elapsed() >= Duration::from_millis(290));
        assert!(!lm.holds_lock(t2, pid));
        assert!(lm.holds_lock(t1, pid));
    }

    #[test]
    fn release_all_clears_every_page() {
        let lm = LockManager::new();
        let t1 = TransactionId::new();
        let p1 = PageId::new(1, 0);
        let p2 = PageId::new(1, 1);
        lm.acquire_shared(t1, p1).unwrap();
        lm.acquire_exclusive(t1, p2).unwrap();
        lm.release_all(t1);
        assert!(!lm.holds_lock(t1, p1));
        assert!(!lm.holds_lock(t1, p2));
    }
}
