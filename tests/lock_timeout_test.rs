use std::time::{Duration, Instant};

use heap_core::{LockManager, PageId, TransactionId};

#[test]
fn reader_times_out_behind_a_writer_and_holds_nothing() {
    let lm = LockManager::new();
    let pid = PageId::new(1, 0);
    let t1 = TransactionId::new();
    let t2 = TransactionId::new();

    lm.acquire_exclusive(t1, pid).unwrap();

    let start = Instant::now();
    let result = lm.acquire_shared(t2, pid);
    let elapsed = start.elapsed();

    assert!(result.is_err());
    assert!(elapsed >= Duration::from_millis(290), "elapsed was {:?}", elapsed);
    assert!(!lm.holds_lock(t2, pid));
    assert!(lm.holds_lock(t1, pid));
}

#[test]
fn sole_reader_upgrades_to_writer_without_blocking() {
    let lm = LockManager::new();
    let pid = PageId::new(1, 0);
    let t1 = TransactionId::new();

    lm.acquire_shared(t1, pid).unwrap();

    let start = Instant::now();
    lm.acquire_exclusive(t1, pid).unwrap();

    assert!(start.elapsed() < Duration::from_millis(50));
    assert!(lm.holds_lock(t1, pid));
}
