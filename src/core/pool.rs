//! Free-list pools for per-call allocations
//!
//! Fields, entries and output line buffers are recycled between log calls.
//! Every value is reset to its zero form on release, so a reused slot never
//! exposes the previous occupant's data. Values whose retained capacity
//! exceeds the pool's limit are dropped instead of parked.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Types that can be reset to their zero form while keeping their
/// heap capacity.
pub trait Recycle: Default {
    fn recycle(&mut self);

    /// Heap bytes the value keeps after `recycle`
    fn retained_bytes(&self) -> usize;
}

impl Recycle for Vec<u8> {
    fn recycle(&mut self) {
        self.clear();
    }

    fn retained_bytes(&self) -> usize {
        self.capacity()
    }
}

impl Recycle for String {
    fn recycle(&mut self) {
        self.clear();
    }

    fn retained_bytes(&self) -> usize {
        self.capacity()
    }
}

/// A bounded free list.
///
/// `acquire` never blocks on an empty pool; it falls back to `T::default()`.
/// `release` keeps at most `max_idle` values and drops the rest, along with
/// any value retaining more than `max_retained_bytes`.
pub struct Pool<T> {
    free: Mutex<Vec<T>>,
    max_idle: usize,
    max_retained_bytes: usize,
    reused: AtomicU64,
    allocated: AtomicU64,
    oversized: AtomicU64,
}

impl<T: Recycle> Pool<T> {
    pub const fn new(max_idle: usize) -> Self {
        Self::with_retained_limit(max_idle, usize::MAX)
    }

    pub const fn with_retained_limit(max_idle: usize, max_retained_bytes: usize) -> Self {
        Self {
            free: parking_lot::const_mutex(Vec::new()),
            max_idle,
            max_retained_bytes,
            reused: AtomicU64::new(0),
            allocated: AtomicU64::new(0),
            oversized: AtomicU64::new(0),
        }
    }

    pub fn acquire(&self) -> T {
        if let Some(item) = self.free.lock().pop() {
            self.reused.fetch_add(1, Ordering::Relaxed);
            return item;
        }
        self.allocated.fetch_add(1, Ordering::Relaxed);
        T::default()
    }

    pub fn release(&self, mut item: T) {
        item.recycle();
        if item.retained_bytes() > self.max_retained_bytes {
            self.oversized.fetch_add(1, Ordering::Relaxed);
            return;
        }
        let mut free = self.free.lock();
        if free.len() < self.max_idle {
            free.push(item);
        }
    }

    /// Number of values currently parked in the pool
    pub fn idle(&self) -> usize {
        self.free.lock().len()
    }

    pub fn reused_count(&self) -> u64 {
        self.reused.load(Ordering::Relaxed)
    }

    pub fn allocated_count(&self) -> u64 {
        self.allocated.load(Ordering::Relaxed)
    }

    /// Values dropped on release for exceeding the retained-bytes limit
    pub fn oversized_count(&self) -> u64 {
        self.oversized.load(Ordering::Relaxed)
    }
}
