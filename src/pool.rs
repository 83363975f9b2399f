//! Process-wide pools for encoder scratch storage and finished record buffers.
//!
//! Both pools are safe to share across threads. Callers never see the lock:
//! checkout and return happen inside [`Encoder`](crate::Encoder) and
//! [`RecordBuffer`](crate::RecordBuffer) construction and `Drop`.

use std::sync::atomic::{AtomicU64, Ordering};

use lazy_static::lazy_static;
use parking_lot::Mutex;

/// Initial capacity of every pooled byte buffer.
pub const INITIAL_SIZE: usize = 1024;

/// Buffers that grew beyond this are released to the allocator instead of pooled.
pub const MAX_POOLED_CAPACITY: usize = 1024 * 1024;

/// Upper bound on idle items kept by each global pool.
const MAX_IDLE: usize = 1024;

/// Counters describing pool behaviour.
#[derive(Debug, Default)]
pub struct PoolMetrics {
    hits: AtomicU64,
    misses: AtomicU64,
    returns: AtomicU64,
    drops: AtomicU64,
}

impl PoolMetrics {
    pub const fn new() -> Self {
        Self {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            returns: AtomicU64::new(0),
            drops: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> PoolMetricsSnapshot {
        PoolMetricsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            returns: self.returns.load(Ordering::Relaxed),
            drops: self.drops.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`PoolMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolMetricsSnapshot {
    /// Checkouts served from idle storage
    pub hits: u64,
    /// Checkouts that had to allocate
    pub misses: u64,
    /// Releases that went back to idle storage
    pub returns: u64,
    /// Releases that were discarded (pool full or storage oversized)
    pub drops: u64,
}

impl PoolMetricsSnapshot {
    /// Total checkouts
    pub fn acquired(&self) -> u64 {
        self.hits + self.misses
    }

    /// Total releases
    pub fn released(&self) -> u64 {
        self.returns + self.drops
    }
}

/// A bounded stack of reusable items.
///
/// Items must be reset by the releasing side before [`Pool::put`]; the pool
/// hands out whatever it stored.
pub struct Pool<T> {
    idle: Mutex<Vec<T>>,
    max_idle: usize,
    metrics: PoolMetrics,
}

impl<T> Pool<T> {
    pub fn new(max_idle: usize) -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
            max_idle,
            metrics: PoolMetrics::new(),
        }
    }

    /// Takes an idle item, or builds a new one with `make` when none is left.
    #[inline]
    pub fn get_or_else(&self, make: impl FnOnce() -> T) -> T {
        let pooled = self.idle.lock().pop();
        match pooled {
            Some(item) => {
                self.metrics.hits.fetch_add(1, Ordering::Relaxed);
                item
            }
            None => {
                self.metrics.misses.fetch_add(1, Ordering::Relaxed);
                tracing::trace!("pool empty, allocating");
                make()
            }
        }
    }

    /// Returns an item. Returns `false` if the pool was full and the item dropped.
    #[inline]
    pub fn put(&self, item: T) -> bool {
        let mut idle = self.idle.lock();
        if idle.len() < self.max_idle {
            idle.push(item);
            self.metrics.returns.fetch_add(1, Ordering::Relaxed);
            true
        } else {
            drop(idle);
            self.metrics.drops.fetch_add(1, Ordering::Relaxed);
            false
        }
    }

    /// Records a release that never reached [`Pool::put`].
    #[inline]
    pub(crate) fn record_drop(&self) {
        self.metrics.drops.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of idle items
    pub fn available(&self) -> usize {
        self.idle.lock().len()
    }

    pub fn max_idle(&self) -> usize {
        self.max_idle
    }

    pub fn metrics(&self) -> &PoolMetrics {
        &self.metrics
    }
}

/// Reusable storage behind one encoder instance.
#[derive(Debug)]
pub(crate) struct EncoderSlot {
    pub(crate) buf: Vec<u8>,
    pub(crate) ns_prefix: String,
}

impl EncoderSlot {
    fn new() -> Self {
        Self {
            buf: Vec::with_capacity(INITIAL_SIZE),
            ns_prefix: String::new(),
        }
    }
}

lazy_static! {
    static ref ENCODER_POOL: Pool<EncoderSlot> = Pool::new(MAX_IDLE);
    static ref BUFFER_POOL: Pool<Vec<u8>> = Pool::new(MAX_IDLE);
}

pub(crate) fn get_encoder_slot() -> EncoderSlot {
    ENCODER_POOL.get_or_else(EncoderSlot::new)
}

/// Resets `slot` and returns it to the encoder pool.
pub(crate) fn put_encoder_slot(mut slot: EncoderSlot) {
    if slot.buf.capacity() > MAX_POOLED_CAPACITY {
        tracing::trace!(capacity = slot.buf.capacity(), "dropping oversized encoder buffer");
        ENCODER_POOL.record_drop();
        return;
    }
    slot.buf.clear();
    slot.ns_prefix.clear();
    ENCODER_POOL.put(slot);
}

pub(crate) fn get_buffer() -> Vec<u8> {
    BUFFER_POOL.get_or_else(|| Vec::with_capacity(INITIAL_SIZE))
}

pub(crate) fn put_buffer(mut buf: Vec<u8>) {
    if buf.capacity() > MAX_POOLED_CAPACITY {
        tracing::trace!(capacity = buf.capacity(), "dropping oversized record buffer");
        BUFFER_POOL.record_drop();
        return;
    }
    buf.clear();
    BUFFER_POOL.put(buf);
}

/// Accounts for a record buffer whose storage left the pool for good.
pub(crate) fn detach_buffer(capacity: usize) {
    tracing::trace!(capacity, "record buffer detached from pool");
    BUFFER_POOL.record_drop();
}

/// Metrics of the encoder instance pool.
pub fn encoder_pool_metrics() -> PoolMetricsSnapshot {
    ENCODER_POOL.metrics().snapshot()
}

/// Metrics of the record buffer pool.
pub fn buffer_pool_metrics() -> PoolMetricsSnapshot {
    BUFFER_POOL.metrics().snapshot()
}
