//! Lightweight global metrics for VShadow.
//!
//! Потокобезопасные атомарные счётчики для подсистем:
//! - декодер записей (populated / empty / malformed)
//! - overlay-цепочки (clone / release)
//! - индекс (insert / supersede)

use std::sync::atomic::{AtomicU64, Ordering};

// ----- Decoder -----
static RECORDS_POPULATED: AtomicU64 = AtomicU64::new(0);
static RECORDS_EMPTY: AtomicU64 = AtomicU64::new(0);
static RECORDS_MALFORMED: AtomicU64 = AtomicU64::new(0);

// ----- Chains -----
static DESCRIPTORS_CLONED: AtomicU64 = AtomicU64::new(0);
static DESCRIPTORS_RELEASED: AtomicU64 = AtomicU64::new(0);

// ----- Index -----
static INDEX_INSERTS: AtomicU64 = AtomicU64::new(0);
static INDEX_SUPERSEDES: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    // Decoder
    pub records_populated: u64,
    pub records_empty: u64,
    pub records_malformed: u64,

    // Chains
    pub descriptors_cloned: u64,
    pub descriptors_released: u64,

    // Index
    pub index_inserts: u64,
    pub index_supersedes: u64,
}

impl MetricsSnapshot {
    pub fn records_total(&self) -> u64 {
        self.records_populated + self.records_empty + self.records_malformed
    }

    /// Доля пустых слотов среди прочитанных записей.
    pub fn empty_ratio(&self) -> f64 {
        let total = self.records_total();
        if total == 0 {
            0.0
        } else {
            self.records_empty as f64 / total as f64
        }
    }
}

// ----- Recorders (Decoder) -----
pub fn record_decode_populated() {
    RECORDS_POPULATED.fetch_add(1, Ordering::Relaxed);
}
pub fn record_decode_empty() {
    RECORDS_EMPTY.fetch_add(1, Ordering::Relaxed);
}
pub fn record_decode_malformed() {
    RECORDS_MALFORMED.fetch_add(1, Ordering::Relaxed);
}

// ----- Recorders (Chains) -----
pub fn record_descriptors_cloned(n: u64) {
    DESCRIPTORS_CLONED.fetch_add(n, Ordering::Relaxed);
}
pub fn record_descriptors_released(n: u64) {
    DESCRIPTORS_RELEASED.fetch_add(n, Ordering::Relaxed);
}

// ----- Recorders (Index) -----
pub fn record_index_insert() {
    INDEX_INSERTS.fetch_add(1, Ordering::Relaxed);
}
pub fn record_index_supersede() {
    INDEX_SUPERSEDES.fetch_add(1, Ordering::Relaxed);
}

pub fn snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        records_populated: RECORDS_POPULATED.load(Ordering::Relaxed),
        records_empty: RECORDS_EMPTY.load(Ordering::Relaxed),
        records_malformed: RECORDS_MALFORMED.load(Ordering::Relaxed),
        descriptors_cloned: DESCRIPTORS_CLONED.load(Ordering::Relaxed),
        descriptors_released: DESCRIPTORS_RELEASED.load(Ordering::Relaxed),
        index_inserts: INDEX_INSERTS.load(Ordering::Relaxed),
        index_supersedes: INDEX_SUPERSEDES.load(Ordering::Relaxed),
    }
}

pub fn reset() {
    RECORDS_POPULATED.store(0, Ordering::Relaxed);
    RECORDS_EMPTY.store(0, Ordering::Relaxed);
    RECORDS_MALFORMED.store(0, Ordering::Relaxed);
    DESCRIPTORS_CLONED.store(0, Ordering::Relaxed);
    DESCRIPTORS_RELEASED.store(0, Ordering::Relaxed);
    INDEX_INSERTS.store(0, Ordering::Relaxed);
    INDEX_SUPERSEDES.store(0, Ordering::Relaxed);
}
