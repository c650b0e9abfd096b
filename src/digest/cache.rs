//! Shared digest cache
//!
//! Maps a transformed value to its salted digest so each distinct value is
//! hashed once per run. The map is sharded (`DashMap`), and the digest is
//! computed outside any shard lock: two workers that miss on the same value
//! at the same time may both compute it, then the first insert wins and the
//! second is dropped. Both digests are identical, so the race only costs
//! duplicated work.
//!
//! In brute-force mode the map is bypassed and every call hashes.

use crate::digest::checksum::salted_digest;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Whether digests are memoized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    /// Look up and store digests in the shared map
    #[default]
    Cached,
    /// Recompute every digest, never touch the map
    BruteForce,
}

/// Concurrency-safe value → digest map
#[derive(Debug)]
pub struct DigestCache {
    /// Salt prepended to every value
    salt: Vec<u8>,

    /// Caching or brute force
    mode: CacheMode,

    /// Memoized digests
    entries: DashMap<String, String>,

    /// Number of digests actually computed
    computed: AtomicU64,

    /// Number of lookups served from the map
    hits: AtomicU64,
}

impl DigestCache {
    /// Create an empty cache for the given salt
    pub fn new(salt: impl Into<Vec<u8>>, mode: CacheMode) -> Self {
        Self {
            salt: salt.into(),
            mode,
            entries: DashMap::new(),
            computed: AtomicU64::new(0),
            hits: AtomicU64::new(0),
        }
    }

    /// Salted digest of `value`, served from the map when possible
    pub fn get_or_compute(&self, value: &str) -> String {
        let salt = &self.salt;
        self.get_or_insert_with(value, |v| salted_digest(salt, v))
    }

    /// Look up `value`, or compute, store and return its digest
    ///
    /// `compute` must be deterministic for a given value; when two callers
    /// race on the same missing key the first stored digest is returned to
    /// both.
    pub fn get_or_insert_with<F>(&self, value: &str, compute: F) -> String
    where
        F: FnOnce(&str) -> String,
    {
        if self.mode == CacheMode::BruteForce {
            self.computed.fetch_add(1, Ordering::Relaxed);
            return compute(value);
        }

        if let Some(hit) = self.entries.get(value) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return hit.value().clone();
        }

        // Hash without holding a shard lock
        let digest = compute(value);
        self.computed.fetch_add(1, Ordering::Relaxed);

        self.entries
            .entry(value.to_string())
            .or_insert(digest)
            .value()
            .clone()
    }

    /// Caching mode
    pub fn mode(&self) -> CacheMode {
        self.mode
    }

    /// Number of distinct values stored
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been stored
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of digests computed so far
    pub fn computations(&self) -> u64 {
        self.computed.load(Ordering::Relaxed)
    }

    /// Number of lookups answered from the map
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }
}
