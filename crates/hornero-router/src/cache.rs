// SPDX-FileCopyrightText: 2026 Hornero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fingerprint-keyed response cache with LRU eviction and optional TTL.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use hornero_core::{ProviderResult, Tier};
use sha2::{Digest, Sha256};

/// Cache key: hex SHA-256 of `(text, context, tier)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fields are NUL-separated so `("ab", "c")` and `("a", "bc")` differ.
    pub fn new(text: &str, context: &str, tier: Tier) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        hasher.update([0u8]);
        hasher.update(context.as_bytes());
        hasher.update([0u8]);
        hasher.update(tier.to_string().as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex digits, for log lines.
    pub fn short(&self) -> &str {
        &self.0[..12]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored result and when it was written.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub result: ProviderResult,
    pub cached_at: DateTime<Utc>,
}

struct Slot {
    entry: CacheEntry,
    tick: u64,
}

// Recency is a per-use tick; the smallest tick in `order` is least recently
// used. Both maps always hold the same keys.
struct LruState {
    entries: HashMap<Fingerprint, Slot>,
    order: BTreeMap<u64, Fingerprint>,
    next_tick: u64,
}

impl LruState {
    fn bump(&mut self) -> u64 {
        let tick = self.next_tick;
        self.next_tick += 1;
        tick
    }

    fn touch(&mut self, key: &Fingerprint) {
        let tick = self.bump();
        if let Some(slot) = self.entries.get_mut(key) {
            self.order.remove(&slot.tick);
            slot.tick = tick;
            self.order.insert(tick, key.clone());
        }
    }

    fn insert(&mut self, key: Fingerprint, entry: CacheEntry) {
        let tick = self.bump();
        if let Some(old) = self.entries.insert(key.clone(), Slot { entry, tick }) {
            self.order.remove(&old.tick);
        }
        self.order.insert(tick, key);
    }

    fn remove(&mut self, key: &Fingerprint) {
        if let Some(slot) = self.entries.remove(key) {
            self.order.remove(&slot.tick);
        }
    }

    fn evict_oldest(&mut self) {
        if let Some((_, oldest)) = self.order.pop_first() {
            self.entries.remove(&oldest);
        }
    }
}

/// Bounded LRU cache of successful resolutions.
///
/// Capacity 0 disables caching entirely. Lookups, inserts and evictions
/// are O(log n) in the number of entries. Safe to share between tasks.
pub struct ResponseCache {
    state: Mutex<LruState>,
    capacity: usize,
    ttl: Option<Duration>,
}

impl ResponseCache {
    /// A cache holding at most `capacity` entries, never expiring.
    pub fn new(capacity: usize) -> Self {
        Self::with_ttl(capacity, None)
    }

    /// A cache whose entries expire `ttl` after they were written.
    pub fn with_ttl(capacity: usize, ttl: Option<Duration>) -> Self {
        Self {
            state: Mutex::new(LruState {
                entries: HashMap::with_capacity(capacity.min(1024)),
                order: BTreeMap::new(),
                next_tick: 0,
            }),
            capacity,
            ttl,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Look up a fingerprint. A hit refreshes its recency.
    pub fn get(&self, key: &Fingerprint) -> Option<ProviderResult> {
        self.get_at(key, Utc::now())
    }

    fn get_at(&self, key: &Fingerprint, now: DateTime<Utc>) -> Option<ProviderResult> {
        let mut state = self.lock();

        let expired = match (self.ttl, state.entries.get(key)) {
            (_, None) => return None,
            (Some(ttl), Some(slot)) => is_expired(&slot.entry, ttl, now),
            (None, Some(_)) => false,
        };

        if expired {
            state.remove(key);
            return None;
        }

        state.touch(key);
        state.entries.get(key).map(|slot| slot.entry.result.clone())
    }

    /// Store a result. Overwrites any entry for the same fingerprint and
    /// evicts the least recently used entry when full.
    pub fn put(&self, key: Fingerprint, result: ProviderResult) {
        self.put_at(key, result, Utc::now());
    }

    fn put_at(&self, key: Fingerprint, result: ProviderResult, now: DateTime<Utc>) {
        if self.capacity == 0 {
            return;
        }

        let mut state = self.lock();

        if !state.entries.contains_key(&key) && state.entries.len() >= self.capacity {
            state.evict_oldest();
        }

        state.insert(
            key,
            CacheEntry {
                result,
                cached_at: now,
            },
        );
    }

    pub fn clear(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.order.clear();
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Poisoning is recovered; the cache holds no cross-call invariants.
    fn lock(&self) -> MutexGuard<'_, LruState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn is_expired(entry: &CacheEntry, ttl: Duration, now: DateTime<Utc>) -> bool {
    match chrono::Duration::from_std(ttl) {
        Ok(ttl) => now - entry.cached_at >= ttl,
        Err(_) => false,
    }
}
