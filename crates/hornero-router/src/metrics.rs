// SPDX-FileCopyrightText: 2026 Hornero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process counters for resolutions.
//!
//! Counters live in the resolver so callers can read them without a
//! recorder. Every update is also forwarded to the metrics-rs facade, which
//! is a no-op until a recorder (see `hornero-prometheus`) is installed.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use serde::Serialize;

/// Atomic resolution counters.
#[derive(Debug, Default)]
pub struct Metrics {
    requests_total: AtomicU64,
    successes_total: AtomicU64,
    cache_hits_total: AtomicU64,
    per_provider_usage: DashMap<String, AtomicU64>,
}

/// Point-in-time copy of [`Metrics`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub successes_total: u64,
    pub cache_hits_total: u64,
    /// `successes_total / max(requests_total, 1)`.
    pub success_rate: f64,
    pub per_provider_usage: BTreeMap<String, u64>,
    pub cache_size: usize,
}

impl Metrics {
    /// Counters with a zeroed usage slot for every provider name.
    pub fn new<I, S>(providers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let per_provider_usage = DashMap::new();
        for name in providers {
            per_provider_usage.insert(name.into(), AtomicU64::new(0));
        }
        Self {
            per_provider_usage,
            ..Self::default()
        }
    }

    pub fn record_request(&self, tier: &str) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("hornero_requests_total", "tier" => tier.to_string()).increment(1);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("hornero_cache_hits_total").increment(1);
    }

    /// Count a winning provider.
    pub fn record_success(&self, provider: &str) {
        self.successes_total.fetch_add(1, Ordering::Relaxed);
        self.per_provider_usage
            .entry(provider.to_string())
            .or_default()
            .fetch_add(1, Ordering::Relaxed);
        metrics::counter!("hornero_successes_total", "provider" => provider.to_string())
            .increment(1);
    }

    /// Facade-only: one adapter call and how it ended.
    pub fn record_attempt(&self, provider: &str, outcome: &str, elapsed: Duration) {
        metrics::counter!(
            "hornero_provider_attempts_total",
            "provider" => provider.to_string(),
            "outcome" => outcome.to_string()
        )
        .increment(1);
        metrics::histogram!(
            "hornero_attempt_latency_seconds",
            "provider" => provider.to_string()
        )
        .record(elapsed.as_secs_f64());
    }

    pub fn snapshot(&self, cache_size: usize) -> MetricsSnapshot {
        let requests_total = self.requests_total.load(Ordering::Relaxed);
        let successes_total = self.successes_total.load(Ordering::Relaxed);
        let per_provider_usage = self
            .per_provider_usage
            .iter()
            .map(|e| (e.key().clone(), e.value().load(Ordering::Relaxed)))
            .collect();

        MetricsSnapshot {
            requests_total,
            successes_total,
            cache_hits_total: self.cache_hits_total.load(Ordering::Relaxed),
            success_rate: successes_total as f64 / requests_total.max(1) as f64,
            per_provider_usage,
            cache_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_seeds_every_provider_at_zero() {
        let m = Metrics::new(["ollama", "gemini"]);
        let snap = m.snapshot(0);
        assert_eq!(snap.per_provider_usage.len(), 2);
        assert_eq!(snap.per_provider_usage["ollama"], 0);
        assert_eq!(snap.per_provider_usage["gemini"], 0);
    }

    #[test]
    fn success_rate_with_no_requests_is_zero() {
        let m = Metrics::new(Vec::<String>::new());
        assert_eq!(m.snapshot(0).success_rate, 0.0);
    }

    #[test]
    fn counters_accumulate() {
        let m = Metrics::new(["ollama", "gemini"]);
        m.record_request("simple");
        m.record_request("simple");
        m.record_request("complex");
        m.record_cache_hit();
        m.record_success("gemini");
        m.record_success("gemini");

        let snap = m.snapshot(3);
        assert_eq!(snap.requests_total, 3);
        assert_eq!(snap.successes_total, 2);
        assert_eq!(snap.cache_hits_total, 1);
        assert_eq!(snap.per_provider_usage["gemini"], 2);
        assert_eq!(snap.per_provider_usage["ollama"], 0);
        assert_eq!(snap.cache_size, 3);
        assert!((snap.success_rate - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn snapshot_serializes_ordered_usage() {
        let m = Metrics::new(["openai", "deepseek"]);
        let json = serde_json::to_string(&m.snapshot(0)).unwrap();
        let deepseek = json.find("deepseek").unwrap();
        let openai = json.find("openai").unwrap();
        assert!(deepseek < openai);
    }
}
