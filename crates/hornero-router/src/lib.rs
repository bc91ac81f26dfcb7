// SPDX-FileCopyrightText: 2026 Hornero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Complexity classification and provider-fallback resolution.
//!
//! This crate provides:
//! - [`ComplexityClassifier`]: keyword and length heuristics mapping text to a tier
//! - [`ProviderRegistry`]: named adapters, per-tier chains, liveness flags
//! - [`ResponseCache`]: bounded LRU of successful answers
//! - [`Metrics`]: request, success, cache-hit, and per-provider counters
//! - [`FallbackResolver`]: walks a tier's chain until one provider answers
//!
//! A request is classified (unless it names a tier), looked up in the cache,
//! then sent to each provider of the tier's chain in order. The first
//! non-blank answer wins and is cached.

pub mod cache;
pub mod classifier;
pub mod metrics;
pub mod registry;
pub mod resolver;

pub use cache::{CacheEntry, Fingerprint, ResponseCache};
pub use classifier::{ComplexityClassifier, ComplexityScore};
pub use metrics::{Metrics, MetricsSnapshot};
pub use registry::{ProviderInfo, ProviderRegistry, ReprobeOutcome, TierChains};
pub use resolver::{FallbackResolver, ResolverOptions, NO_PROVIDER};
