// SPDX-FileCopyrightText: 2026 Hornero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric descriptions.
//!
//! The resolver emits these through the metrics-rs facade; this module only
//! attaches help text so the exporter renders `# HELP` lines.

use metrics::{describe_counter, describe_histogram, Unit};

pub const REQUESTS_TOTAL: &str = "hornero_requests_total";
pub const SUCCESSES_TOTAL: &str = "hornero_successes_total";
pub const CACHE_HITS_TOTAL: &str = "hornero_cache_hits_total";
pub const PROVIDER_ATTEMPTS_TOTAL: &str = "hornero_provider_attempts_total";
pub const ATTEMPT_LATENCY_SECONDS: &str = "hornero_attempt_latency_seconds";

/// Register all Hornero metric descriptions.
///
/// Called once at startup after the recorder is installed.
pub fn register_metrics() {
    describe_counter!(REQUESTS_TOTAL, "Resolutions requested, by tier");
    describe_counter!(SUCCESSES_TOTAL, "Resolutions answered, by winning provider");
    describe_counter!(CACHE_HITS_TOTAL, "Resolutions served from the response cache");
    describe_counter!(
        PROVIDER_ATTEMPTS_TOTAL,
        "Adapter calls, by provider and outcome"
    );
    describe_histogram!(
        ATTEMPT_LATENCY_SECONDS,
        Unit::Seconds,
        "Adapter call latency in seconds"
    );
}
