// SPDX-FileCopyrightText: 2026 Hornero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base adapter trait that all plugin adapters must implement.

use async_trait::async_trait;

use crate::types::HealthStatus;

/// The base trait for all Hornero adapters.
///
/// Provides identity and a liveness probe. The probe is what the registry
/// uses to re-enable a provider after it was marked unreachable.
#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    /// Returns the registry name of this adapter instance (e.g. `"deepseek"`).
    fn name(&self) -> &str;

    /// Performs a cheap liveness probe. Must not consume model tokens.
    async fn health_check(&self) -> HealthStatus;
}
