// SPDX-FileCopyrightText: 2026 Hornero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for LLM completion APIs (Ollama, DeepSeek, Gemini, ...).

use async_trait::async_trait;

use crate::traits::adapter::PluginAdapter;
use crate::types::{Capability, ProviderResult};

/// Adapter for one external completion API.
///
/// `complete` is infallible by contract: network errors, throttling, empty
/// bodies and missing credentials are all reported as a
/// [`ProviderResult`] with `succeeded == false` and an
/// [`ErrorKind`](crate::types::ErrorKind). The resolver relies on this to
/// advance the chain without unwinding.
#[async_trait]
pub trait ProviderAdapter: PluginAdapter {
    /// Whether this provider runs locally or is a hosted API.
    fn capability(&self) -> Capability;

    /// Sends `text` with `context` folded into the system prompt.
    ///
    /// Each call is a single attempt. Implementations enforce their own
    /// per-request HTTP timeout.
    async fn complete(&self, text: &str, context: &str) -> ProviderResult;
}
