// SPDX-FileCopyrightText: 2026 Hornero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock provider adapter for deterministic testing.
//!
//! `MockProvider` implements `ProviderAdapter` with scripted outcomes,
//! enabling fast, CI-runnable tests without external API calls.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use hornero_core::traits::adapter::PluginAdapter;
use hornero_core::traits::provider::ProviderAdapter;
use hornero_core::{Capability, ErrorKind, HealthStatus, ProviderResult};

/// What a single `complete` call does.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    /// Succeed with this text (may be blank).
    Reply(String),
    /// Fail with this kind and detail.
    Fail(ErrorKind, String),
    /// Never complete. Used to exercise timeouts and cancellation.
    Pending,
    /// Sleep, then behave like the inner outcome.
    Delayed(Duration, Box<MockOutcome>),
}

impl MockOutcome {
    pub fn reply(text: impl Into<String>) -> Self {
        MockOutcome::Reply(text.into())
    }

    pub fn fail(kind: ErrorKind, detail: impl Into<String>) -> Self {
        MockOutcome::Fail(kind, detail.into())
    }
}

/// A mock provider that plays back scripted outcomes.
///
/// Outcomes are popped from a FIFO queue. When the queue is empty, the
/// fallback outcome is used (by default a reply naming the provider).
pub struct MockProvider {
    name: String,
    capability: Capability,
    script: Arc<Mutex<VecDeque<MockOutcome>>>,
    fallback: MockOutcome,
    health: HealthStatus,
    calls: AtomicUsize,
    health_checks: AtomicUsize,
    received: Mutex<Vec<(String, String)>>,
}

impl MockProvider {
    /// A hosted mock that always answers `"mock response from <name>"`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            fallback: MockOutcome::Reply(format!("mock response from {name}")),
            name,
            capability: Capability::Hosted,
            script: Arc::new(Mutex::new(VecDeque::new())),
            health: HealthStatus::Healthy,
            calls: AtomicUsize::new(0),
            health_checks: AtomicUsize::new(0),
            received: Mutex::new(Vec::new()),
        }
    }

    /// A local (offline-capable) mock.
    pub fn local(name: impl Into<String>) -> Self {
        Self {
            capability: Capability::Local,
            ..Self::new(name)
        }
    }

    /// Queue outcomes to play before the fallback.
    pub fn with_outcomes(self, outcomes: Vec<MockOutcome>) -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::from(outcomes))),
            ..self
        }
    }

    /// Use `outcome` for every call once the queue is drained.
    pub fn always(self, outcome: MockOutcome) -> Self {
        Self {
            fallback: outcome,
            ..self
        }
    }

    /// Status returned by `health_check`.
    pub fn with_health(self, health: HealthStatus) -> Self {
        Self { health, ..self }
    }

    /// Append an outcome to the end of the queue.
    pub async fn push(&self, outcome: MockOutcome) {
        self.script.lock().await.push_back(outcome);
    }

    /// Number of `complete` calls started so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of `health_check` calls so far.
    pub fn health_checks(&self) -> usize {
        self.health_checks.load(Ordering::SeqCst)
    }

    /// Every `(text, context)` pair passed to `complete`.
    pub async fn received(&self) -> Vec<(String, String)> {
        self.received.lock().await.clone()
    }

    async fn next_outcome(&self) -> MockOutcome {
        self.script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }

    async fn play(&self, outcome: MockOutcome) -> ProviderResult {
        let mut outcome = outcome;
        loop {
            match outcome {
                MockOutcome::Reply(text) => {
                    return ProviderResult::success(&self.name, text)
                        .with_model("mock-model")
                        .with_local(self.capability == Capability::Local);
                }
                MockOutcome::Fail(kind, detail) => {
                    return ProviderResult::failure(&self.name, kind, detail);
                }
                MockOutcome::Pending => return std::future::pending().await,
                MockOutcome::Delayed(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    outcome = *inner;
                }
            }
        }
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn health_check(&self) -> HealthStatus {
        self.health_checks.fetch_add(1, Ordering::SeqCst);
        self.health.clone()
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    fn capability(&self) -> Capability {
        self.capability
    }

    async fn complete(&self, text: &str, context: &str) -> ProviderResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.received
            .lock()
            .await
            .push((text.to_string(), context.to_string()));
        let outcome = self.next_outcome().await;
        self.play(outcome).await
    }
}
