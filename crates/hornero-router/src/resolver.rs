// SPDX-FileCopyrightText: 2026 Hornero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fallback resolution: classify, check the cache, walk the provider chain.
//!
//! Orchestrates one request end to end: tier selection > cache lookup >
//! first usable provider answer > cache write. Provider failures never
//! surface as `Err`; only caller cancellation and caller deadlines do.

use std::sync::Arc;
use std::time::{Duration, Instant};

use hornero_config::model::{HorneroConfig, RoutingConfig};
use hornero_core::{ErrorKind, HorneroError, ProviderAdapter, ProviderResult, Request, Tier};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::{Fingerprint, ResponseCache};
use crate::classifier::ComplexityClassifier;
use crate::metrics::{Metrics, MetricsSnapshot};
use crate::registry::ProviderRegistry;

/// Provider name carried by an exhausted result.
pub const NO_PROVIDER: &str = "none";

/// Resolver tuning taken from `[routing]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Upper bound on one adapter call.
    pub attempt_timeout: Duration,
    /// 0 disables the response cache.
    pub cache_capacity: usize,
    pub cache_ttl: Option<Duration>,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self::from(&RoutingConfig::default())
    }
}

impl From<&RoutingConfig> for ResolverOptions {
    fn from(config: &RoutingConfig) -> Self {
        Self {
            attempt_timeout: Duration::from_secs(config.attempt_timeout_secs),
            cache_capacity: config.cache_capacity,
            cache_ttl: config.cache_ttl_secs.map(Duration::from_secs),
        }
    }
}

/// Resolves requests against a [`ProviderRegistry`].
///
/// Owns its cache and counters; share it behind an `Arc`.
pub struct FallbackResolver {
    classifier: ComplexityClassifier,
    registry: Arc<ProviderRegistry>,
    cache: ResponseCache,
    metrics: Metrics,
    attempt_timeout: Duration,
}

impl FallbackResolver {
    pub fn new(
        registry: Arc<ProviderRegistry>,
        classifier: ComplexityClassifier,
        options: ResolverOptions,
    ) -> Self {
        let metrics = Metrics::new(registry.names());
        Self {
            classifier,
            cache: ResponseCache::with_ttl(options.cache_capacity, options.cache_ttl),
            metrics,
            registry,
            attempt_timeout: options.attempt_timeout,
        }
    }

    /// Build with the classifier keywords and routing options from `config`.
    pub fn from_config(config: &HorneroConfig, registry: Arc<ProviderRegistry>) -> Self {
        Self::new(
            registry,
            ComplexityClassifier::new(&config.classifier),
            ResolverOptions::from(&config.routing),
        )
    }

    /// Resolve a request. Always returns a result; check `succeeded`.
    pub async fn resolve(&self, request: &Request) -> ProviderResult {
        match self.run(request, None).await {
            Ok(result) => result,
            // Only reachable through a cancellation token.
            Err(e) => {
                ProviderResult::failure(NO_PROVIDER, ErrorKind::AllProvidersExhausted, e.to_string())
            }
        }
    }

    /// Resolve, aborting the in-flight attempt when `token` fires.
    ///
    /// No further providers are tried after cancellation.
    pub async fn resolve_with_cancel(
        &self,
        request: &Request,
        token: &CancellationToken,
    ) -> Result<ProviderResult, HorneroError> {
        self.run(request, Some(token)).await
    }

    /// Resolve under a caller deadline covering the whole chain walk.
    pub async fn resolve_with_deadline(
        &self,
        request: &Request,
        deadline: Duration,
    ) -> Result<ProviderResult, HorneroError> {
        tokio::time::timeout(deadline, self.resolve(request))
            .await
            .map_err(|_| HorneroError::Timeout { duration: deadline })
    }

    /// The tier `request` will be routed to.
    pub fn tier_for(&self, request: &Request) -> Tier {
        request
            .tier
            .unwrap_or_else(|| self.classifier.classify(&request.text))
    }

    pub fn classifier(&self) -> &ComplexityClassifier {
        &self.classifier
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot(self.cache.len())
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
        info!("response cache cleared");
    }

    /// Call every registered provider once with `probe_text`, enabled or not.
    ///
    /// Bypasses the cache and the counters. Results are in registration order.
    pub async fn probe_all(&self, probe_text: &str) -> Vec<ProviderResult> {
        let names: Vec<&str> = self.registry.names().collect();
        let probes = names.iter().filter_map(|name| {
            self.registry
                .adapter(name)
                .map(|adapter| self.call_adapter(name, adapter.as_ref(), probe_text, ""))
        });
        futures::future::join_all(probes)
            .await
            .into_iter()
            .map(|(result, _)| result)
            .collect()
    }

    async fn run(
        &self,
        request: &Request,
        cancel: Option<&CancellationToken>,
    ) -> Result<ProviderResult, HorneroError> {
        if cancel.is_some_and(CancellationToken::is_cancelled) {
            return Err(HorneroError::Cancelled);
        }

        let tier = self.tier_for(request);
        self.metrics.record_request(&tier.to_string());

        let key = Fingerprint::new(&request.text, &request.context, tier);
        if let Some(mut hit) = self.cache.get(&key) {
            self.metrics.record_cache_hit();
            debug!(%tier, fingerprint = key.short(), provider = %hit.provider_name, "cache hit");
            hit.cached = true;
            return Ok(hit);
        }

        let chain = self.registry.chain_for(tier);
        debug!(%tier, chain = ?chain, "resolving");

        let mut last_error: Option<String> = None;

        for name in chain {
            if !self.registry.is_enabled(name) {
                debug!(provider = %name, %tier, "skipping disabled provider");
                last_error = Some(format!("{name}: provider disabled"));
                continue;
            }
            let Some(adapter) = self.registry.adapter(name) else {
                continue;
            };

            let attempt = self.call_adapter(name, adapter.as_ref(), &request.text, &request.context);
            let (result, elapsed) = match cancel {
                Some(token) => tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        info!(provider = %name, %tier, "resolution cancelled");
                        return Err(HorneroError::Cancelled);
                    }
                    outcome = attempt => outcome,
                },
                None => attempt.await,
            };

            self.metrics
                .record_attempt(name, outcome_label(&result), elapsed);

            if result.succeeded {
                let mut won = result;
                won.tier = Some(tier);
                won.cached = false;
                self.metrics.record_success(name);
                info!(
                    provider = %name,
                    %tier,
                    model = won.model.as_deref().unwrap_or("-"),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "provider answered"
                );
                self.cache.put(key, won.clone());
                return Ok(won);
            }

            if result.error_kind == Some(ErrorKind::Unreachable) {
                self.registry.disable(name);
            }
            warn!(
                provider = %name,
                %tier,
                error = %result.error_summary(),
                "provider attempt failed"
            );
            last_error = Some(result.error_summary());
        }

        warn!(%tier, last_error = ?last_error, "all providers exhausted");
        Ok(exhausted(tier, last_error))
    }

    /// One adapter call under the per-attempt timeout.
    ///
    /// A blank success is rewritten as `EmptyResponse`.
    async fn call_adapter(
        &self,
        name: &str,
        adapter: &dyn ProviderAdapter,
        text: &str,
        context: &str,
    ) -> (ProviderResult, Duration) {
        let started = Instant::now();
        let call = tokio::time::timeout(self.attempt_timeout, adapter.complete(text, context));
        let result = match call.await {
            Ok(result) if result.succeeded && !result.is_usable() => ProviderResult::failure(
                name,
                ErrorKind::EmptyResponse,
                "provider returned an empty answer",
            ),
            Ok(result) => result,
            Err(_) => ProviderResult::failure(
                name,
                ErrorKind::NetworkError,
                format!("no response within {}s", self.attempt_timeout.as_secs_f32()),
            ),
        };
        (result, started.elapsed())
    }
}

fn exhausted(tier: Tier, last_error: Option<String>) -> ProviderResult {
    let last = last_error
        .unwrap_or_else(|| format!("no hay proveedores configurados para el nivel {tier}"));
    let text = format!(
        "Lo siento, todos los servicios de IA no están disponibles en este momento. \
         Verifica las claves de API, la conexión a internet y que el servidor local \
         (Ollama) esté en ejecución. Último error: {last}"
    );
    let mut result = ProviderResult::failure(NO_PROVIDER, ErrorKind::AllProvidersExhausted, last);
    result.text = text;
    result.tier = Some(tier);
    result
}

fn outcome_label(result: &ProviderResult) -> &'static str {
    match result.error_kind {
        None => "success",
        Some(ErrorKind::EmptyResponse) => "empty_response",
        Some(ErrorKind::RateLimited) => "rate_limited",
        Some(ErrorKind::AuthMissing) => "auth_missing",
        Some(ErrorKind::NetworkError) => "network_error",
        Some(ErrorKind::HttpError(_)) => "http_error",
        Some(ErrorKind::Unreachable) => "unreachable",
        Some(ErrorKind::AllProvidersExhausted) => "exhausted",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TierChains;
    use hornero_core::Capability;
    use hornero_test_utils::{MockOutcome, MockProvider};

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    /// Same chain for every tier.
    fn resolver_with(
        providers: &[Arc<MockProvider>],
        chain: &[&str],
        options: ResolverOptions,
    ) -> FallbackResolver {
        let adapters: Vec<Arc<dyn ProviderAdapter>> = providers
            .iter()
            .map(|p| p.clone() as Arc<dyn ProviderAdapter>)
            .collect();
        let chains = TierChains {
            simple: names(chain),
            medium: names(chain),
            complex: names(chain),
        };
        let registry = ProviderRegistry::new(adapters, chains).unwrap();
        FallbackResolver::new(Arc::new(registry), ComplexityClassifier::default(), options)
    }

    fn resolver(providers: &[Arc<MockProvider>], chain: &[&str]) -> FallbackResolver {
        resolver_with(providers, chain, ResolverOptions::default())
    }

    #[tokio::test]
    async fn first_healthy_provider_wins() {
        let a = Arc::new(MockProvider::local("ollama"));
        let b = Arc::new(MockProvider::new("gemini"));
        let r = resolver(&[a.clone(), b.clone()], &["ollama", "gemini"]);

        let result = r.resolve(&Request::new("hola")).await;

        assert!(result.succeeded);
        assert_eq!(result.provider_name, "ollama");
        assert!(result.local);
        assert_eq!(result.tier, Some(Tier::Simple));
        assert!(!result.cached);
        assert_eq!(b.calls(), 0);
    }

    #[tokio::test]
    async fn falls_through_failures_in_chain_order() {
        let a = Arc::new(
            MockProvider::new("gemini").always(MockOutcome::fail(ErrorKind::RateLimited, "quota")),
        );
        let b = Arc::new(
            MockProvider::new("deepseek").always(MockOutcome::fail(ErrorKind::AuthMissing, "no key")),
        );
        let c = Arc::new(MockProvider::new("openai"));
        let r = resolver(&[a.clone(), b.clone(), c.clone()], &["gemini", "deepseek", "openai"]);

        let result = r.resolve(&Request::new("hola")).await;

        assert_eq!(result.provider_name, "openai");
        assert_eq!((a.calls(), b.calls(), c.calls()), (1, 1, 1));

        let m = r.metrics();
        assert_eq!(m.successes_total, 1);
        assert_eq!(m.per_provider_usage["openai"], 1);
        assert_eq!(m.per_provider_usage["gemini"], 0);
        assert_eq!(m.per_provider_usage["deepseek"], 0);
    }

    #[tokio::test]
    async fn blank_answer_is_treated_as_empty_response() {
        let a = Arc::new(MockProvider::new("gemini").always(MockOutcome::reply("   \n")));
        let b = Arc::new(MockProvider::new("openai"));
        let r = resolver(&[a.clone(), b.clone()], &["gemini", "openai"]);

        let result = r.resolve(&Request::new("hola")).await;
        assert_eq!(result.provider_name, "openai");

        let probe = r.probe_all("Responde solo: OK").await;
        assert_eq!(probe[0].error_kind, Some(ErrorKind::EmptyResponse));
    }

    #[tokio::test]
    async fn exhaustion_reports_last_error_and_is_not_cached() {
        let a = Arc::new(
            MockProvider::local("ollama").always(MockOutcome::fail(ErrorKind::NetworkError, "timeout")),
        );
        let b = Arc::new(
            MockProvider::new("gemini").always(MockOutcome::fail(ErrorKind::HttpError(503), "HTTP 503")),
        );
        let r = resolver(&[a.clone(), b.clone()], &["ollama", "gemini"]);

        let request = Request::new("hola");
        let result = r.resolve(&request).await;

        assert!(!result.succeeded);
        assert_eq!(result.provider_name, NO_PROVIDER);
        assert_eq!(result.error_kind, Some(ErrorKind::AllProvidersExhausted));
        assert!(result.text.starts_with("Lo siento"));
        assert!(result.text.ends_with("gemini: HTTP 503"), "got: {}", result.text);
        assert_eq!(result.detail.as_deref(), Some("gemini: HTTP 503"));

        // Not cached: the chain is walked again.
        r.resolve(&request).await;
        assert_eq!((a.calls(), b.calls()), (2, 2));

        let m = r.metrics();
        assert_eq!(m.requests_total, 2);
        assert_eq!(m.successes_total, 0);
        assert_eq!(m.cache_size, 0);
    }

    #[tokio::test]
    async fn empty_chain_exhausts_immediately() {
        let a = Arc::new(MockProvider::new("gemini"));
        let r = resolver(&[a.clone()], &[]);

        let result = r.resolve(&Request::new("hola")).await;

        assert_eq!(result.error_kind, Some(ErrorKind::AllProvidersExhausted));
        assert!(result.text.contains("no hay proveedores"));
        assert_eq!(a.calls(), 0);
    }

    #[tokio::test]
    async fn repeated_request_is_served_from_cache() {
        let a = Arc::new(MockProvider::new("gemini"));
        let r = resolver(&[a.clone()], &["gemini"]);
        let request = Request::new("¿Cuántos productos hay?").with_context("sucursal centro");

        let first = r.resolve(&request).await;
        let second = r.resolve(&request).await;

        assert!(!first.cached);
        assert!(second.cached);
        assert_eq!(second.text, first.text);
        assert_eq!(a.calls(), 1);

        let m = r.metrics();
        assert_eq!(m.requests_total, 2);
        assert_eq!(m.cache_hits_total, 1);
        assert_eq!(m.successes_total, 1);
        assert_eq!(m.cache_size, 1);
    }

    #[tokio::test]
    async fn different_context_misses_cache() {
        let a = Arc::new(MockProvider::new("gemini"));
        let r = resolver(&[a.clone()], &["gemini"]);

        r.resolve(&Request::new("hola").with_context("a")).await;
        r.resolve(&Request::new("hola").with_context("b")).await;
        assert_eq!(a.calls(), 2);

        assert_eq!(a.received().await[1], ("hola".to_string(), "b".to_string()));
    }

    #[tokio::test]
    async fn zero_capacity_never_caches() {
        let a = Arc::new(MockProvider::new("gemini"));
        let options = ResolverOptions {
            cache_capacity: 0,
            ..ResolverOptions::default()
        };
        let r = resolver_with(&[a.clone()], &["gemini"], options);

        r.resolve(&Request::new("hola")).await;
        r.resolve(&Request::new("hola")).await;
        assert_eq!(a.calls(), 2);
        assert_eq!(r.metrics().cache_hits_total, 0);
    }

    #[tokio::test]
    async fn clear_cache_forces_new_call() {
        let a = Arc::new(MockProvider::new("gemini"));
        let r = resolver(&[a.clone()], &["gemini"]);

        r.resolve(&Request::new("hola")).await;
        r.clear_cache();
        r.resolve(&Request::new("hola")).await;
        assert_eq!(a.calls(), 2);
    }

    #[tokio::test]
    async fn unreachable_provider_is_disabled_and_skipped() {
        let local = Arc::new(
            MockProvider::local("ollama")
                .always(MockOutcome::fail(ErrorKind::Unreachable, "connection refused")),
        );
        let hosted = Arc::new(MockProvider::new("deepseek"));
        let r = resolver(&[local.clone(), hosted.clone()], &["ollama", "deepseek"]);

        let first = r.resolve(&Request::new("uno")).await;
        assert_eq!(first.provider_name, "deepseek");
        assert!(!r.registry().is_enabled("ollama"));

        let second = r.resolve(&Request::new("dos")).await;
        assert_eq!(second.provider_name, "deepseek");
        assert_eq!(local.calls(), 1);
    }

    #[tokio::test]
    async fn disabled_skip_is_reported_when_chain_exhausts() {
        let local = Arc::new(MockProvider::local("ollama"));
        let r = resolver(&[local.clone()], &["ollama"]);
        r.registry().disable("ollama");

        let result = r.resolve(&Request::new("hola")).await;
        assert_eq!(result.detail.as_deref(), Some("ollama: provider disabled"));
        assert_eq!(local.calls(), 0);
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn failed_attempts_are_logged_with_provider() {
        let local = Arc::new(
            MockProvider::local("ollama").always(MockOutcome::fail(ErrorKind::Unreachable, "refused")),
        );
        let r = resolver(&[local], &["ollama"]);

        r.resolve(&Request::new("hola")).await;

        assert!(logs_contain("provider attempt failed"));
        assert!(logs_contain("ollama: refused"));
        assert!(logs_contain("provider disabled"));
        assert!(logs_contain("all providers exhausted"));
    }

    #[tokio::test]
    async fn reprobe_restores_disabled_provider() {
        let local = Arc::new(MockProvider::local("ollama").with_outcomes(vec![MockOutcome::fail(
            ErrorKind::Unreachable,
            "connection refused",
        )]));
        let r = resolver(&[local.clone()], &["ollama"]);

        assert!(!r.resolve(&Request::new("uno")).await.succeeded);
        assert!(!r.registry().is_enabled("ollama"));

        r.registry().reprobe().await;
        let result = r.resolve(&Request::new("dos")).await;
        assert_eq!(result.provider_name, "ollama");
    }

    #[tokio::test(start_paused = true)]
    async fn hung_attempt_times_out_as_network_error() {
        let slow = Arc::new(MockProvider::new("gemini").always(MockOutcome::Pending));
        let fast = Arc::new(MockProvider::new("openai"));
        let options = ResolverOptions {
            attempt_timeout: Duration::from_secs(2),
            ..ResolverOptions::default()
        };
        let r = resolver_with(&[slow.clone(), fast.clone()], &["gemini", "openai"], options);

        let result = r.resolve(&Request::new("hola")).await;
        assert_eq!(result.provider_name, "openai");

        let probe = r.probe_all("ping").await;
        assert_eq!(probe[0].error_kind, Some(ErrorKind::NetworkError));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_the_walk() {
        let slow = Arc::new(MockProvider::new("gemini").always(MockOutcome::Pending));
        let next = Arc::new(MockProvider::new("openai"));
        let r = resolver(&[slow.clone(), next.clone()], &["gemini", "openai"]);
        let token = CancellationToken::new();

        let cancel = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            token.cancel();
        };
        let req = Request::new("hola");
        let (outcome, ()) = tokio::join!(r.resolve_with_cancel(&req, &token), cancel);

        assert!(matches!(outcome, Err(HorneroError::Cancelled)));
        assert_eq!(slow.calls(), 1);
        assert_eq!(next.calls(), 0);
        assert_eq!(r.metrics().successes_total, 0);
    }

    #[tokio::test]
    async fn pre_cancelled_token_makes_no_calls() {
        let a = Arc::new(MockProvider::new("gemini"));
        let r = resolver(&[a.clone()], &["gemini"]);
        let token = CancellationToken::new();
        token.cancel();

        let outcome = r.resolve_with_cancel(&Request::new("hola"), &token).await;
        assert!(matches!(outcome, Err(HorneroError::Cancelled)));
        assert_eq!(a.calls(), 0);
    }

    #[tokio::test]
    async fn uncancelled_token_resolves_normally() {
        let a = Arc::new(MockProvider::new("gemini"));
        let r = resolver(&[a.clone()], &["gemini"]);
        let token = CancellationToken::new();

        let result = r
            .resolve_with_cancel(&Request::new("hola"), &token)
            .await
            .unwrap();
        assert_eq!(result.provider_name, "gemini");
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_returns_timeout_error() {
        let slow = Arc::new(MockProvider::new("gemini").always(MockOutcome::Pending));
        let r = resolver(&[slow], &["gemini"]);

        let outcome = r
            .resolve_with_deadline(&Request::new("hola"), Duration::from_secs(1))
            .await;
        assert!(matches!(
            outcome,
            Err(HorneroError::Timeout { duration }) if duration == Duration::from_secs(1)
        ));
    }

    #[tokio::test]
    async fn explicit_tier_overrides_classifier() {
        let simple = Arc::new(MockProvider::local("ollama"));
        let complex = Arc::new(MockProvider::new("gemini"));
        let adapters: Vec<Arc<dyn ProviderAdapter>> = vec![simple.clone(), complex.clone()];
        let chains = TierChains {
            simple: names(&["ollama"]),
            medium: names(&["ollama"]),
            complex: names(&["gemini"]),
        };
        let registry = ProviderRegistry::new(adapters, chains).unwrap();
        let r = FallbackResolver::new(
            Arc::new(registry),
            ComplexityClassifier::default(),
            ResolverOptions::default(),
        );

        let auto = r.resolve(&Request::new("Analiza la rentabilidad y optimiza costos")).await;
        assert_eq!(auto.provider_name, "gemini");
        assert_eq!(auto.tier, Some(Tier::Complex));

        let forced = r
            .resolve(&Request::new("Analiza la rentabilidad y optimiza costos").with_tier(Some(Tier::Simple)))
            .await;
        assert_eq!(forced.provider_name, "ollama");
        assert_eq!(forced.tier, Some(Tier::Simple));
    }

    #[tokio::test]
    async fn probe_all_bypasses_cache_and_metrics() {
        let a = Arc::new(MockProvider::local("ollama"));
        let b = Arc::new(
            MockProvider::new("gemini").always(MockOutcome::fail(ErrorKind::AuthMissing, "no key")),
        );
        let r = resolver(&[a.clone(), b.clone()], &["ollama"]);
        r.registry().disable("ollama");

        let results = r.probe_all("Responde solo: OK").await;

        assert_eq!(results.len(), 2);
        assert!(results[0].succeeded);
        assert_eq!(results[1].error_kind, Some(ErrorKind::AuthMissing));
        assert_eq!(a.received().await[0].0, "Responde solo: OK");
        let m = r.metrics();
        assert_eq!(m.requests_total, 0);
        assert_eq!(m.cache_size, 0);
        assert_eq!(r.registry().capability("ollama"), Some(Capability::Local));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_resolutions_are_independent() {
        let a = Arc::new(MockProvider::new("gemini"));
        let r = Arc::new(resolver(&[a.clone()], &["gemini"]));

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let r = r.clone();
                tokio::spawn(async move { r.resolve(&Request::new(format!("pregunta {i}"))).await })
            })
            .collect();
        for h in handles {
            assert!(h.await.unwrap().succeeded);
        }

        let m = r.metrics();
        assert_eq!(m.requests_total, 16);
        assert_eq!(m.successes_total, 16);
        assert_eq!(m.cache_size, 16);
    }
}
