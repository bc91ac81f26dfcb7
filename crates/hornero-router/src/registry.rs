// SPDX-FileCopyrightText: 2026 Hornero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Named provider adapters, per-tier chains, and runtime liveness flags.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use hornero_config::model::RoutingConfig;
use hornero_core::{Capability, HealthStatus, HorneroError, ProviderAdapter, Tier};
use tracing::{info, warn};

/// Ordered provider names for each tier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TierChains {
    pub simple: Vec<String>,
    pub medium: Vec<String>,
    pub complex: Vec<String>,
}

impl TierChains {
    pub fn get(&self, tier: Tier) -> &[String] {
        match tier {
            Tier::Simple => &self.simple,
            Tier::Medium => &self.medium,
            Tier::Complex => &self.complex,
        }
    }

    /// Drop every occurrence of names rejected by `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        for chain in [&mut self.simple, &mut self.medium, &mut self.complex] {
            chain.retain(|name| keep(name));
        }
    }
}

impl From<&RoutingConfig> for TierChains {
    fn from(config: &RoutingConfig) -> Self {
        Self {
            simple: config.simple.clone(),
            medium: config.medium.clone(),
            complex: config.complex.clone(),
        }
    }
}

struct ProviderEntry {
    adapter: Arc<dyn ProviderAdapter>,
    capability: Capability,
    enabled: AtomicBool,
}

/// Display row for one registered provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderInfo {
    pub name: String,
    pub capability: Capability,
    pub enabled: bool,
}

/// Outcome of re-probing one disabled provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReprobeOutcome {
    pub name: String,
    pub status: HealthStatus,
    /// Enabled after the probe.
    pub enabled: bool,
}

/// Registered adapters plus tier chains.
///
/// The `enabled` flags are the only mutable state. They start `true` and are
/// cleared when an attempt reports [`ErrorKind::Unreachable`](hornero_core::ErrorKind).
pub struct ProviderRegistry {
    // Registration order, for stable display.
    entries: Vec<(String, ProviderEntry)>,
    index: HashMap<String, usize>,
    chains: TierChains,
}

impl ProviderRegistry {
    /// Register `adapters` under their own names and attach `chains`.
    ///
    /// Fails on duplicate names or on chains naming an unregistered adapter.
    pub fn new(
        adapters: Vec<Arc<dyn ProviderAdapter>>,
        chains: TierChains,
    ) -> Result<Self, HorneroError> {
        let mut entries = Vec::with_capacity(adapters.len());
        let mut index = HashMap::with_capacity(adapters.len());

        for adapter in adapters {
            let name = adapter.name().to_string();
            if index.contains_key(&name) {
                return Err(HorneroError::Config(format!(
                    "provider `{name}` registered twice"
                )));
            }
            index.insert(name.clone(), entries.len());
            entries.push((
                name,
                ProviderEntry {
                    capability: adapter.capability(),
                    adapter,
                    enabled: AtomicBool::new(true),
                },
            ));
        }

        for tier in Tier::ALL {
            if let Some(missing) = chains.get(tier).iter().find(|n| !index.contains_key(*n)) {
                return Err(HorneroError::AdapterNotFound {
                    name: missing.clone(),
                });
            }
        }

        Ok(Self {
            entries,
            index,
            chains,
        })
    }

    /// The ordered chain for `tier`.
    pub fn chain_for(&self, tier: Tier) -> &[String] {
        self.chains.get(tier)
    }

    /// Position of `name` in the chain for `tier`.
    pub fn rank(&self, tier: Tier, name: &str) -> Option<usize> {
        self.chain_for(tier).iter().position(|n| n == name)
    }

    pub fn adapter(&self, name: &str) -> Option<&Arc<dyn ProviderAdapter>> {
        self.entry(name).map(|e| &e.adapter)
    }

    pub fn capability(&self, name: &str) -> Option<Capability> {
        self.entry(name).map(|e| e.capability)
    }

    /// Unknown names report `false`.
    pub fn is_enabled(&self, name: &str) -> bool {
        self.entry(name)
            .is_some_and(|e| e.enabled.load(Ordering::Acquire))
    }

    /// Mark a provider unreachable. Returns `true` if it was enabled.
    pub fn disable(&self, name: &str) -> bool {
        match self.entry(name) {
            Some(e) => {
                let was = e.enabled.swap(false, Ordering::AcqRel);
                if was {
                    warn!(provider = name, "provider disabled");
                }
                was
            }
            None => false,
        }
    }

    /// Re-enable a provider without probing it. Returns `false` for unknown names.
    pub fn reset(&self, name: &str) -> bool {
        match self.entry(name) {
            Some(e) => {
                e.enabled.store(true, Ordering::Release);
                true
            }
            None => false,
        }
    }

    pub fn reset_all(&self) {
        for (_, e) in &self.entries {
            e.enabled.store(true, Ordering::Release);
        }
    }

    /// Health-check every disabled provider and re-enable the healthy ones.
    pub async fn reprobe(&self) -> Vec<ReprobeOutcome> {
        let disabled: Vec<&(String, ProviderEntry)> = self
            .entries
            .iter()
            .filter(|(_, e)| !e.enabled.load(Ordering::Acquire))
            .collect();

        let statuses =
            futures::future::join_all(disabled.iter().map(|(_, e)| e.adapter.health_check()))
                .await;

        disabled
            .into_iter()
            .zip(statuses)
            .map(|((name, entry), status)| {
                let enabled = status.is_healthy();
                if enabled {
                    entry.enabled.store(true, Ordering::Release);
                    info!(provider = %name, "provider re-enabled after probe");
                }
                ReprobeOutcome {
                    name: name.clone(),
                    status,
                    enabled,
                }
            })
            .collect()
    }

    /// All providers in registration order.
    pub fn providers(&self) -> Vec<ProviderInfo> {
        self.entries
            .iter()
            .map(|(name, e)| ProviderInfo {
                name: name.clone(),
                capability: e.capability,
                enabled: e.enabled.load(Ordering::Acquire),
            })
            .collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, name: &str) -> Option<&ProviderEntry> {
        self.index.get(name).map(|&i| &self.entries[i].1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hornero_test_utils::MockProvider;

    fn chains(simple: &[&str], medium: &[&str], complex: &[&str]) -> TierChains {
        let v = |l: &[&str]| l.iter().map(|s| s.to_string()).collect();
        TierChains {
            simple: v(simple),
            medium: v(medium),
            complex: v(complex),
        }
    }

    fn registry() -> ProviderRegistry {
        let adapters: Vec<Arc<dyn ProviderAdapter>> = vec![
            Arc::new(MockProvider::local("ollama")),
            Arc::new(MockProvider::new("deepseek")),
            Arc::new(MockProvider::new("gemini")),
        ];
        ProviderRegistry::new(
            adapters,
            chains(
                &["ollama", "deepseek", "gemini"],
                &["deepseek", "gemini", "ollama"],
                &["gemini", "deepseek", "ollama"],
            ),
        )
        .unwrap()
    }

    #[test]
    fn chain_and_rank() {
        let r = registry();
        assert_eq!(r.chain_for(Tier::Complex)[0], "gemini");
        assert_eq!(r.rank(Tier::Simple, "ollama"), Some(0));
        assert_eq!(r.rank(Tier::Medium, "ollama"), Some(2));
        assert_eq!(r.rank(Tier::Medium, "openai"), None);
    }

    #[test]
    fn capability_comes_from_adapter() {
        let r = registry();
        assert_eq!(r.capability("ollama"), Some(Capability::Local));
        assert_eq!(r.capability("gemini"), Some(Capability::Hosted));
    }

    #[test]
    fn unknown_chain_member_is_rejected() {
        let adapters: Vec<Arc<dyn ProviderAdapter>> = vec![Arc::new(MockProvider::new("gemini"))];
        let err = ProviderRegistry::new(adapters, chains(&["gemini"], &["openai"], &[]))
            .err()
            .unwrap();
        assert!(matches!(err, HorneroError::AdapterNotFound { name } if name == "openai"));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let adapters: Vec<Arc<dyn ProviderAdapter>> = vec![
            Arc::new(MockProvider::new("gemini")),
            Arc::new(MockProvider::new("gemini")),
        ];
        let err = ProviderRegistry::new(adapters, TierChains::default())
            .err()
            .unwrap();
        assert!(matches!(err, HorneroError::Config(_)));
    }

    #[test]
    fn disable_and_reset() {
        let r = registry();
        assert!(r.is_enabled("ollama"));
        assert!(r.disable("ollama"));
        assert!(!r.is_enabled("ollama"));
        assert!(!r.disable("ollama"));

        assert!(r.reset("ollama"));
        assert!(r.is_enabled("ollama"));
        assert!(!r.reset("nonexistent"));
    }

    #[test]
    fn reset_all_enables_everything() {
        let r = registry();
        r.disable("ollama");
        r.disable("gemini");
        r.reset_all();
        assert!(r.providers().iter().all(|p| p.enabled));
    }

    #[test]
    fn providers_listed_in_registration_order() {
        let r = registry();
        let names: Vec<String> = r.providers().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["ollama", "deepseek", "gemini"]);
    }

    #[test]
    fn retain_drops_names_from_every_chain() {
        let mut c = chains(&["ollama", "gemini"], &["gemini", "ollama"], &["ollama"]);
        c.retain(|n| n != "ollama");
        assert_eq!(c, chains(&["gemini"], &["gemini"], &[]));
    }

    #[tokio::test]
    async fn reprobe_reenables_only_healthy_providers() {
        let ollama = Arc::new(MockProvider::local("ollama"));
        let gemini = Arc::new(
            MockProvider::new("gemini").with_health(HealthStatus::Unhealthy("quota".into())),
        );
        let openai = Arc::new(MockProvider::new("openai"));
        let adapters: Vec<Arc<dyn ProviderAdapter>> =
            vec![ollama.clone(), gemini.clone(), openai.clone()];
        let r = ProviderRegistry::new(adapters, TierChains::default()).unwrap();

        r.disable("ollama");
        r.disable("gemini");
        let report = r.reprobe().await;

        assert_eq!(report.len(), 2);
        assert!(report.iter().any(|o| o.name == "ollama" && o.enabled));
        assert!(report.iter().any(|o| o.name == "gemini" && !o.enabled));
        assert!(r.is_enabled("ollama"));
        assert!(!r.is_enabled("gemini"));
        assert_eq!(ollama.health_checks(), 1);
        assert_eq!(gemini.health_checks(), 1);
        // Enabled providers are not probed.
        assert_eq!(openai.health_checks(), 0);
    }
}
