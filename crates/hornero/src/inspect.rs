// SPDX-FileCopyrightText: 2026 Hornero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only commands: `chains`, `classify`, and `config`.

use std::fmt::Write as _;

use hornero_config::HorneroConfig;
use hornero_core::{HealthStatus, HorneroError, PluginAdapter, Tier};
use hornero_router::{ComplexityClassifier, ProviderRegistry};

/// Placeholder printed instead of inline API keys.
const REDACTED: &str = "<redacted>";

/// Per-tier chains followed by a health check of every provider.
pub async fn render_chains(registry: &ProviderRegistry) -> String {
    let mut out = render_chain_table(registry);

    let names: Vec<&str> = registry.names().collect();
    let checks = names.iter().filter_map(|name| {
        registry
            .adapter(name)
            .map(|adapter| async move { (*name, adapter.health_check().await) })
    });
    let statuses = futures::future::join_all(checks).await;

    let _ = writeln!(out, "\nproviders");
    for (name, status) in statuses {
        let capability = registry
            .capability(name)
            .map(|c| c.to_string())
            .unwrap_or_default();
        let health = match status {
            HealthStatus::Healthy => "healthy".to_string(),
            HealthStatus::Degraded(why) => format!("degraded ({why})"),
            HealthStatus::Unhealthy(why) => format!("down ({why})"),
        };
        let _ = writeln!(out, "  {name:<10} {capability:<7} {health}");
    }
    out.trim_end().to_string()
}

fn render_chain_table(registry: &ProviderRegistry) -> String {
    let mut out = String::new();
    for tier in Tier::ALL {
        let chain = registry.chain_for(tier);
        let shown = if chain.is_empty() {
            "(empty)".to_string()
        } else {
            chain.join(" → ")
        };
        let _ = writeln!(out, "{:<8} {shown}", tier.to_string());
    }
    out
}

/// Tier and score breakdown for `text`.
pub fn render_classification(classifier: &ComplexityClassifier, text: &str) -> String {
    let score = classifier.score(text);
    format!(
        "tier:     {}\nlength:   {} ({} chars)\ncomplex:  {} hit(s) × 2\nmedium:   {} hit(s)\ntotal:    {}",
        score.tier(),
        score.length_score,
        text.chars().count(),
        score.complex_hits,
        score.medium_hits,
        score.total,
    )
}

/// The effective configuration as TOML, with inline keys redacted.
pub fn render_config(config: &HorneroConfig) -> Result<String, HorneroError> {
    let mut shown = config.clone();
    for provider in shown.providers.values_mut() {
        if provider.api_key.is_some() {
            provider.api_key = Some(REDACTED.to_string());
        }
    }
    toml::to_string_pretty(&shown)
        .map_err(|e| HorneroError::Internal(format!("failed to render config: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use hornero_core::ProviderAdapter;
    use hornero_router::TierChains;
    use hornero_test_utils::MockProvider;

    #[tokio::test]
    async fn chains_show_order_and_health() {
        let ollama = Arc::new(
            MockProvider::local("ollama").with_health(HealthStatus::Unhealthy("refused".into())),
        );
        let gemini = Arc::new(MockProvider::new("gemini"));
        let adapters: Vec<Arc<dyn ProviderAdapter>> = vec![ollama, gemini];
        let registry = ProviderRegistry::new(
            adapters,
            TierChains {
                simple: vec!["ollama".into(), "gemini".into()],
                medium: vec!["gemini".into()],
                complex: vec![],
            },
        )
        .unwrap();

        let out = render_chains(&registry).await;
        assert!(out.contains("simple   ollama → gemini"), "{out}");
        assert!(out.contains("complex  (empty)"), "{out}");
        assert!(out.contains("ollama     local   down (refused)"), "{out}");
        assert!(out.contains("gemini     hosted  healthy"), "{out}");
    }

    #[test]
    fn classification_breakdown() {
        let out = render_classification(&ComplexityClassifier::default(), "Analiza el plan de ventas");
        assert!(out.starts_with("tier:     complex"), "{out}");
        assert!(out.contains("complex:  2 hit(s)"), "{out}");
        assert!(out.contains("medium:   1 hit(s)"), "{out}");
    }

    #[test]
    fn config_redacts_inline_keys() {
        let mut config = HorneroConfig::default();
        config.providers.get_mut("deepseek").unwrap().api_key = Some("sk-secret".into());

        let out = render_config(&config).unwrap();
        assert!(!out.contains("sk-secret"));
        assert!(out.contains(REDACTED));
        assert!(out.contains("[routing]"));
    }
}
