// SPDX-FileCopyrightText: 2026 Hornero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builds adapters, the registry, and the resolver from configuration.

use std::collections::BTreeSet;
use std::sync::Arc;

use hornero_config::model::{HorneroConfig, ProviderConfig, ProviderKind};
use hornero_core::traits::{CredentialProvider, ProviderAdapter};
use hornero_core::{HorneroError, Tier};
use hornero_gemini::GeminiProvider;
use hornero_ollama::OllamaProvider;
use hornero_openai::OpenAiCompatProvider;
use hornero_router::{FallbackResolver, ProviderRegistry, TierChains};
use tracing::{debug, warn};

/// Instantiate the adapter for one `[providers.<name>]` section.
pub fn build_adapter(
    name: &str,
    config: &ProviderConfig,
    persona: &str,
    credentials: &dyn CredentialProvider,
) -> Result<Arc<dyn ProviderAdapter>, HorneroError> {
    let adapter: Arc<dyn ProviderAdapter> = match config.kind {
        ProviderKind::Ollama => Arc::new(OllamaProvider::new(name, config, persona)?),
        ProviderKind::Openai => Arc::new(OpenAiCompatProvider::new(
            name,
            config,
            persona,
            credentials,
        )?),
        ProviderKind::Gemini => Arc::new(GeminiProvider::new(name, config, persona, credentials)?),
    };
    Ok(adapter)
}

/// Register every enabled provider and drop disabled ones from the chains.
pub fn build_registry(
    config: &HorneroConfig,
    credentials: &dyn CredentialProvider,
) -> Result<ProviderRegistry, HorneroError> {
    let mut adapters = Vec::new();
    let mut enabled = BTreeSet::new();

    for (name, provider) in &config.providers {
        if !provider.enabled {
            debug!(provider = %name, "provider disabled in config");
            continue;
        }
        adapters.push(build_adapter(name, provider, &config.agent.persona, credentials)?);
        enabled.insert(name.as_str());
    }

    let mut chains = TierChains::from(&config.routing);
    chains.retain(|name| enabled.contains(name));
    for tier in Tier::ALL {
        if chains.get(tier).is_empty() {
            warn!(tier = %tier, "no enabled providers for tier");
        }
    }

    ProviderRegistry::new(adapters, chains)
}

/// The shared resolver for one process.
pub fn build_resolver(
    config: &HorneroConfig,
    credentials: &dyn CredentialProvider,
) -> Result<Arc<FallbackResolver>, HorneroError> {
    let registry = Arc::new(build_registry(config, credentials)?);
    Ok(Arc::new(FallbackResolver::from_config(config, registry)))
}
