// SPDX-FileCopyrightText: 2026 Hornero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as chains naming defined providers and sane timeout values.

use std::collections::HashSet;

use crate::diagnostic::{suggest_key, ConfigError};
use crate::model::{HorneroConfig, ProviderKind};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &HorneroConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.agent.log_level.to_lowercase().as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "agent.log_level `{}` is not one of {}",
                config.agent.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    let known: Vec<&str> = config.providers.keys().map(String::as_str).collect();
    let chains = [
        ("simple", &config.routing.simple),
        ("medium", &config.routing.medium),
        ("complex", &config.routing.complex),
    ];
    for (tier, chain) in chains {
        let mut seen = HashSet::new();
        for name in chain {
            if !config.providers.contains_key(name) {
                errors.push(ConfigError::UnknownProvider {
                    tier: tier.to_string(),
                    name: name.clone(),
                    suggestion: suggest_key(name, &known),
                    known: known.join(", "),
                });
            }
            if !seen.insert(name.as_str()) {
                errors.push(ConfigError::Validation {
                    message: format!("routing.{tier} lists provider `{name}` more than once"),
                });
            }
        }
    }

    if config.routing.cache_ttl_secs == Some(0) {
        errors.push(ConfigError::Validation {
            message: "routing.cache_ttl_secs must be at least 1 when set".to_string(),
        });
    }

    if config.routing.attempt_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "routing.attempt_timeout_secs must be at least 1".to_string(),
        });
    }

    for (name, provider) in &config.providers {
        if provider.models.is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("providers.{name}.models must list at least one model"),
            });
        }
        if provider.timeout_secs == 0 {
            errors.push(ConfigError::Validation {
                message: format!("providers.{name}.timeout_secs must be at least 1"),
            });
        }
        if !(0.0..=2.0).contains(&provider.temperature) {
            errors.push(ConfigError::Validation {
                message: format!(
                    "providers.{name}.temperature must be between 0.0 and 2.0, got {}",
                    provider.temperature
                ),
            });
        }
        if provider.max_tokens == 0 {
            errors.push(ConfigError::Validation {
                message: format!("providers.{name}.max_tokens must be at least 1"),
            });
        }
        // Hosted providers need somewhere to find a key.
        if provider.kind != ProviderKind::Ollama
            && provider.api_key.is_none()
            && provider.key_names.is_empty()
        {
            errors.push(ConfigError::Validation {
                message: format!("providers.{name} needs `api_key` or `key_names`"),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
