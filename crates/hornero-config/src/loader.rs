// SPDX-FileCopyrightText: 2026 Hornero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./hornero.toml` > `~/.config/hornero/hornero.toml` > `/etc/hornero/hornero.toml`
//! with environment variable overrides via `HORNERO_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::HorneroConfig;

/// System-wide config file location.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/hornero/hornero.toml";

/// Local config file name, resolved against the working directory.
pub const LOCAL_CONFIG_FILE: &str = "hornero.toml";

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/hornero/hornero.toml` (system-wide)
/// 3. `~/.config/hornero/hornero.toml` (user XDG config)
/// 4. `./hornero.toml` (local directory)
/// 5. `HORNERO_*` environment variables
pub fn load_config() -> Result<HorneroConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<HorneroConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HorneroConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<HorneroConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HorneroConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(HorneroConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// `~/.config/hornero/hornero.toml`, when a config dir exists on this platform.
pub fn user_config_path() -> Option<std::path::PathBuf> {
    dirs::config_dir().map(|d| d.join("hornero").join(LOCAL_CONFIG_FILE))
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because keys contain
/// underscores: `HORNERO_ROUTING_CACHE_CAPACITY` must map to
/// `routing.cache_capacity`, not `routing.cache.capacity`.
fn env_provider() -> Env {
    Env::prefixed("HORNERO_").map(|key| map_env_key(key.as_str()).into())
}

/// Map a lowercased, prefix-stripped env key to a dotted figment path.
///
/// `providers_<name>_<field>` becomes `providers.<name>.<field>`; provider
/// names therefore cannot contain underscores when set through the env.
pub(crate) fn map_env_key(key: &str) -> String {
    if let Some(rest) = key.strip_prefix("providers_") {
        return match rest.split_once('_') {
            Some((name, field)) => format!("providers.{name}.{field}"),
            None => format!("providers.{rest}"),
        };
    }
    key.replacen("agent_", "agent.", 1)
        .replacen("routing_", "routing.", 1)
        .replacen("classifier_", "classifier.", 1)
}
