// SPDX-FileCopyrightText: 2026 Hornero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential providers and alias-aware key resolution.
//!
//! None of these scan the filesystem. Secret discovery beyond process
//! environment and inline configuration belongs to whoever constructs the
//! provider chain.

use std::collections::HashMap;

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::traits::CredentialProvider;

/// Reads secrets from process environment variables.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvCredentials;

impl CredentialProvider for EnvCredentials {
    fn lookup(&self, key: &str) -> Option<SecretString> {
        std::env::var(key)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(SecretString::from)
    }
}

/// Fixed in-memory secrets. Used for inline config values and tests.
#[derive(Default)]
pub struct StaticCredentials {
    values: HashMap<String, SecretString>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values
            .insert(key.into(), SecretString::from(value.into()));
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl CredentialProvider for StaticCredentials {
    fn lookup(&self, key: &str) -> Option<SecretString> {
        self.values
            .get(key)
            .map(|v| SecretString::from(v.expose_secret().to_string()))
    }
}

/// Consults each provider in order; first hit wins.
#[derive(Default)]
pub struct ChainedCredentials {
    providers: Vec<Box<dyn CredentialProvider>>,
}

impl ChainedCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, provider: impl CredentialProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }
}

impl CredentialProvider for ChainedCredentials {
    fn lookup(&self, key: &str) -> Option<SecretString> {
        self.providers.iter().find_map(|p| p.lookup(key))
    }
}

/// Resolve a credential by trying each alias in order.
///
/// Values are trimmed and stripped of surrounding quotes. When
/// `required_prefix` is set, values that do not start with it are ignored
/// (a Gemini key must start with `AIza`, a DeepSeek key with `sk-`).
pub fn resolve_credential(
    provider: &dyn CredentialProvider,
    key_names: &[String],
    required_prefix: Option<&str>,
) -> Option<SecretString> {
    for name in key_names {
        let Some(raw) = provider.lookup(name) else {
            continue;
        };
        let value = raw
            .expose_secret()
            .trim()
            .trim_matches(|c| c == '"' || c == '\'')
            .trim();
        if value.is_empty() {
            continue;
        }
        if let Some(prefix) = required_prefix
            && !value.starts_with(prefix)
        {
            debug!(key = %name, "credential ignored: unexpected prefix");
            continue;
        }
        return Some(SecretString::from(value.to_string()));
    }
    None
}

/// Resolve an adapter's key: an inline config value wins over `key_names`
/// lookups. The inline value is held to the same prefix rule.
pub fn resolve_api_key(
    inline: Option<&str>,
    provider: &dyn CredentialProvider,
    key_names: &[String],
    required_prefix: Option<&str>,
) -> Option<SecretString> {
    const INLINE: &str = "inline api_key";

    if let Some(value) = inline {
        let inline_source = StaticCredentials::new().with(INLINE, value);
        if let Some(key) = resolve_credential(&inline_source, &[INLINE.to_string()], required_prefix) {
            return Some(key);
        }
    }
    resolve_credential(provider, key_names, required_prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn inline_key_beats_environment() {
        let env = StaticCredentials::new().with("OPENAI_API_KEY", "sk-env");
        let key = resolve_api_key(Some("sk-inline"), &env, &names(&["OPENAI_API_KEY"]), None).unwrap();
        assert_eq!(key.expose_secret(), "sk-inline");
    }

    #[test]
    fn blank_or_misprefixed_inline_key_falls_back() {
        let env = StaticCredentials::new().with("GEMINI_API_KEY", "AIza-env");
        let names = names(&["GEMINI_API_KEY"]);
        let key = resolve_api_key(Some("  "), &env, &names, Some("AIza")).unwrap();
        assert_eq!(key.expose_secret(), "AIza-env");
        let key = resolve_api_key(Some("sk-wrong"), &env, &names, Some("AIza")).unwrap();
        assert_eq!(key.expose_secret(), "AIza-env");
    }

    #[test]
    fn first_alias_with_value_wins() {
        let creds = StaticCredentials::new()
            .with("GEMINI_KEY", "AIza-second")
            .with("AI_API_KEY", "AIza-third");
        let key = resolve_credential(
            &creds,
            &names(&["GEMINI_API_KEY", "GEMINI_KEY", "AI_API_KEY"]),
            Some("AIza"),
        )
        .unwrap();
        assert_eq!(key.expose_secret(), "AIza-second");
    }

    #[test]
    fn prefix_mismatch_is_skipped() {
        let creds = StaticCredentials::new()
            .with("DEEPSEEK_API_KEY", "not-a-deepseek-key")
            .with("DEEPSEEK_KEY", "sk-valid");
        let key = resolve_credential(
            &creds,
            &names(&["DEEPSEEK_API_KEY", "DEEPSEEK_KEY"]),
            Some("sk-"),
        )
        .unwrap();
        assert_eq!(key.expose_secret(), "sk-valid");
    }

    #[test]
    fn quotes_and_whitespace_are_stripped() {
        let creds = StaticCredentials::new().with("GROQ_API_KEY", "  \"gsk_abc\" ");
        let key = resolve_credential(&creds, &names(&["GROQ_API_KEY"]), None).unwrap();
        assert_eq!(key.expose_secret(), "gsk_abc");
    }

    #[test]
    fn missing_key_resolves_to_none() {
        let creds = StaticCredentials::new();
        assert!(resolve_credential(&creds, &names(&["OPENAI_API_KEY"]), None).is_none());
    }

    #[test]
    fn chained_credentials_prefers_earlier_provider() {
        let chained = ChainedCredentials::new()
            .push(StaticCredentials::new().with("OPENAI_API_KEY", "sk-inline"))
            .push(StaticCredentials::new().with("OPENAI_API_KEY", "sk-env"));
        assert_eq!(
            chained.lookup("OPENAI_API_KEY").unwrap().expose_secret(),
            "sk-inline"
        );
        assert!(chained.lookup("MISSING").is_none());
    }

    #[test]
    fn env_credentials_ignore_unset_variables() {
        assert!(EnvCredentials
            .lookup("HORNERO_TEST_SURELY_UNSET_VARIABLE_9f1c")
            .is_none());
    }
}
