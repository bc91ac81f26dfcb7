// SPDX-FileCopyrightText: 2026 Hornero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Hornero provider router.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Top-level Hornero configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to the stock bakery ERP setup.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HorneroConfig {
    /// Assistant identity and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Per-tier provider chains and response cache.
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Keyword lists for complexity classification.
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Provider definitions keyed by registry name.
    #[serde(default = "default_providers")]
    pub providers: BTreeMap<String, ProviderConfig>,
}

impl Default for HorneroConfig {
    fn default() -> Self {
        Self {
            agent: AgentConfig::default(),
            routing: RoutingConfig::default(),
            classifier: ClassifierConfig::default(),
            providers: default_providers(),
        }
    }
}

/// Assistant identity and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the assistant.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Persona prepended to the system prompt; the request context follows it.
    #[serde(default = "default_persona")]
    pub persona: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            persona: default_persona(),
        }
    }
}

fn default_agent_name() -> String {
    "genesis".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_persona() -> String {
    "Eres GENESIS, asistente ERP experto.".to_string()
}

/// Provider chain and cache configuration.
///
/// Each chain is an ordered list of provider names tried one at a time
/// until one answers.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// Chain for simple queries (local model first).
    #[serde(default = "default_simple_chain")]
    pub simple: Vec<String>,

    /// Chain for medium queries.
    #[serde(default = "default_medium_chain")]
    pub medium: Vec<String>,

    /// Chain for complex queries (premium hosted models first).
    #[serde(default = "default_complex_chain")]
    pub complex: Vec<String>,

    /// Maximum cached responses. 0 disables the cache.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Optional cache entry lifetime in seconds. Unset means entries never expire.
    #[serde(default)]
    pub cache_ttl_secs: Option<u64>,

    /// Upper bound on a single provider attempt, enforced by the resolver.
    #[serde(default = "default_attempt_timeout_secs")]
    pub attempt_timeout_secs: u64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            simple: default_simple_chain(),
            medium: default_medium_chain(),
            complex: default_complex_chain(),
            cache_capacity: default_cache_capacity(),
            cache_ttl_secs: None,
            attempt_timeout_secs: default_attempt_timeout_secs(),
        }
    }
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn default_simple_chain() -> Vec<String> {
    names(&["ollama", "deepseek", "gemini", "openai"])
}

fn default_medium_chain() -> Vec<String> {
    names(&["deepseek", "gemini", "ollama", "openai"])
}

fn default_complex_chain() -> Vec<String> {
    names(&["gemini", "openai", "deepseek", "ollama"])
}

fn default_cache_capacity() -> usize {
    256
}

fn default_attempt_timeout_secs() -> u64 {
    40 // adapter HTTP timeout (30s) plus the local liveness probe (5s)
}

/// Keyword lists for the complexity classifier.
///
/// Matching is case-insensitive substring containment, so `plan` also
/// matches `planta`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClassifierConfig {
    /// Each hit adds 2 to the complexity score.
    #[serde(default = "default_complex_keywords")]
    pub complex_keywords: Vec<String>,

    /// Each hit adds 1 to the complexity score.
    #[serde(default = "default_medium_keywords")]
    pub medium_keywords: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            complex_keywords: default_complex_keywords(),
            medium_keywords: default_medium_keywords(),
        }
    }
}

fn default_complex_keywords() -> Vec<String> {
    names(&[
        "analiza",
        "estrategia",
        "plan",
        "audita",
        "optimiza",
        "diagnóstico",
        "riesgo",
        "proyección",
        "modelo financiero",
        "legal",
        "política",
        "compliance",
        "kpi",
        "forecast",
    ])
}

fn default_medium_keywords() -> Vec<String> {
    names(&[
        "reporte",
        "resumen",
        "explica",
        "detalle",
        "consulta",
        "configura",
        "pasos",
        "procedimiento",
        "documenta",
        "inventario",
        "ventas",
        "compras",
        "contabilidad",
    ])
}

/// Wire protocol spoken by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Ollama native chat API (local).
    Ollama,
    /// OpenAI-compatible `/chat/completions` (OpenAI, DeepSeek, Groq).
    Openai,
    /// Google Generative Language `generateContent`.
    Gemini,
}

/// One provider definition.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    pub kind: ProviderKind,

    /// Disabled providers are dropped from every chain at startup.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// API base URL. Unset uses the adapter's stock endpoint.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Models tried in order within a single attempt.
    #[serde(default)]
    pub models: Vec<String>,

    /// Inline API key. Takes precedence over `key_names` lookups.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Credential names looked up in order (environment variables by default).
    #[serde(default)]
    pub key_names: Vec<String>,

    /// Keys that do not start with this prefix are ignored.
    #[serde(default)]
    pub key_prefix: Option<String>,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Per-request HTTP timeout in seconds.
    #[serde(default = "default_provider_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    /// A provider of `kind` with stock tuning and no credentials.
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            enabled: true,
            base_url: None,
            models: Vec::new(),
            api_key: None,
            key_names: Vec::new(),
            key_prefix: None,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_provider_timeout_secs(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_tokens() -> u32 {
    500
}

fn default_temperature() -> f32 {
    0.7
}

fn default_provider_timeout_secs() -> u64 {
    30
}

/// The stock provider set: local Ollama, DeepSeek, Gemini, OpenAI, and Groq.
///
/// Groq is defined but not part of any default chain.
pub fn default_providers() -> BTreeMap<String, ProviderConfig> {
    let mut providers = BTreeMap::new();

    let mut ollama = ProviderConfig::new(ProviderKind::Ollama);
    ollama.base_url = Some("http://localhost:11434".to_string());
    ollama.models = names(&["llama3.1"]);
    providers.insert("ollama".to_string(), ollama);

    let mut deepseek = ProviderConfig::new(ProviderKind::Openai);
    deepseek.base_url = Some("https://api.deepseek.com/v1".to_string());
    deepseek.models = names(&["deepseek-chat"]);
    deepseek.key_names = names(&["DEEPSEEK_API_KEY"]);
    deepseek.key_prefix = Some("sk-".to_string());
    providers.insert("deepseek".to_string(), deepseek);

    let mut gemini = ProviderConfig::new(ProviderKind::Gemini);
    gemini.base_url = Some("https://generativelanguage.googleapis.com/v1beta".to_string());
    gemini.models = names(&["gemini-1.5-flash", "gemini-pro", "gemini-1.5-pro"]);
    gemini.key_names = names(&["GEMINI_API_KEY", "GEMINI_KEY", "AI_API_KEY"]);
    gemini.key_prefix = Some("AIza".to_string());
    providers.insert("gemini".to_string(), gemini);

    let mut openai = ProviderConfig::new(ProviderKind::Openai);
    openai.base_url = Some("https://api.openai.com/v1".to_string());
    openai.models = names(&["gpt-4o-mini"]);
    openai.key_names = names(&["OPENAI_API_KEY"]);
    providers.insert("openai".to_string(), openai);

    let mut groq = ProviderConfig::new(ProviderKind::Openai);
    groq.base_url = Some("https://api.groq.com/openai/v1".to_string());
    groq.models = names(&["llama3-8b-8192", "mixtral-8x7b-32768", "llama3-70b-8192"]);
    groq.key_names = names(&["GROQ_API_KEY", "GROQ_KEY"]);
    groq.max_tokens = 1024;
    providers.insert("groq".to_string(), groq);

    providers
}
