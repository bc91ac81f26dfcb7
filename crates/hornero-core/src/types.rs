// SPDX-FileCopyrightText: 2026 Hornero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the router, the adapters, and the CLI.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Discrete complexity bucket that selects a provider chain.
///
/// Parsing accepts the English names and the Spanish aliases `media` and
/// `alta`. `auto` is not a tier; see [`parse_tier`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Short lookups and greetings. Local model first.
    #[strum(to_string = "simple")]
    Simple,
    /// Reports, summaries, procedural questions.
    #[strum(to_string = "medium", serialize = "media")]
    Medium,
    /// Analysis, planning, forecasting. Premium hosted models first.
    #[strum(to_string = "complex", serialize = "alta")]
    Complex,
}

impl Tier {
    /// All concrete tiers in ascending complexity.
    pub const ALL: [Tier; 3] = [Tier::Simple, Tier::Medium, Tier::Complex];
}

/// Parse a tier selector where `auto` (or an empty string) means "classify".
pub fn parse_tier(s: &str) -> Result<Option<Tier>, strum::ParseError> {
    let trimmed = s.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("auto") {
        return Ok(None);
    }
    trimmed.parse::<Tier>().map(Some)
}

/// Where a provider runs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// Runs on the operator's machine (offline-capable).
    Local,
    /// Remote paid or free-tier API.
    Hosted,
}

/// Why a provider attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// 2xx response without usable text.
    EmptyResponse,
    /// Throttling or exhausted quota/balance (HTTP 429, 402).
    RateLimited,
    /// No credential resolvable for this provider.
    AuthMissing,
    /// Connection failure or per-call timeout.
    NetworkError,
    /// Non-2xx status that is not a throttle signal.
    HttpError(u16),
    /// Connection refused by a local server. Marks the provider disabled.
    Unreachable,
    /// Terminal: every provider in the selected chain failed.
    AllProvidersExhausted,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::EmptyResponse => write!(f, "empty response"),
            ErrorKind::RateLimited => write!(f, "rate limited"),
            ErrorKind::AuthMissing => write!(f, "credential missing"),
            ErrorKind::NetworkError => write!(f, "network error"),
            ErrorKind::HttpError(code) => write!(f, "http error {code}"),
            ErrorKind::Unreachable => write!(f, "unreachable"),
            ErrorKind::AllProvidersExhausted => write!(f, "all providers exhausted"),
        }
    }
}

impl ErrorKind {
    /// Map a non-success HTTP status to an error kind.
    pub fn from_status(status: u16) -> Self {
        match status {
            402 | 429 => ErrorKind::RateLimited,
            code => ErrorKind::HttpError(code),
        }
    }
}

/// A single incoming query. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub text: String,
    pub context: String,
    /// `None` means auto: the classifier picks the tier.
    pub tier: Option<Tier>,
}

impl Request {
    /// An auto-tier request with empty context.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            context: String::new(),
            tier: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    pub fn with_tier(mut self, tier: Option<Tier>) -> Self {
        self.tier = tier;
        self
    }
}

/// System prompt sent to every provider: the persona followed by the
/// request context, separated by a space. Blank context adds nothing.
pub fn system_prompt(persona: &str, context: &str) -> String {
    let context = context.trim();
    if context.is_empty() {
        persona.trim().to_string()
    } else {
        format!("{} {context}", persona.trim())
    }
}

/// Outcome of one provider attempt, or of a whole resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderResult {
    /// Answer text on success; user-facing fallback message on exhaustion.
    pub text: String,
    /// Provider that produced this result (`"none"` on exhaustion).
    pub provider_name: String,
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    /// Concrete error message of a failed attempt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Concrete model that answered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Produced by a local (offline) provider.
    #[serde(default)]
    pub local: bool,
    /// Tier the resolver used. Stamped by the resolver.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,
    /// Served from the response cache.
    #[serde(default)]
    pub cached: bool,
}

impl ProviderResult {
    /// A successful attempt.
    pub fn success(provider: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            provider_name: provider.into(),
            succeeded: true,
            error_kind: None,
            detail: None,
            model: None,
            local: false,
            tier: None,
            cached: false,
        }
    }

    /// A failed attempt with its kind and a concrete message.
    pub fn failure(
        provider: impl Into<String>,
        kind: ErrorKind,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            text: String::new(),
            provider_name: provider.into(),
            succeeded: false,
            error_kind: Some(kind),
            detail: Some(detail.into()),
            model: None,
            local: false,
            tier: None,
            cached: false,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_local(mut self, local: bool) -> Self {
        self.local = local;
        self
    }

    /// True when the attempt succeeded with non-blank text.
    pub fn is_usable(&self) -> bool {
        self.succeeded && !self.text.trim().is_empty()
    }

    /// `"<provider>: <detail>"`, or the kind when no detail was recorded.
    pub fn error_summary(&self) -> String {
        let detail = match (&self.detail, &self.error_kind) {
            (Some(d), _) => d.clone(),
            (None, Some(kind)) => kind.to_string(),
            (None, None) => "unknown error".to_string(),
        };
        format!("{}: {}", self.provider_name, detail)
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}
