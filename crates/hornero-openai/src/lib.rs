// SPDX-FileCopyrightText: 2026 Hornero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI-compatible provider adapter for Hornero.
//!
//! One adapter type serves every endpoint that speaks the Chat Completions
//! protocol: OpenAI itself, DeepSeek, and Groq. Each instance is registered
//! under its own name with its own base URL, models, and credential aliases.

pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use hornero_config::model::ProviderConfig;
use hornero_core::traits::{CredentialProvider, PluginAdapter, ProviderAdapter};
use hornero_core::{
    resolve_api_key, system_prompt, Capability, ErrorKind, HealthStatus, HorneroError,
    ProviderResult,
};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};

use crate::types::{ApiErrorResponse, ChatCompletionRequest, ChatCompletionResponse, ChatMessage};

/// Default OpenAI endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Hosted Chat Completions provider implementing [`ProviderAdapter`].
///
/// Within one attempt the configured models are tried in order, moving to
/// the next model on any failure. The last failure is returned.
pub struct OpenAiCompatProvider {
    name: String,
    client: reqwest::Client,
    base_url: String,
    models: Vec<String>,
    api_key: Option<SecretString>,
    key_names: Vec<String>,
    system_persona: String,
    max_tokens: u32,
    temperature: f32,
    timeout: Duration,
}

impl OpenAiCompatProvider {
    /// Creates a provider registered as `name` from its config section.
    ///
    /// A missing key is not an error here: `complete` reports
    /// [`ErrorKind::AuthMissing`] without touching the network.
    pub fn new(
        name: &str,
        config: &ProviderConfig,
        persona: &str,
        credentials: &dyn CredentialProvider,
    ) -> Result<Self, HorneroError> {
        if config.models.is_empty() {
            return Err(HorneroError::Config(format!(
                "provider `{name}` lists no models"
            )));
        }

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| HorneroError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        let api_key = resolve_api_key(
            config.api_key.as_deref(),
            credentials,
            &config.key_names,
            config.key_prefix.as_deref(),
        );
        if api_key.is_none() {
            warn!(provider = name, keys = ?config.key_names, "no API key found");
        }

        let base_url = config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string();

        info!(
            provider = name,
            models = ?config.models,
            base_url = %base_url,
            has_key = api_key.is_some(),
            "OpenAI-compatible provider initialized"
        );

        Ok(Self {
            name: name.to_string(),
            client,
            base_url,
            models: config.models.clone(),
            api_key,
            key_names: config.key_names.clone(),
            system_persona: persona.to_string(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete_with_model(
        &self,
        key: &SecretString,
        model: &str,
        text: &str,
        context: &str,
    ) -> ProviderResult {
        let request = ChatCompletionRequest {
            model: model.to_string(),
            messages: vec![
                ChatMessage::system(system_prompt(&self.system_persona, context)),
                ChatMessage::user(text),
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = match self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(key.expose_secret())
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                let detail = if e.is_timeout() {
                    "request timed out".to_string()
                } else {
                    format!("request failed: {e}")
                };
                return self.failure(ErrorKind::NetworkError, detail, model);
            }
        };

        let status = response.status();
        debug!(provider = %self.name, model, status = %status, "completion response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_err) => format!("HTTP {}: {}", status.as_u16(), api_err.error.message),
                Err(_) => format!("HTTP {}", status.as_u16()),
            };
            return self.failure(ErrorKind::from_status(status.as_u16()), detail, model);
        }

        match response.json::<ChatCompletionResponse>().await {
            Ok(body) => match body.first_content().map(str::trim) {
                Some(answer) if !answer.is_empty() => ProviderResult::success(&self.name, answer)
                    .with_model(body.model.clone().unwrap_or_else(|| model.to_string())),
                _ => self.failure(ErrorKind::EmptyResponse, "response had no choices", model),
            },
            Err(e) => self.failure(
                ErrorKind::EmptyResponse,
                format!("unreadable response body: {e}"),
                model,
            ),
        }
    }

    fn failure(&self, kind: ErrorKind, detail: impl Into<String>, model: &str) -> ProviderResult {
        ProviderResult::failure(&self.name, kind, detail).with_model(model)
    }

    fn auth_missing(&self) -> ProviderResult {
        ProviderResult::failure(
            &self.name,
            ErrorKind::AuthMissing,
            format!("no API key found in {}", self.key_names.join(", ")),
        )
    }
}

#[async_trait]
impl PluginAdapter for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    /// Lists models, which costs no tokens.
    async fn health_check(&self) -> HealthStatus {
        let Some(key) = &self.api_key else {
            return HealthStatus::Unhealthy("credential missing".to_string());
        };

        match self
            .client
            .get(format!("{}/models", self.base_url))
            .bearer_auth(key.expose_secret())
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => HealthStatus::Healthy,
            Ok(response) => match ErrorKind::from_status(response.status().as_u16()) {
                ErrorKind::RateLimited => HealthStatus::Degraded("rate limited".to_string()),
                kind => HealthStatus::Unhealthy(kind.to_string()),
            },
            Err(e) => HealthStatus::Unhealthy(format!("request failed: {e}")),
        }
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiCompatProvider {
    fn capability(&self) -> Capability {
        Capability::Hosted
    }

    async fn complete(&self, text: &str, context: &str) -> ProviderResult {
        let Some(key) = &self.api_key else {
            return self.auth_missing();
        };

        let mut last = None;
        for model in &self.models {
            let result = self.complete_with_model(key, model, text, context).await;
            if result.succeeded {
                return result;
            }
            debug!(
                provider = %self.name,
                model = %model,
                error = %result.error_summary(),
                "model failed, trying next model"
            );
            last = Some(result);
        }

        last.unwrap_or_else(|| {
            ProviderResult::failure(&self.name, ErrorKind::EmptyResponse, "no models configured")
        })
    }
}
