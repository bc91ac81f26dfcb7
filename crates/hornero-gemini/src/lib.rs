// SPDX-FileCopyrightText: 2026 Hornero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Gemini provider adapter for Hornero.
//!
//! Uses the Generative Language REST API. The API key travels as the `key`
//! query parameter, so request errors are logged with their URL stripped.

pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use hornero_config::model::ProviderConfig;
use hornero_core::traits::{CredentialProvider, PluginAdapter, ProviderAdapter};
use hornero_core::{
    resolve_api_key, system_prompt, Capability, ErrorKind, HealthStatus, HorneroError,
    ProviderResult,
};
use reqwest::Url;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};

use crate::types::{
    ApiErrorResponse, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
};

/// Default Generative Language endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const TOP_P: f32 = 0.95;

/// Gemini provider implementing [`ProviderAdapter`].
///
/// Every configured model is tried in order on any failure; the last
/// failure is returned when none answers.
pub struct GeminiProvider {
    name: String,
    client: reqwest::Client,
    base_url: String,
    models: Vec<String>,
    api_key: Option<SecretString>,
    key_names: Vec<String>,
    system_persona: String,
    generation: GenerationConfig,
    timeout: Duration,
}

impl GeminiProvider {
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
            has_key = api_key.is_some(),
            "Gemini provider initialized"
        );

        Ok(Self {
            name: name.to_string(),
            client,
            base_url,
            models: config.models.clone(),
            api_key,
            key_names: config.key_names.clone(),
            system_persona: persona.to_string(),
            generation: GenerationConfig {
                temperature: config.temperature,
                max_output_tokens: config.max_tokens,
                top_p: TOP_P,
            },
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn keyed_url(&self, path: &str, key: &SecretString) -> Result<Url, String> {
        Url::parse_with_params(
            &format!("{}/{path}", self.base_url),
            &[("key", key.expose_secret())],
        )
        .map_err(|e| format!("invalid base URL: {e}"))
    }

    async fn generate(
        &self,
        key: &SecretString,
        model: &str,
        text: &str,
        context: &str,
    ) -> ProviderResult {
        let url = match self.keyed_url(&format!("models/{model}:generateContent"), key) {
            Ok(url) => url,
            Err(detail) => return self.failure(ErrorKind::NetworkError, detail, model),
        };

        let prompt = format!(
            "{}\n\nUsuario: {text}",
            system_prompt(&self.system_persona, context)
        );
        let request = GenerateContentRequest::user_text(prompt, self.generation);

        let response = match self
            .client
            .post(url)
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
                    format!("request failed: {}", e.without_url())
                };
                return self.failure(ErrorKind::NetworkError, detail, model);
            }
        };

        let status = response.status();
        debug!(provider = %self.name, model, status = %status, "generateContent response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_err) => format!("HTTP {}: {}", status.as_u16(), api_err.error.message),
                Err(_) => format!("HTTP {}", status.as_u16()),
            };
            return self.failure(ErrorKind::from_status(status.as_u16()), detail, model);
        }

        match response.json::<GenerateContentResponse>().await {
            Ok(body) => match body.first_text().map(str::trim) {
                Some(answer) if !answer.is_empty() => {
                    ProviderResult::success(&self.name, answer).with_model(model)
                }
                _ => self.failure(ErrorKind::EmptyResponse, "response had no candidate text", model),
            },
            Err(e) => self.failure(
                ErrorKind::EmptyResponse,
                format!("unreadable response body: {}", e.without_url()),
                model,
            ),
        }
    }

    fn failure(&self, kind: ErrorKind, detail: impl Into<String>, model: &str) -> ProviderResult {
        ProviderResult::failure(&self.name, kind, detail).with_model(model)
    }
}

#[async_trait]
impl PluginAdapter for GeminiProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn health_check(&self) -> HealthStatus {
        let Some(key) = &self.api_key else {
            return HealthStatus::Unhealthy("credential missing".to_string());
        };
        let url = match self.keyed_url("models", key) {
            Ok(url) => url,
            Err(detail) => return HealthStatus::Unhealthy(detail),
        };

        match self.client.get(url).timeout(self.timeout).send().await {
            Ok(response) if response.status().is_success() => HealthStatus::Healthy,
            Ok(response) => match ErrorKind::from_status(response.status().as_u16()) {
                ErrorKind::RateLimited => HealthStatus::Degraded("rate limited".to_string()),
                kind => HealthStatus::Unhealthy(kind.to_string()),
            },
            Err(e) => HealthStatus::Unhealthy(format!("request failed: {}", e.without_url())),
        }
    }
}

#[async_trait]
impl ProviderAdapter for GeminiProvider {
    fn capability(&self) -> Capability {
        Capability::Hosted
    }

    async fn complete(&self, text: &str, context: &str) -> ProviderResult {
        let Some(key) = &self.api_key else {
            return ProviderResult::failure(
                &self.name,
                ErrorKind::AuthMissing,
                format!("no API key found in {}", self.key_names.join(", ")),
            );
        };

        let mut last = None;
        for model in &self.models {
            let result = self.generate(key, model, text, context).await;
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
