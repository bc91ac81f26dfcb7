// SPDX-FileCopyrightText: 2026 Hornero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ollama local model adapter for Hornero.
//!
//! Talks to Ollama's native API. Every completion is preceded by a cheap
//! `GET /api/tags` liveness probe; a refused connection reports
//! [`ErrorKind::Unreachable`] so the registry stops routing here until the
//! provider is re-probed.

pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use hornero_config::model::ProviderConfig;
use hornero_core::traits::{PluginAdapter, ProviderAdapter};
use hornero_core::{
    system_prompt, Capability, ErrorKind, HealthStatus, HorneroError, ProviderResult,
};
use tracing::{debug, info};

use crate::types::{ChatMessage, ChatOptions, ChatRequest, ChatResponse, ErrorResponse, TagsResponse};

/// Default Ollama endpoint.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Model used when the config lists none.
pub const DEFAULT_MODEL: &str = "llama3.1";

/// Liveness probe timeout.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Local Ollama provider implementing [`ProviderAdapter`].
pub struct OllamaProvider {
    name: String,
    client: reqwest::Client,
    base_url: String,
    model: String,
    system_persona: String,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
}

impl OllamaProvider {
    /// Creates a provider registered as `name` from its config section.
    ///
    /// Only the first configured model is used.
    pub fn new(name: &str, config: &ProviderConfig, persona: &str) -> Result<Self, HorneroError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| HorneroError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        let base_url = config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string();
        let model = config
            .models
            .first()
            .cloned()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        info!(provider = name, model = %model, base_url = %base_url, "Ollama provider initialized");

        Ok(Self {
            name: name.to_string(),
            client,
            base_url,
            model,
            system_persona: persona.to_string(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// `GET /api/tags` under the probe timeout.
    async fn probe(&self) -> Result<TagsResponse, (ErrorKind, String)> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
            .map_err(|e| classify_send_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err((
                ErrorKind::from_status(status.as_u16()),
                format!("liveness probe returned HTTP {}", status.as_u16()),
            ));
        }

        response
            .json::<TagsResponse>()
            .await
            .map_err(|e| (ErrorKind::NetworkError, format!("unreadable /api/tags body: {e}")))
    }

    async fn chat(&self, text: &str, context: &str) -> ProviderResult {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(system_prompt(&self.system_persona, context)),
                ChatMessage::user(text),
            ],
            stream: false,
            options: ChatOptions {
                temperature: self.temperature,
                num_predict: self.max_tokens,
            },
        };

        let response = match self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                let (kind, detail) = classify_send_error(&e);
                return self.failure(kind, detail);
            }
        };

        let status = response.status();
        debug!(provider = %self.name, status = %status, "chat response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(err) => format!("HTTP {}: {}", status.as_u16(), err.error),
                Err(_) => format!("HTTP {}", status.as_u16()),
            };
            return self.failure(ErrorKind::from_status(status.as_u16()), detail);
        }

        match response.json::<ChatResponse>().await {
            Ok(body) => match body.content().map(str::trim) {
                Some(answer) if !answer.is_empty() => ProviderResult::success(&self.name, answer)
                    .with_model(body.model.clone().unwrap_or_else(|| self.model.clone()))
                    .with_local(true),
                _ => self.failure(ErrorKind::EmptyResponse, "response had no message content"),
            },
            Err(e) => self.failure(ErrorKind::EmptyResponse, format!("unreadable response body: {e}")),
        }
    }

    fn failure(&self, kind: ErrorKind, detail: impl Into<String>) -> ProviderResult {
        ProviderResult::failure(&self.name, kind, detail)
            .with_model(self.model.clone())
            .with_local(true)
    }
}

/// A refused or unresolvable connection means the server is not running.
fn classify_send_error(e: &reqwest::Error) -> (ErrorKind, String) {
    if e.is_timeout() {
        (ErrorKind::NetworkError, "request timed out".to_string())
    } else if e.is_connect() {
        (ErrorKind::Unreachable, format!("server not reachable: {e}"))
    } else {
        (ErrorKind::NetworkError, format!("request failed: {e}"))
    }
}

#[async_trait]
impl PluginAdapter for OllamaProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn health_check(&self) -> HealthStatus {
        match self.probe().await {
            Ok(tags) if tags.models.iter().any(|m| m.name.starts_with(&self.model)) => {
                HealthStatus::Healthy
            }
            Ok(_) => HealthStatus::Degraded(format!("model `{}` is not pulled", self.model)),
            Err((_, detail)) => HealthStatus::Unhealthy(detail),
        }
    }
}

#[async_trait]
impl ProviderAdapter for OllamaProvider {
    fn capability(&self) -> Capability {
        Capability::Local
    }

    async fn complete(&self, text: &str, context: &str) -> ProviderResult {
        if let Err((kind, detail)) = self.probe().await {
            debug!(provider = %self.name, error = %detail, "liveness probe failed");
            return self.failure(kind, detail);
        }
        self.chat(text, context).await
    }
}
