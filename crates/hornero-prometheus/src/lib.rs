// SPDX-FileCopyrightText: 2026 Hornero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prometheus exporter for Hornero.
//!
//! Uses the metrics-rs facade with the Prometheus exporter. Metrics are
//! rendered as Prometheus text format via [`PrometheusExporter::render`],
//! which the CLI shell prints for `/prometheus`.

pub mod recording;

use hornero_core::HorneroError;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle, PrometheusRecorder};

pub use recording::register_metrics;

/// Installed Prometheus recorder and its render handle.
pub struct PrometheusExporter {
    handle: PrometheusHandle,
}

impl PrometheusExporter {
    /// Installs the Prometheus recorder globally.
    ///
    /// Only one recorder can be installed per process. Returns an error if
    /// a recorder is already installed.
    pub fn install() -> Result<Self, HorneroError> {
        let handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
            HorneroError::Internal(format!("failed to install Prometheus recorder: {e}"))
        })?;

        recording::register_metrics();

        tracing::info!("prometheus metrics recorder installed");

        Ok(Self { handle })
    }

    /// Builds a recorder without installing it, for scoped use with
    /// [`metrics::with_local_recorder`].
    pub fn unregistered() -> (Self, PrometheusRecorder) {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        (Self { handle }, recorder)
    }

    pub fn handle(&self) -> &PrometheusHandle {
        &self.handle
    }

    /// Render all collected metrics in Prometheus text format.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hornero_router::Metrics;
    use std::time::Duration;

    #[test]
    fn resolver_counters_render_with_labels() {
        let (exporter, recorder) = PrometheusExporter::unregistered();

        metrics::with_local_recorder(&recorder, || {
            register_metrics();
            let m = Metrics::new(["ollama", "gemini"]);
            m.record_request("complex");
            m.record_cache_hit();
            m.record_success("gemini");
            m.record_attempt("ollama", "unreachable", Duration::from_millis(3));
            m.record_attempt("gemini", "success", Duration::from_millis(120));
        });

        let text = exporter.render();
        assert!(text.contains(r#"hornero_requests_total{tier="complex"} 1"#), "{text}");
        assert!(text.contains("hornero_cache_hits_total 1"), "{text}");
        assert!(text.contains(r#"hornero_successes_total{provider="gemini"} 1"#), "{text}");
        assert!(
            text.contains(r#"hornero_provider_attempts_total{provider="ollama",outcome="unreachable"} 1"#),
            "{text}"
        );
        assert!(text.contains("hornero_attempt_latency_seconds"), "{text}");
    }

    #[test]
    fn descriptions_become_help_lines() {
        let (exporter, recorder) = PrometheusExporter::unregistered();

        metrics::with_local_recorder(&recorder, || {
            register_metrics();
            Metrics::new(["ollama"]).record_cache_hit();
        });

        assert!(exporter
            .render()
            .contains("# HELP hornero_cache_hits_total Resolutions served from the response cache"));
    }

    #[test]
    fn nothing_recorded_renders_nothing_for_hornero() {
        let (exporter, _recorder) = PrometheusExporter::unregistered();
        assert!(!exporter.render().contains("hornero_requests_total"));
    }
}
