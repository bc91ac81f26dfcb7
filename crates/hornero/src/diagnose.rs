// SPDX-FileCopyrightText: 2026 Hornero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `hornero diagnose` command implementation.
//!
//! Sends a fixed probe question to every registered provider, enabled or
//! not, and reports which ones answer.

use std::io::IsTerminal;
use std::time::Instant;

use hornero_core::{ErrorKind, ProviderResult};
use hornero_router::FallbackResolver;

/// Probe text sent to every provider.
pub const PROBE_TEXT: &str = "Responde solo: OK";

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    /// Provider answered.
    Pass,
    /// Provider has no credential configured.
    Warn,
    /// Provider failed.
    Fail,
}

/// Result of probing one provider.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
}

impl CheckResult {
    pub fn from_probe(result: &ProviderResult) -> Self {
        let (status, message) = if result.is_usable() {
            let answer: String = result.text.trim().chars().take(40).collect();
            (CheckStatus::Pass, answer)
        } else {
            let status = match result.error_kind {
                Some(ErrorKind::AuthMissing) => CheckStatus::Warn,
                _ => CheckStatus::Fail,
            };
            let message = result
                .detail
                .clone()
                .or_else(|| result.error_kind.map(|k| k.to_string()))
                .unwrap_or_else(|| "no answer".to_string());
            (status, message)
        };
        Self {
            name: result.provider_name.clone(),
            status,
            message,
        }
    }
}

/// Run the `hornero diagnose` command.
///
/// With `--plain`, disables colored output. Returns the number of providers
/// that answered.
pub async fn run_diagnose(resolver: &FallbackResolver, plain: bool) -> usize {
    let use_color = !plain && std::io::stdout().is_terminal();
    let start = Instant::now();

    let results: Vec<CheckResult> = resolver
        .probe_all(PROBE_TEXT)
        .await
        .iter()
        .map(CheckResult::from_probe)
        .collect();
    let elapsed_ms = start.elapsed().as_millis();

    println!();
    println!("  hornero diagnose");
    println!("  {}", "-".repeat(50));

    for result in &results {
        println!("{}", format_line(result, use_color));
    }

    let answered = results
        .iter()
        .filter(|r| r.status == CheckStatus::Pass)
        .count();

    println!();
    println!(
        "  {}",
        summary(answered, results.len(), elapsed_ms)
    );
    println!();

    answered
}

fn format_line(result: &CheckResult, use_color: bool) -> String {
    if use_color {
        use colored::Colorize;
        match result.status {
            CheckStatus::Pass => format!("    {} {:<12} {}", "✓".green(), result.name, result.message),
            CheckStatus::Warn => format!(
                "    {} {:<12} {}",
                "!".yellow(),
                result.name,
                result.message.yellow()
            ),
            CheckStatus::Fail => format!(
                "    {} {:<12} {}",
                "✗".red(),
                result.name,
                result.message.red()
            ),
        }
    } else {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[X]   ",
        };
        format!("    {tag} {:<12} {}", result.name, result.message)
    }
}

fn summary(answered: usize, total: usize, elapsed_ms: u128) -> String {
    match answered {
        0 => format!("No provider answered ({elapsed_ms}ms)."),
        n if n == total => format!("All {total} providers answered ({elapsed_ms}ms)."),
        n => format!("{n} of {total} providers answered ({elapsed_ms}ms)."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use hornero_core::ProviderAdapter;
    use hornero_router::{ComplexityClassifier, ProviderRegistry, ResolverOptions, TierChains};
    use hornero_test_utils::{MockOutcome, MockProvider};

    #[test]
    fn missing_key_is_a_warning() {
        let probe = ProviderResult::failure("gemini", ErrorKind::AuthMissing, "no API key found");
        let check = CheckResult::from_probe(&probe);
        assert_eq!(check.status, CheckStatus::Warn);
        assert_eq!(check.message, "no API key found");
    }

    #[test]
    fn long_answers_are_truncated() {
        let probe = ProviderResult::success("ollama", "OK ".repeat(40));
        let check = CheckResult::from_probe(&probe);
        assert_eq!(check.status, CheckStatus::Pass);
        assert!(check.message.chars().count() <= 40);
    }

    #[test]
    fn plain_lines_carry_tags() {
        let check = CheckResult {
            name: "deepseek".to_string(),
            status: CheckStatus::Fail,
            message: "HTTP 500".to_string(),
        };
        assert_eq!(format_line(&check, false), "    [X]    deepseek     HTTP 500");
    }

    #[test]
    fn summary_wording() {
        assert!(summary(0, 3, 5).starts_with("No provider answered"));
        assert!(summary(3, 3, 5).starts_with("All 3 providers"));
        assert!(summary(1, 3, 5).starts_with("1 of 3"));
    }

    #[tokio::test]
    async fn counts_answering_providers() {
        let ok = Arc::new(MockProvider::local("ollama"));
        let down = Arc::new(
            MockProvider::new("deepseek").always(MockOutcome::fail(ErrorKind::HttpError(500), "boom")),
        );
        let adapters: Vec<Arc<dyn ProviderAdapter>> = vec![ok.clone(), down];
        let registry = ProviderRegistry::new(
            adapters,
            TierChains {
                simple: vec!["ollama".to_string()],
                medium: vec!["deepseek".to_string()],
                complex: vec!["deepseek".to_string(), "ollama".to_string()],
            },
        )
        .unwrap();
        let resolver = FallbackResolver::new(
            Arc::new(registry),
            ComplexityClassifier::default(),
            ResolverOptions::default(),
        );

        assert_eq!(run_diagnose(&resolver, true).await, 1);
        assert_eq!(ok.received().await[0].0, PROBE_TEXT);
        assert_eq!(resolver.metrics().requests_total, 0);
    }
}
