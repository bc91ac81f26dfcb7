// SPDX-FileCopyrightText: 2026 Hornero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `hornero shell` command implementation.
//!
//! Interactive REPL over one shared resolver, so repeated questions are
//! served from the response cache. Lines starting with `/` are commands;
//! anything else is resolved. Ctrl+C during a resolution cancels it.

use std::fmt::Write as _;
use std::sync::Arc;

use colored::Colorize;
use hornero_core::{parse_tier, HealthStatus, HorneroError, Request, Tier};
use hornero_prometheus::PrometheusExporter;
use hornero_router::FallbackResolver;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::ask::footer;

const HELP: &str = "\
/metrics            counters and per-provider usage
/prometheus         metrics in Prometheus text format
/clear              empty the response cache
/reprobe            health-check disabled providers
/reset [provider]   re-enable one or all providers
/tier <t>           simple | medium | complex | auto
/context <text>     context sent with every question (empty clears)
/quit               leave the shell";

/// What the REPL should do after a line.
#[derive(Debug, PartialEq)]
pub enum Step {
    /// Print this and prompt again.
    Print(String),
    /// Resolve this request.
    Ask(Request),
    Quit,
}

/// Shell state carried between lines.
pub struct Shell {
    resolver: Arc<FallbackResolver>,
    exporter: Option<PrometheusExporter>,
    tier: Option<Tier>,
    context: String,
}

impl Shell {
    pub fn new(
        resolver: Arc<FallbackResolver>,
        exporter: Option<PrometheusExporter>,
        tier: Option<Tier>,
        context: String,
    ) -> Self {
        Self {
            resolver,
            exporter,
            tier,
            context,
        }
    }

    /// Interpret one input line.
    pub async fn step(&mut self, line: &str) -> Step {
        let line = line.trim();
        let Some(command) = line.strip_prefix('/') else {
            return Step::Ask(
                Request::new(line)
                    .with_context(self.context.clone())
                    .with_tier(self.tier),
            );
        };

        let (name, arg) = match command.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (command, ""),
        };

        match name {
            "quit" | "exit" => Step::Quit,
            "help" => Step::Print(HELP.to_string()),
            "metrics" => Step::Print(self.render_metrics()),
            "prometheus" => Step::Print(match &self.exporter {
                Some(exporter) => exporter.render(),
                None => "prometheus recorder not installed".to_string(),
            }),
            "clear" => {
                self.resolver.clear_cache();
                Step::Print("cache cleared".to_string())
            }
            "reprobe" => Step::Print(self.reprobe().await),
            "reset" if arg.is_empty() => {
                self.resolver.registry().reset_all();
                Step::Print("all providers enabled".to_string())
            }
            "reset" => {
                if self.resolver.registry().reset(arg) {
                    Step::Print(format!("{arg} enabled"))
                } else {
                    Step::Print(format!("unknown provider: {arg}"))
                }
            }
            "tier" => match parse_tier(arg) {
                Ok(tier) => {
                    self.tier = tier;
                    Step::Print(format!(
                        "tier: {}",
                        tier.map_or("auto".to_string(), |t| t.to_string())
                    ))
                }
                Err(_) => Step::Print(format!(
                    "unknown tier `{arg}` (simple, medium, complex, auto)"
                )),
            },
            "context" => {
                self.context = arg.to_string();
                if arg.is_empty() {
                    Step::Print("context cleared".to_string())
                } else {
                    Step::Print(format!("context: {arg}"))
                }
            }
            other => Step::Print(format!("unknown command /{other}, try /help")),
        }
    }

    fn render_metrics(&self) -> String {
        let snap = self.resolver.metrics();
        let mut out = String::new();
        let _ = writeln!(out, "requests:    {}", snap.requests_total);
        let _ = writeln!(out, "successes:   {}", snap.successes_total);
        let _ = writeln!(out, "cache hits:  {}", snap.cache_hits_total);
        let _ = writeln!(out, "cache size:  {}", snap.cache_size);
        let _ = writeln!(out, "success:     {:.1}%", snap.success_rate * 100.0);
        for (provider, count) in &snap.per_provider_usage {
            let state = if self.resolver.registry().is_enabled(provider) {
                ""
            } else {
                " (disabled)"
            };
            let _ = writeln!(out, "  {provider:<10} {count}{state}");
        }
        out.trim_end().to_string()
    }

    async fn reprobe(&self) -> String {
        let outcomes = self.resolver.registry().reprobe().await;
        if outcomes.is_empty() {
            return "no disabled providers".to_string();
        }
        outcomes
            .iter()
            .map(|o| match &o.status {
                HealthStatus::Healthy => format!("{}: enabled", o.name),
                HealthStatus::Degraded(why) | HealthStatus::Unhealthy(why) => {
                    format!("{}: still disabled ({why})", o.name)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Resolve `request`, cancelling on Ctrl+C.
    async fn ask(&self, request: &Request) -> Result<(), HorneroError> {
        let token = CancellationToken::new();
        let on_interrupt = token.clone();
        let watcher = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                on_interrupt.cancel();
            }
        });

        let outcome = self.resolver.resolve_with_cancel(request, &token).await;
        watcher.abort();

        let result = outcome?;
        if result.succeeded {
            println!("{}", result.text);
        } else {
            println!("{}", result.text.yellow());
        }
        println!("{}", footer(&result).dimmed());
        Ok(())
    }
}

/// Runs the `hornero shell` interactive REPL.
pub async fn run_shell(mut shell: Shell, agent_name: &str) -> Result<(), HorneroError> {
    let mut rl = DefaultEditor::new()
        .map_err(|e| HorneroError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", format!("hornero shell ({agent_name})").bold().green());
    println!("Type {} for commands, {} to exit.\n", "/help".yellow(), "/quit".yellow());

    let prompt = format!("{}> ", agent_name.green());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                match shell.step(&line).await {
                    Step::Quit => break,
                    Step::Print(text) => println!("{text}"),
                    Step::Ask(request) => match shell.ask(&request).await {
                        Ok(()) => {}
                        Err(HorneroError::Cancelled) => {
                            eprintln!("{}", "cancelled".dimmed());
                        }
                        Err(e) => eprintln!("{}: {e}", "error".red()),
                    },
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    debug!(metrics = ?shell.resolver.metrics(), "shell closed");
    println!("{}", "adiós".dimmed());
    Ok(())
}
