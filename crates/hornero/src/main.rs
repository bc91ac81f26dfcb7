// SPDX-FileCopyrightText: 2026 Hornero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hornero - tiered AI provider router with automatic fallback.
//!
//! This is the binary entry point for the Hornero CLI.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod ask;
mod diagnose;
mod inspect;
mod providers;
mod shell;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use hornero_config::HorneroConfig;
use hornero_core::{parse_tier, EnvCredentials, HorneroError, Request, Tier};
use hornero_prometheus::PrometheusExporter;
use hornero_router::ComplexityClassifier;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Hornero - tiered AI provider router with automatic fallback.
#[derive(Parser, Debug)]
#[command(name = "hornero", version, about, long_about = None)]
struct Cli {
    /// Read this config file instead of the XDG hierarchy.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve one question and print the answer.
    Ask {
        text: String,
        /// Context appended to the system prompt.
        #[arg(long, default_value = "")]
        context: String,
        /// simple, medium, complex, or auto.
        #[arg(long, default_value = "auto")]
        tier: String,
        /// Print the full result as JSON.
        #[arg(long)]
        json: bool,
        /// Give up after this many seconds.
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
    },
    /// Launch an interactive REPL session.
    Shell {
        #[arg(long, default_value = "")]
        context: String,
        #[arg(long, default_value = "auto")]
        tier: String,
    },
    /// Probe every provider with a fixed question.
    Diagnose {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
    /// Show per-tier provider chains and provider health.
    Chains,
    /// Show the tier and score breakdown for a message.
    Classify { text: String },
    /// Validate the configuration and print the effective settings.
    Config,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => hornero_config::load_and_validate_path(path),
        None => hornero_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            hornero_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config.agent.log_level);

    let Some(command) = cli.command else {
        println!("hornero: use --help for available commands");
        return ExitCode::SUCCESS;
    };

    match run(command, &config).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, config: &HorneroConfig) -> Result<ExitCode, HorneroError> {
    match command {
        Commands::Ask {
            text,
            context,
            tier,
            json,
            timeout,
        } => {
            let resolver = providers::build_resolver(config, &EnvCredentials)?;
            let request = Request::new(text)
                .with_context(context)
                .with_tier(tier_arg(&tier)?);
            let answered =
                ask::run_ask(&resolver, request, json, timeout.map(Duration::from_secs)).await?;
            Ok(exit_code(answered))
        }
        Commands::Shell { context, tier } => {
            let exporter = PrometheusExporter::install()
                .inspect_err(|e| warn!(error = %e, "metrics exporter unavailable"))
                .ok();
            let resolver = providers::build_resolver(config, &EnvCredentials)?;
            let shell = shell::Shell::new(resolver, exporter, tier_arg(&tier)?, context);
            shell::run_shell(shell, &config.agent.name).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Diagnose { plain } => {
            let resolver = providers::build_resolver(config, &EnvCredentials)?;
            let answered = diagnose::run_diagnose(&resolver, plain).await;
            Ok(exit_code(answered > 0))
        }
        Commands::Chains => {
            let registry = providers::build_registry(config, &EnvCredentials)?;
            println!("{}", inspect::render_chains(&registry).await);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Classify { text } => {
            let classifier = ComplexityClassifier::new(&config.classifier);
            println!("{}", inspect::render_classification(&classifier, &text));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Config => {
            eprintln!("configuration valid");
            print!("{}", inspect::render_config(config)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn tier_arg(value: &str) -> Result<Option<Tier>, HorneroError> {
    parse_tier(value).map_err(|_| {
        HorneroError::Config(format!(
            "unknown tier `{value}` (expected simple, medium, complex, or auto)"
        ))
    })
}

fn exit_code(ok: bool) -> ExitCode {
    if ok { ExitCode::SUCCESS } else { ExitCode::from(2) }
}

/// Initialize the tracing subscriber with an env-filter.
///
/// `RUST_LOG` wins; otherwise Hornero logs at the configured level and
/// dependencies at `warn`. Logs go to stderr so answers stay pipeable.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hornero={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc supports advancing the epoch.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn ask_parses_flags() {
        let cli = Cli::parse_from([
            "hornero", "ask", "Analiza ventas", "--tier", "alta", "--json", "--timeout", "10",
        ]);
        let Some(Commands::Ask {
            text,
            tier,
            json,
            timeout,
            ..
        }) = cli.command
        else {
            panic!("expected ask");
        };
        assert_eq!(text, "Analiza ventas");
        assert_eq!(tier_arg(&tier).unwrap(), Some(Tier::Complex));
        assert!(json);
        assert_eq!(timeout, Some(10));
    }

    #[test]
    fn global_config_flag_after_subcommand() {
        let cli = Cli::parse_from(["hornero", "chains", "--config", "/tmp/h.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/h.toml")));
    }

    #[test]
    fn bad_tier_is_a_config_error() {
        assert!(matches!(tier_arg("urgent"), Err(HorneroError::Config(_))));
        assert_eq!(tier_arg("auto").unwrap(), None);
    }

    #[test]
    fn defaults_load_from_inline_config() {
        let config = hornero_config::load_and_validate_str("").expect("defaults are valid");
        assert_eq!(config.agent.name, "genesis");
    }
}
