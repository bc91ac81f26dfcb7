// SPDX-FileCopyrightText: 2026 Hornero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `hornero ask` command implementation.

use std::io::IsTerminal;
use std::time::Duration;

use colored::Colorize;
use hornero_core::{HorneroError, ProviderResult, Request};
use hornero_router::FallbackResolver;

/// Resolve one request and print it. Returns whether a provider answered.
///
/// Running out of `timeout` counts as no answer, not as an error.
pub async fn run_ask(
    resolver: &FallbackResolver,
    request: Request,
    json: bool,
    timeout: Option<Duration>,
) -> Result<bool, HorneroError> {
    let result = match timeout {
        Some(deadline) => match resolver.resolve_with_deadline(&request, deadline).await {
            Ok(result) => result,
            Err(e @ HorneroError::Timeout { .. }) => {
                eprintln!("error: {e}");
                return Ok(false);
            }
            Err(e) => return Err(e),
        },
        None => resolver.resolve(&request).await,
    };

    if json {
        let rendered = serde_json::to_string_pretty(&result)
            .map_err(|e| HorneroError::Internal(format!("failed to serialize result: {e}")))?;
        println!("{rendered}");
    } else {
        println!("{}", result.text);
        let footer = footer(&result);
        if std::io::stderr().is_terminal() {
            eprintln!("{}", footer.dimmed());
        } else {
            eprintln!("{footer}");
        }
    }

    Ok(result.succeeded)
}

/// `provider · tier · model`, with a cache marker.
pub fn footer(result: &ProviderResult) -> String {
    let mut parts = vec![result.provider_name.clone()];
    if let Some(tier) = result.tier {
        parts.push(tier.to_string());
    }
    if let Some(model) = &result.model {
        parts.push(model.clone());
    }
    if result.cached {
        parts.push("cached".to_string());
    }
    format!("[{}]", parts.join(" · "))
}
