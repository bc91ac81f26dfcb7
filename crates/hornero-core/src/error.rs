// SPDX-FileCopyrightText: 2026 Hornero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Hornero provider router.
//!
//! Provider failures are *not* errors: they travel as
//! [`ProviderResult`](crate::types::ProviderResult) values. This type covers
//! construction failures, cancellation, and caller deadlines.

use thiserror::Error;

/// The primary error type used across Hornero crates.
#[derive(Debug, Error)]
pub enum HorneroError {
    /// Configuration errors (invalid TOML, unknown provider kinds, bad chains).
    #[error("configuration error: {0}")]
    Config(String),

    /// Provider construction errors (HTTP client build failure, bad header values).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A provider chain names an adapter that was never registered.
    #[error("adapter not found: {name}")]
    AdapterNotFound { name: String },

    /// The caller's deadline elapsed before resolution finished.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// The caller cancelled the resolution while a provider call was in flight.
    #[error("resolution cancelled")]
    Cancelled,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
