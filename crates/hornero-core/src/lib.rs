// SPDX-FileCopyrightText: 2026 Hornero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Hornero provider router.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types used throughout the workspace. Every provider adapter
//! implements [`ProviderAdapter`]; every secret source implements
//! [`CredentialProvider`].

pub mod credentials;
pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use credentials::{
    resolve_api_key, resolve_credential, ChainedCredentials, EnvCredentials, StaticCredentials,
};
pub use error::HorneroError;
pub use types::{
    parse_tier, system_prompt, Capability, ErrorKind, HealthStatus, ProviderResult, Request,
    Tier,
};

pub use traits::{CredentialProvider, PluginAdapter, ProviderAdapter};
