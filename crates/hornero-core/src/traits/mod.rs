// SPDX-FileCopyrightText: 2026 Hornero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! Provider adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod credentials;
pub mod provider;

pub use adapter::PluginAdapter;
pub use credentials::CredentialProvider;
pub use provider::ProviderAdapter;
