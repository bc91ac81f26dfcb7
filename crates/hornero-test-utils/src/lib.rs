// SPDX-FileCopyrightText: 2026 Hornero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Hornero integration tests.
//!
//! Provides mock adapters for fast, deterministic, CI-runnable tests
//! without external services.
//!
//! # Components
//!
//! - [`MockProvider`] - Mock provider with scripted outcomes and call counting

pub mod mock_provider;

pub use mock_provider::{MockOutcome, MockProvider};
