// SPDX-FileCopyrightText: 2026 Hornero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential lookup interface.

use secrecy::SecretString;

/// Opaque key-value secret lookup.
///
/// The router never knows where secrets live; adapters ask for a key name
/// and receive a value or nothing.
pub trait CredentialProvider: Send + Sync {
    fn lookup(&self, key: &str) -> Option<SecretString>;
}
