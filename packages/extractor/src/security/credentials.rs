//! Credential handling with secure memory.
//!
//! Uses the `secrecy` crate to prevent accidental logging of sensitive values.
//! Keys are handed to the gateway explicitly; nothing here mutates the
//! process environment.

use secrecy::{ExposeSecret, SecretBox};
use std::collections::HashMap;
use std::fmt;

use crate::types::model::ModelSpec;

/// A secret string that won't be logged or displayed.
pub struct SecretString(SecretBox<str>);

impl SecretString {
    /// Create a new secret string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretBox::new(Box::from(value.into().as_str())))
    }

    /// Expose the secret value for use.
    ///
    /// Only call this when actually using the secret (e.g., in an API request).
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Whether the secret is empty or whitespace.
    pub fn is_blank(&self) -> bool {
        self.expose().trim().is_empty()
    }
}

impl Clone for SecretString {
    fn clone(&self) -> Self {
        Self::new(self.expose().to_string())
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Where API keys come from.
pub trait CredentialSource: Send + Sync {
    /// Key for the given model, or `None` when unset or blank.
    fn credential_for(&self, spec: &ModelSpec) -> Option<SecretString>;
}

/// Reads the model's credential variable from the process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvCredentials;

impl CredentialSource for EnvCredentials {
    fn credential_for(&self, spec: &ModelSpec) -> Option<SecretString> {
        std::env::var(&spec.credential_var)
            .ok()
            .map(SecretString::new)
            .filter(|s| !s.is_blank())
    }
}

/// Fixed keys by credential variable name.
#[derive(Clone, Default)]
pub struct StaticCredentials {
    keys: HashMap<String, SecretString>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a key under a credential variable name (e.g. `OPENAI_API_KEY`).
    pub fn with_key(mut self, variable: impl Into<String>, key: impl Into<SecretString>) -> Self {
        self.keys.insert(variable.into(), key.into());
        self
    }
}

impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("variables", &self.keys.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl CredentialSource for StaticCredentials {
    fn credential_for(&self, spec: &ModelSpec) -> Option<SecretString> {
        self.keys
            .get(&spec.credential_var)
            .filter(|s| !s.is_blank())
            .cloned()
    }
}
