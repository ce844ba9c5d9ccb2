//! API key handling.

pub mod credentials;

pub use credentials::{CredentialSource, EnvCredentials, SecretString, StaticCredentials};
