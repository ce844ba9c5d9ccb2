//! Extraction pipeline.
//!
//! Fetching through the cache, the two orchestrators, the run controller that
//! sequences them, and exporting their results.

pub mod export;
pub mod extract;
pub mod fetch;
pub mod normalize;
pub mod paginate;
pub mod prompts;
pub mod run;

pub use extract::Extractor;
pub use fetch::{fetch_and_store, unique_key};
pub use normalize::normalize;
pub use paginate::Paginator;
pub use run::{RunController, RunMode, RunReport, RunRequest, RunState};

use crate::error::{ExtractionError, Result};
use crate::gateway::ModelGateway;
use crate::security::{CredentialSource, SecretString};

/// Look up the key for `model_id`.
fn resolve_credential(
    gateway: &ModelGateway,
    credentials: &dyn CredentialSource,
    model_id: &str,
) -> Result<SecretString> {
    let spec = gateway.model(model_id)?;
    credentials
        .credential_for(spec)
        .ok_or_else(|| ExtractionError::CredentialMissing {
            model: spec.id.clone(),
            variable: spec.credential_var.clone(),
        })
}

/// Credential for one batch, looked up on first use.
///
/// Batches made only of blank documents never touch the credential source.
pub(crate) struct BatchCredential<'a> {
    gateway: &'a ModelGateway,
    credentials: &'a dyn CredentialSource,
    model_id: &'a str,
    resolved: Option<SecretString>,
}

impl<'a> BatchCredential<'a> {
    pub(crate) fn new(
        gateway: &'a ModelGateway,
        credentials: &'a dyn CredentialSource,
        model_id: &'a str,
    ) -> Self {
        Self {
            gateway,
            credentials,
            model_id,
            resolved: None,
        }
    }

    pub(crate) fn get(&mut self) -> Result<&SecretString> {
        match self.resolved {
            Some(ref credential) => Ok(credential),
            None => {
                let credential =
                    resolve_credential(self.gateway, self.credentials, self.model_id)?;
                Ok(self.resolved.insert(credential))
            }
        }
    }
}
