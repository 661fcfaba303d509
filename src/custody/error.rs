// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Meridian Tokenization

//! Error taxonomy for the custody client and the provisioning workflow.

use crate::storage::StorageError;

/// Errors raised at the custody API client boundary.
#[derive(Debug, thiserror::Error)]
pub enum CustodyError {
    /// Credentials missing or malformed at startup. The client handles this
    /// by entering permanent mock mode; surfaced only when a live-only
    /// operation is attempted without credentials.
    #[error("custody configuration invalid: {0}")]
    Configuration(String),

    /// Request token could not be produced.
    #[error("custody request signing failed: {0}")]
    Signing(String),

    /// Provider rejected the signed token (401/403).
    #[error("custody provider rejected credentials for {endpoint}: {detail}")]
    Authentication { endpoint: String, detail: String },

    /// Provider answered with a non-2xx status.
    #[error("custody API {endpoint} returned {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// Network-level failure (DNS, connect, timeout).
    #[error("custody transport failure for {endpoint}: {detail}")]
    Transport { endpoint: String, detail: String },

    /// Provider answered 2xx but the body was not usable.
    #[error("custody response was invalid: {0}")]
    InvalidResponse(String),
}

/// The provisioning step at which a workflow run failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisioningStep {
    CreateVault,
    AttachAsset,
    Activate,
    ResolveAddress,
    Persist,
}

impl ProvisioningStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProvisioningStep::CreateVault => "create-vault",
            ProvisioningStep::AttachAsset => "attach-asset",
            ProvisioningStep::Activate => "activate",
            ProvisioningStep::ResolveAddress => "resolve-address",
            ProvisioningStep::Persist => "persist",
        }
    }
}

impl std::fmt::Display for ProvisioningStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discriminated failure result of a provisioning run.
#[derive(Debug, thiserror::Error)]
pub enum ProvisioningError {
    /// Rejected before any provider call was made.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A workflow step failed irrecoverably.
    #[error("provisioning step {step} failed: {source}")]
    Step {
        step: ProvisioningStep,
        #[source]
        source: CustodyError,
    },

    /// Record store failure while persisting or reading state.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ProvisioningError {
    /// The step this failure is attributed to, if any.
    pub fn failed_step(&self) -> Option<ProvisioningStep> {
        match self {
            ProvisioningError::Step { step, .. } => Some(*step),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_names_are_stable() {
        assert_eq!(ProvisioningStep::CreateVault.as_str(), "create-vault");
        assert_eq!(ProvisioningStep::AttachAsset.as_str(), "attach-asset");
        assert_eq!(ProvisioningStep::ResolveAddress.as_str(), "resolve-address");
    }

    #[test]
    fn step_failure_names_the_step() {
        let err = ProvisioningError::Step {
            step: ProvisioningStep::CreateVault,
            source: CustodyError::Transport {
                endpoint: "/v1/vault/accounts".to_string(),
                detail: "timed out".to_string(),
            },
        };
        assert!(err.to_string().contains("create-vault"));
        assert_eq!(err.failed_step(), Some(ProvisioningStep::CreateVault));
    }

    #[test]
    fn validation_has_no_step() {
        let err = ProvisioningError::Validation("bad input".to_string());
        assert_eq!(err.failed_step(), None);
    }
}
