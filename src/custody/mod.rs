// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Meridian Tokenization

//! Custody provider integration: signed API client, mock responder, and the
//! issuer vault provisioning workflow.

pub mod assets;
pub mod client;
pub mod error;
pub mod mock;
pub mod provisioning;
pub mod signer;
pub mod status;

pub use assets::{AssetType, Blockchain, TokenStandard};
pub use client::{AuthScheme, CustodyClient, VaultApi};
pub use error::{CustodyError, ProvisioningError, ProvisioningStep};
pub use provisioning::{Balance, SetupOutcome, SetupRequest, VaultProvisioner, WalletSummary};
pub use signer::{HttpMethod, RequestSigner};
pub use status::{SetupStatus, SetupStatusTracker};
