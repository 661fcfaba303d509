// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Meridian Tokenization

//! Issuer setup-state records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::custody::assets::{AssetType, Blockchain, TokenStandard};

use super::super::{FileStore, StorageError, StorageResult};

/// Persisted issuer setup state: the selections made during onboarding and
/// the completed flag the status tracker reads.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SetupRecord {
    /// Issuer this state belongs to.
    pub issuer_id: String,
    /// User who owns the issuer profile.
    pub user_id: String,
    /// Issuer company name used for the vault label.
    pub company_name: String,
    /// Selected asset class.
    pub selected_asset_type: AssetType,
    /// Selected chain.
    pub selected_blockchain: Blockchain,
    /// Selected token standard.
    pub selected_token_standard: TokenStandard,
    /// Whether provisioning has completed for this issuer.
    pub setup_completed: bool,
    /// When provisioning completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setup_completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Repository for issuer setup state.
pub struct SetupRepository<'a> {
    store: &'a FileStore,
}

impl<'a> SetupRepository<'a> {
    pub fn new(store: &'a FileStore) -> Self {
        Self { store }
    }

    pub fn exists(&self, issuer_id: &str) -> bool {
        self.store.exists(self.store.paths().setup_record(issuer_id))
    }

    pub fn get(&self, issuer_id: &str) -> StorageResult<SetupRecord> {
        let path = self.store.paths().setup_record(issuer_id);
        if !self.store.exists(&path) {
            return Err(StorageError::NotFound(format!(
                "Setup state for issuer {issuer_id}"
            )));
        }
        self.store.read_json(path)
    }

    /// Create or replace the issuer's setup state.
    pub fn save(&self, record: &SetupRecord) -> StorageResult<()> {
        self.store
            .write_json(self.store.paths().setup_record(&record.issuer_id), record)
    }
}
