// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Meridian Tokenization

//! Setup idempotency guard.
//!
//! Derives an issuer's setup status from the setup record flag plus the
//! wallet document; no storage of its own. The provisioner consults this
//! before touching the provider and writes the completed flag afterwards.

use chrono::{DateTime, Utc};

use crate::storage::{
    FileStore, SetupRecord, SetupRepository, StorageResult, WalletRecord, WalletRepository,
};

use super::assets::Selection;

/// Result of a setup-status query.
#[derive(Debug, Clone)]
pub struct SetupStatus {
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub wallet: Option<WalletRecord>,
}

impl SetupStatus {
    fn not_completed() -> Self {
        Self {
            completed: false,
            completed_at: None,
            wallet: None,
        }
    }
}

/// What gets recorded when a provisioning run completes.
#[derive(Debug, Clone)]
pub struct SetupCompletion {
    pub issuer_id: String,
    pub user_id: String,
    pub company_name: String,
    pub selection: Selection,
    pub completed_at: DateTime<Utc>,
}

/// Read/derive wrapper over the setup and wallet repositories.
pub struct SetupStatusTracker<'a> {
    store: &'a FileStore,
}

impl<'a> SetupStatusTracker<'a> {
    pub fn new(store: &'a FileStore) -> Self {
        Self { store }
    }

    /// Whether setup has completed for the issuer, with the wallet if so.
    pub fn status(&self, issuer_id: &str) -> StorageResult<SetupStatus> {
        let setup_repo = SetupRepository::new(self.store);
        if !setup_repo.exists(issuer_id) {
            return Ok(SetupStatus::not_completed());
        }

        let record = setup_repo.get(issuer_id)?;
        if !record.setup_completed {
            return Ok(SetupStatus::not_completed());
        }

        // A completed flag without a wallet document means a prior run was
        // interrupted mid-fixup; report the flag and let the caller decide.
        let wallet = WalletRepository::new(self.store)
            .get_by_issuer(issuer_id)
            .ok();

        Ok(SetupStatus {
            completed: true,
            completed_at: record.setup_completed_at,
            wallet,
        })
    }

    /// Record a completed provisioning run, preserving the original creation
    /// time when the issuer re-provisions.
    pub fn mark_completed(&self, completion: &SetupCompletion) -> StorageResult<()> {
        let setup_repo = SetupRepository::new(self.store);
        let now = completion.completed_at;

        let created_at = setup_repo
            .get(&completion.issuer_id)
            .map(|existing| existing.created_at)
            .unwrap_or(now);

        setup_repo.save(&SetupRecord {
            issuer_id: completion.issuer_id.clone(),
            user_id: completion.user_id.clone(),
            company_name: completion.company_name.clone(),
            selected_asset_type: completion.selection.asset_type,
            selected_blockchain: completion.selection.blockchain,
            selected_token_standard: completion.selection.token_standard,
            setup_completed: true,
            setup_completed_at: Some(now),
            created_at,
            updated_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::custody::assets::validate_selection;
    use crate::storage::{StoragePaths, WalletProvider};

    fn test_store() -> (tempfile::TempDir, FileStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::open(StoragePaths::new(dir.path())).expect("store opens");
        (dir, store)
    }

    fn completion(issuer_id: &str) -> SetupCompletion {
        SetupCompletion {
            issuer_id: issuer_id.to_string(),
            user_id: "user-1".to_string(),
            company_name: "Acme Co".to_string(),
            selection: validate_selection("EQUITY", "ethereum", "ERC-20").unwrap(),
            completed_at: Utc::now(),
        }
    }

    fn wallet_record(issuer_id: &str) -> WalletRecord {
        let now = Utc::now();
        WalletRecord {
            wallet_id: uuid::Uuid::new_v4().to_string(),
            user_id: "user-1".to_string(),
            issuer_id: issuer_id.to_string(),
            chain: crate::custody::assets::Blockchain::Ethereum,
            asset_id: "ETH_TEST5".to_string(),
            token_standard: crate::custody::assets::TokenStandard::Erc20,
            deposit_address: "0x00112233445566778899aabbccddeeff00112233".to_string(),
            external_vault_id: "vault-1".to_string(),
            provider: WalletProvider::Live,
            is_active: true,
            is_custodial: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn unknown_issuer_is_not_completed() {
        let (_dir, store) = test_store();
        let tracker = SetupStatusTracker::new(&store);

        let status = tracker.status("issuer-1").unwrap();
        assert!(!status.completed);
        assert!(status.wallet.is_none());
    }

    #[test]
    fn mark_completed_flips_status_and_exposes_wallet() {
        let (_dir, store) = test_store();
        let tracker = SetupStatusTracker::new(&store);

        WalletRepository::new(&store)
            .upsert_for_issuer(wallet_record("issuer-1"))
            .unwrap();
        tracker.mark_completed(&completion("issuer-1")).unwrap();

        let status = tracker.status("issuer-1").unwrap();
        assert!(status.completed);
        assert!(status.completed_at.is_some());
        assert_eq!(status.wallet.unwrap().issuer_id, "issuer-1");
    }

    #[test]
    fn completed_flag_without_wallet_reports_no_wallet() {
        let (_dir, store) = test_store();
        let tracker = SetupStatusTracker::new(&store);

        tracker.mark_completed(&completion("issuer-1")).unwrap();

        let status = tracker.status("issuer-1").unwrap();
        assert!(status.completed);
        assert!(status.wallet.is_none());
    }

    #[test]
    fn re_completion_preserves_created_at() {
        let (_dir, store) = test_store();
        let tracker = SetupStatusTracker::new(&store);

        tracker.mark_completed(&completion("issuer-1")).unwrap();
        let first = SetupRepository::new(&store).get("issuer-1").unwrap();

        tracker.mark_completed(&completion("issuer-1")).unwrap();
        let second = SetupRepository::new(&store).get("issuer-1").unwrap();

        assert_eq!(first.created_at, second.created_at);
    }
}
