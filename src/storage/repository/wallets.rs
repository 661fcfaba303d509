// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Meridian Tokenization

//! Provisioned wallet records.
//!
//! One document per issuer, keyed by issuer id. Re-provisioning updates the
//! document in place and keeps the original wallet id and creation time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::custody::assets::{Blockchain, TokenStandard};

use super::super::{FileStore, StorageError, StorageResult};

/// Which backend produced the wallet's identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum WalletProvider {
    /// Identifiers come from the live custody provider.
    Live,
    /// Identifiers were fabricated in mock mode.
    Mock,
}

/// Persisted custodial wallet record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WalletRecord {
    /// Unique wallet identifier (UUID).
    pub wallet_id: String,
    /// User who owns the issuer profile.
    pub user_id: String,
    /// Issuer this wallet was provisioned for.
    pub issuer_id: String,
    /// Chain the wallet lives on.
    pub chain: Blockchain,
    /// Provider asset identifier (e.g. `ETH_TEST5`).
    pub asset_id: String,
    /// Token standard selected during setup.
    pub token_standard: TokenStandard,
    /// On-chain deposit address, or the `vault:{id}:{asset}` placeholder.
    pub deposit_address: String,
    /// Vault container id at the custody provider.
    pub external_vault_id: String,
    /// Live or mock provenance.
    pub provider: WalletProvider,
    /// Whether the wallet is usable.
    pub is_active: bool,
    /// Custodial wallets have no local key material.
    pub is_custodial: bool,
    /// First provisioning time.
    pub created_at: DateTime<Utc>,
    /// Last provisioning or fixup time.
    pub updated_at: DateTime<Utc>,
}

/// Repository for wallet records.
pub struct WalletRepository<'a> {
    store: &'a FileStore,
}

impl<'a> WalletRepository<'a> {
    pub fn new(store: &'a FileStore) -> Self {
        Self { store }
    }

    /// Check if an issuer already has a wallet.
    pub fn exists(&self, issuer_id: &str) -> bool {
        self.store
            .exists(self.store.paths().wallet_record(issuer_id))
    }

    /// Get the wallet for an issuer.
    pub fn get_by_issuer(&self, issuer_id: &str) -> StorageResult<WalletRecord> {
        let path = self.store.paths().wallet_record(issuer_id);
        if !self.store.exists(&path) {
            return Err(StorageError::NotFound(format!(
                "Wallet for issuer {issuer_id}"
            )));
        }
        self.store.read_json(path)
    }

    /// Insert or update the issuer's wallet.
    ///
    /// If a record already exists, its wallet id and creation time are kept
    /// and the rest is replaced. Exactly one document per issuer can result.
    pub fn upsert_for_issuer(&self, mut incoming: WalletRecord) -> StorageResult<WalletRecord> {
        if let Ok(existing) = self.get_by_issuer(&incoming.issuer_id) {
            incoming.wallet_id = existing.wallet_id;
            incoming.created_at = existing.created_at;
        }
        self.store.write_json(
            self.store.paths().wallet_record(&incoming.issuer_id),
            &incoming,
        )?;
        Ok(incoming)
    }

    /// List issuer ids that have a wallet.
    pub fn list_issuer_ids(&self) -> StorageResult<Vec<String>> {
        self.store
            .list_files(self.store.paths().wallets_dir(), "json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoragePaths;

    fn test_store() -> (tempfile::TempDir, FileStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::open(StoragePaths::new(dir.path())).expect("store opens");
        (dir, store)
    }

    fn test_record(issuer_id: &str) -> WalletRecord {
        let now = Utc::now();
        WalletRecord {
            wallet_id: uuid::Uuid::new_v4().to_string(),
            user_id: "user-1".to_string(),
            issuer_id: issuer_id.to_string(),
            chain: Blockchain::Ethereum,
            asset_id: "ETH_TEST5".to_string(),
            token_standard: TokenStandard::Erc20,
            deposit_address: "0x00112233445566778899aabbccddeeff00112233".to_string(),
            external_vault_id: "vault-7".to_string(),
            provider: WalletProvider::Live,
            is_active: true,
            is_custodial: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn upsert_then_get_round_trips() {
        let (_dir, store) = test_store();
        let repo = WalletRepository::new(&store);

        let record = test_record("issuer-1");
        repo.upsert_for_issuer(record.clone()).unwrap();

        let loaded = repo.get_by_issuer("issuer-1").unwrap();
        assert_eq!(loaded.chain, record.chain);
        assert_eq!(loaded.asset_id, record.asset_id);
        assert_eq!(loaded.deposit_address, record.deposit_address);
    }

    #[test]
    fn upsert_twice_keeps_single_record_and_identity() {
        let (_dir, store) = test_store();
        let repo = WalletRepository::new(&store);

        let first = repo.upsert_for_issuer(test_record("issuer-1")).unwrap();

        let mut second = test_record("issuer-1");
        second.deposit_address = "0xffffffffffffffffffffffffffffffffffffffff".to_string();
        let updated = repo.upsert_for_issuer(second).unwrap();

        // Identity survives re-provisioning.
        assert_eq!(updated.wallet_id, first.wallet_id);
        assert_eq!(updated.created_at, first.created_at);

        let ids = repo.list_issuer_ids().unwrap();
        assert_eq!(ids, vec!["issuer-1"]);

        let loaded = repo.get_by_issuer("issuer-1").unwrap();
        assert_eq!(
            loaded.deposit_address,
            "0xffffffffffffffffffffffffffffffffffffffff"
        );
    }

    #[test]
    fn get_missing_wallet_is_not_found() {
        let (_dir, store) = test_store();
        let repo = WalletRepository::new(&store);
        let result = repo.get_by_issuer("issuer-unknown");
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn exists_reflects_upserts() {
        let (_dir, store) = test_store();
        let repo = WalletRepository::new(&store);

        assert!(!repo.exists("issuer-1"));
        repo.upsert_for_issuer(test_record("issuer-1")).unwrap();
        assert!(repo.exists("issuer-1"));
    }
}
