// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Meridian Tokenization

//! Issuer vault provisioning workflow.
//!
//! Drives the ordered sequence of custody calls that stands up one issuer's
//! wallet: create vault, attach asset, activate, resolve deposit address,
//! persist. Activation failure is non-fatal (the provider may auto-activate
//! on asset attachment); address resolution always yields *some* address,
//! falling back to a `vault:{id}:{asset}` placeholder. Vault creation and
//! asset attachment abort the run.
//!
//! Runs for the same issuer are serialized by a per-issuer async lock, and
//! the wallet document is keyed by issuer id, so a provisioning run can never
//! produce a duplicate wallet.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::storage::{FileStore, WalletProvider, WalletRecord, WalletRepository};

use super::{
    assets::{validate_selection, Blockchain, Selection, TokenStandard},
    client::VaultApi,
    error::{CustodyError, ProvisioningError, ProvisioningStep},
    signer::HttpMethod,
    status::{SetupCompletion, SetupStatus, SetupStatusTracker},
};

const VAULT_ACCOUNTS_ENDPOINT: &str = "/v1/vault/accounts";

fn asset_endpoint(vault_id: &str, asset_id: &str) -> String {
    format!("{VAULT_ACCOUNTS_ENDPOINT}/{vault_id}/{asset_id}")
}

fn activate_endpoint(vault_id: &str, asset_id: &str) -> String {
    format!("{VAULT_ACCOUNTS_ENDPOINT}/{vault_id}/{asset_id}/activate")
}

fn addresses_endpoint(vault_id: &str, asset_id: &str) -> String {
    format!("{VAULT_ACCOUNTS_ENDPOINT}/{vault_id}/{asset_id}/addresses")
}

fn balance_refresh_endpoint(vault_id: &str, asset_id: &str) -> String {
    format!("{VAULT_ACCOUNTS_ENDPOINT}/{vault_id}/{asset_id}/balance")
}

fn rename_endpoint(vault_id: &str) -> String {
    format!("{VAULT_ACCOUNTS_ENDPOINT}/{vault_id}")
}

/// Input to a provisioning run. Selection fields arrive as raw strings from
/// the controller layer and are validated before any provider call.
#[derive(Debug, Clone)]
pub struct SetupRequest {
    pub issuer_id: String,
    pub user_id: String,
    pub company_name: String,
    pub asset_type: String,
    pub blockchain: String,
    pub token_standard: String,
}

/// Wallet view returned to callers; never includes the owning user id.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WalletSummary {
    /// Unique wallet identifier.
    pub wallet_id: String,
    /// Issuer the wallet belongs to.
    pub issuer_id: String,
    /// Chain the wallet lives on.
    pub chain: Blockchain,
    /// Provider asset identifier.
    pub asset_id: String,
    /// Token standard selected during setup.
    pub token_standard: TokenStandard,
    /// On-chain deposit address or placeholder.
    pub deposit_address: String,
    /// Vault container id at the custody provider.
    pub external_vault_id: String,
    /// Live or mock provenance.
    pub provider: WalletProvider,
    /// Whether the wallet is usable.
    pub is_active: bool,
}

impl From<WalletRecord> for WalletSummary {
    fn from(record: WalletRecord) -> Self {
        Self {
            wallet_id: record.wallet_id,
            issuer_id: record.issuer_id,
            chain: record.chain,
            asset_id: record.asset_id,
            token_standard: record.token_standard,
            deposit_address: record.deposit_address,
            external_vault_id: record.external_vault_id,
            provider: record.provider,
            is_active: record.is_active,
        }
    }
}

/// Result of a provisioning run.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SetupOutcome {
    pub wallet: WalletSummary,
    /// True when the run short-circuited on an already-provisioned issuer.
    pub already_provisioned: bool,
}

fn default_amount() -> String {
    "0".to_string()
}

/// Asset balance as reported by the provider.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Balance {
    /// Provider asset identifier.
    #[serde(default)]
    pub id: Option<String>,
    /// Spendable amount.
    #[serde(default = "default_amount")]
    pub available: String,
    /// Total amount including pending.
    #[serde(default = "default_amount")]
    pub total: String,
    /// Incoming amount not yet settled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending: Option<String>,
    /// Set when the figures were fabricated in mock mode.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub mock: bool,
}

/// Orchestrates issuer wallet provisioning against the custody API.
pub struct VaultProvisioner {
    api: Arc<dyn VaultApi>,
    store: Arc<FileStore>,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl VaultProvisioner {
    pub fn new(api: Arc<dyn VaultApi>, store: Arc<FileStore>) -> Self {
        Self {
            api,
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Provision a custodial wallet for an issuer.
    ///
    /// Idempotent: an issuer whose setup already completed gets the recorded
    /// wallet back without any provider calls; an issuer with a wallet but an
    /// interrupted run gets the wallet document updated in place.
    pub async fn setup_issuer_wallet(
        &self,
        request: SetupRequest,
    ) -> Result<SetupOutcome, ProvisioningError> {
        let selection = validate_request(&request)?;

        let lock = self.issuer_lock(&request.issuer_id).await;
        let _guard = lock.lock().await;

        let tracker = SetupStatusTracker::new(&self.store);
        let status = tracker.status(&request.issuer_id)?;
        if status.completed {
            if let Some(wallet) = status.wallet {
                info!(issuer_id = %request.issuer_id, "setup already completed, returning wallet");
                return Ok(SetupOutcome {
                    wallet: wallet.into(),
                    already_provisioned: true,
                });
            }
            // Completed flag but no wallet document: fall through and
            // re-provision to repair the record.
            warn!(issuer_id = %request.issuer_id, "setup marked completed but wallet record missing, re-provisioning");
        }

        let (vault_id, provider) = self.create_vault(&request).await?;
        let asset_id = selection.asset_id();

        self.attach_asset(&vault_id, asset_id).await?;
        self.activate_wallet(&vault_id, asset_id).await;
        let deposit_address = self.resolve_deposit_address(&vault_id, asset_id).await;

        let now = Utc::now();
        let record = WalletRepository::new(&self.store).upsert_for_issuer(WalletRecord {
            wallet_id: Uuid::new_v4().to_string(),
            user_id: request.user_id.clone(),
            issuer_id: request.issuer_id.clone(),
            chain: selection.blockchain,
            asset_id: asset_id.to_string(),
            token_standard: selection.token_standard,
            deposit_address,
            external_vault_id: vault_id.clone(),
            provider,
            is_active: true,
            is_custodial: true,
            created_at: now,
            updated_at: now,
        })?;

        tracker.mark_completed(&SetupCompletion {
            issuer_id: request.issuer_id.clone(),
            user_id: request.user_id.clone(),
            company_name: request.company_name.trim().to_string(),
            selection,
            completed_at: now,
        })?;

        info!(
            issuer_id = %request.issuer_id,
            vault_id = %vault_id,
            asset_id = %asset_id,
            deposit_address = %record.deposit_address,
            "issuer wallet provisioned"
        );

        Ok(SetupOutcome {
            wallet: record.into(),
            already_provisioned: false,
        })
    }

    /// Setup status for an issuer.
    pub fn check_setup_status(&self, issuer_id: &str) -> Result<SetupStatus, ProvisioningError> {
        Ok(SetupStatusTracker::new(&self.store).status(issuer_id)?)
    }

    /// Current balance of a vault asset.
    pub async fn vault_asset_balance(
        &self,
        vault_id: &str,
        asset_id: &str,
    ) -> Result<Balance, CustodyError> {
        let response = self
            .api
            .call(HttpMethod::Get, &asset_endpoint(vault_id, asset_id), None)
            .await?;
        parse_balance(response)
    }

    /// Ask the provider to refresh, then return, a vault asset balance.
    pub async fn refresh_vault_asset_balance(
        &self,
        vault_id: &str,
        asset_id: &str,
    ) -> Result<Balance, CustodyError> {
        let response = self
            .api
            .call(
                HttpMethod::Post,
                &balance_refresh_endpoint(vault_id, asset_id),
                None,
            )
            .await?;
        parse_balance(response)
    }

    /// Rename a vault at the provider. Operational helper; the local wallet
    /// record is unaffected.
    pub async fn rename_vault(&self, vault_id: &str, new_name: &str) -> Result<(), CustodyError> {
        self.api
            .call(
                HttpMethod::Put,
                &rename_endpoint(vault_id),
                Some(json!({ "name": new_name })),
            )
            .await?;
        Ok(())
    }

    async fn issuer_lock(&self, issuer_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(issuer_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn create_vault(
        &self,
        request: &SetupRequest,
    ) -> Result<(String, WalletProvider), ProvisioningError> {
        let body = json!({
            "name": format!("{} Vault", request.company_name.trim()),
            "hiddenOnUI": false,
            "customerRefId": request.issuer_id,
            "autoFuel": true,
        });

        let response = self
            .api
            .call(HttpMethod::Post, VAULT_ACCOUNTS_ENDPOINT, Some(body))
            .await
            .map_err(|source| ProvisioningError::Step {
                step: ProvisioningStep::CreateVault,
                source,
            })?;

        let vault_id = extract_id(&response).ok_or_else(|| ProvisioningError::Step {
            step: ProvisioningStep::CreateVault,
            source: CustodyError::InvalidResponse(
                "vault creation response missing id".to_string(),
            ),
        })?;

        let provider = if is_mock_tagged(&response) {
            WalletProvider::Mock
        } else {
            WalletProvider::Live
        };

        info!(issuer_id = %request.issuer_id, vault_id = %vault_id, "vault created");
        Ok((vault_id, provider))
    }

    async fn attach_asset(&self, vault_id: &str, asset_id: &str) -> Result<(), ProvisioningError> {
        self.api
            .call(HttpMethod::Post, &asset_endpoint(vault_id, asset_id), None)
            .await
            .map_err(|source| ProvisioningError::Step {
                step: ProvisioningStep::AttachAsset,
                source,
            })?;
        info!(vault_id = %vault_id, asset_id = %asset_id, "asset attached to vault");
        Ok(())
    }

    /// Activation is non-fatal: some provider workspaces auto-activate on
    /// asset attachment and answer errors here.
    async fn activate_wallet(&self, vault_id: &str, asset_id: &str) {
        match self
            .api
            .call(HttpMethod::Post, &activate_endpoint(vault_id, asset_id), None)
            .await
        {
            Ok(_) => info!(vault_id = %vault_id, asset_id = %asset_id, "asset wallet activated"),
            Err(e) => warn!(
                vault_id = %vault_id,
                asset_id = %asset_id,
                error = %e,
                "activation failed, continuing to address resolution"
            ),
        }
    }

    /// Resolve the deposit address: existing list first, then create one,
    /// then a synthetic placeholder. Never fails.
    async fn resolve_deposit_address(&self, vault_id: &str, asset_id: &str) -> String {
        let endpoint = addresses_endpoint(vault_id, asset_id);

        match self.api.call(HttpMethod::Get, &endpoint, None).await {
            Ok(Value::Array(entries)) => {
                if let Some(address) = entries
                    .first()
                    .and_then(|entry| entry.get("address"))
                    .and_then(Value::as_str)
                {
                    return address.to_string();
                }
            }
            Ok(_) => warn!(vault_id = %vault_id, "address list response was not an array"),
            Err(e) => warn!(vault_id = %vault_id, error = %e, "listing deposit addresses failed"),
        }

        let body = json!({ "description": format!("Deposit address for {asset_id} wallet") });
        match self.api.call(HttpMethod::Post, &endpoint, Some(body)).await {
            Ok(response) => {
                if let Some(address) = response.get("address").and_then(Value::as_str) {
                    return address.to_string();
                }
                warn!(vault_id = %vault_id, "address creation response missing address");
            }
            Err(e) => warn!(vault_id = %vault_id, error = %e, "creating deposit address failed"),
        }

        warn!(vault_id = %vault_id, asset_id = %asset_id, "using placeholder deposit address");
        format!("vault:{vault_id}:{asset_id}")
    }
}

fn validate_request(request: &SetupRequest) -> Result<Selection, ProvisioningError> {
    validate_identifier("issuer_id", &request.issuer_id)?;
    validate_identifier("user_id", &request.user_id)?;
    if request.company_name.trim().is_empty() {
        return Err(ProvisioningError::Validation(
            "company_name must not be empty".to_string(),
        ));
    }
    validate_selection(
        &request.asset_type,
        &request.blockchain,
        &request.token_standard,
    )
    .map_err(ProvisioningError::Validation)
}

/// Identifiers become record file names and provider reference ids, so they
/// are restricted to a safe charset.
fn validate_identifier(field: &str, value: &str) -> Result<(), ProvisioningError> {
    if value.is_empty() {
        return Err(ProvisioningError::Validation(format!(
            "{field} must not be empty"
        )));
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(ProvisioningError::Validation(format!(
            "{field} contains unsupported characters"
        )));
    }
    Ok(())
}

fn is_mock_tagged(value: &Value) -> bool {
    value.get("mock").and_then(Value::as_bool).unwrap_or(false)
}

/// Provider vault ids are strings in current workspaces but were numeric in
/// older ones; accept both.
fn extract_id(value: &Value) -> Option<String> {
    match value.get("id") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_balance(response: Value) -> Result<Balance, CustodyError> {
    serde_json::from_value(response)
        .map_err(|e| CustodyError::InvalidResponse(format!("balance response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CustodyConfig;
    use crate::custody::client::CustodyClient;
    use crate::custody::mock::MockResponder;
    use crate::storage::StoragePaths;
    use async_trait::async_trait;

    /// Test double: answers from the mock responder unless an endpoint rule
    /// says to fail, and records every call it sees.
    struct ScriptedApi {
        mock: MockResponder,
        fail_rules: Vec<(HttpMethod, &'static str)>,
        calls: std::sync::Mutex<Vec<(HttpMethod, String)>>,
    }

    impl ScriptedApi {
        fn new(fail_rules: Vec<(HttpMethod, &'static str)>) -> Self {
            Self {
                mock: MockResponder::new(),
                fail_rules,
                calls: std::sync::Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(HttpMethod, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl VaultApi for ScriptedApi {
        async fn call(
            &self,
            method: HttpMethod,
            endpoint: &str,
            _body: Option<Value>,
        ) -> Result<Value, CustodyError> {
            self.calls
                .lock()
                .unwrap()
                .push((method, endpoint.to_string()));

            for (fail_method, suffix) in &self.fail_rules {
                if method == *fail_method && endpoint.ends_with(suffix) {
                    return Err(CustodyError::Transport {
                        endpoint: endpoint.to_string(),
                        detail: "connection refused".to_string(),
                    });
                }
            }
            Ok(self.mock.respond(method, endpoint))
        }
    }

    fn test_provisioner(
        fail_rules: Vec<(HttpMethod, &'static str)>,
    ) -> (tempfile::TempDir, Arc<ScriptedApi>, VaultProvisioner) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store =
            Arc::new(FileStore::open(StoragePaths::new(dir.path())).expect("store opens"));
        let api = Arc::new(ScriptedApi::new(fail_rules));
        let provisioner = VaultProvisioner::new(api.clone(), store);
        (dir, api, provisioner)
    }

    fn setup_request(issuer_id: &str) -> SetupRequest {
        SetupRequest {
            issuer_id: issuer_id.to_string(),
            user_id: "user-1".to_string(),
            company_name: "Acme Co".to_string(),
            asset_type: "EQUITY".to_string(),
            blockchain: "ethereum".to_string(),
            token_standard: "ERC-20".to_string(),
        }
    }

    fn is_evm_address(value: &str) -> bool {
        value.len() == 42
            && value.starts_with("0x")
            && value[2..].chars().all(|c| c.is_ascii_hexdigit())
    }

    #[tokio::test]
    async fn mock_mode_setup_returns_mock_wallet() {
        // Scenario: full run against a credential-less client.
        let dir = tempfile::tempdir().unwrap();
        let store =
            Arc::new(FileStore::open(StoragePaths::new(dir.path())).expect("store opens"));
        let client =
            Arc::new(CustodyClient::from_config(&CustodyConfig::mock()).expect("client builds"));
        let provisioner = VaultProvisioner::new(client.clone(), store);

        let outcome = provisioner
            .setup_issuer_wallet(setup_request("issuer-1"))
            .await
            .unwrap();

        assert!(!outcome.already_provisioned);
        assert_eq!(outcome.wallet.provider, WalletProvider::Mock);
        assert_eq!(outcome.wallet.chain, Blockchain::Ethereum);
        assert_eq!(outcome.wallet.asset_id, "ETH_TEST5");
        assert!(
            is_evm_address(&outcome.wallet.deposit_address),
            "bad address: {}",
            outcome.wallet.deposit_address
        );
        assert_eq!(client.requests_issued(), 0);
    }

    #[tokio::test]
    async fn unknown_blockchain_is_rejected_before_any_call() {
        let (_dir, api, provisioner) = test_provisioner(vec![]);

        let mut request = setup_request("issuer-1");
        request.blockchain = "solana".to_string();

        let err = provisioner.setup_issuer_wallet(request).await.unwrap_err();
        assert!(matches!(err, ProvisioningError::Validation(_)));
        assert!(api.calls().is_empty(), "no provider calls expected");
    }

    #[tokio::test]
    async fn attach_asset_failure_aborts_without_wallet_row() {
        let (_dir, _api, provisioner) =
            test_provisioner(vec![(HttpMethod::Post, "/ETH_TEST5")]);

        let err = provisioner
            .setup_issuer_wallet(setup_request("issuer-1"))
            .await
            .unwrap_err();

        assert_eq!(err.failed_step(), Some(ProvisioningStep::AttachAsset));
        let status = provisioner.check_setup_status("issuer-1").unwrap();
        assert!(!status.completed);
        assert!(status.wallet.is_none());
    }

    #[tokio::test]
    async fn activation_failure_does_not_block_completion() {
        let (_dir, _api, provisioner) =
            test_provisioner(vec![(HttpMethod::Post, "/activate")]);

        let outcome = provisioner
            .setup_issuer_wallet(setup_request("issuer-1"))
            .await
            .unwrap();

        assert!(is_evm_address(&outcome.wallet.deposit_address));
    }

    #[tokio::test]
    async fn address_resolution_falls_back_to_placeholder() {
        let (_dir, _api, provisioner) = test_provisioner(vec![
            (HttpMethod::Get, "/addresses"),
            (HttpMethod::Post, "/addresses"),
        ]);

        let outcome = provisioner
            .setup_issuer_wallet(setup_request("issuer-1"))
            .await
            .unwrap();

        assert!(outcome.wallet.deposit_address.starts_with("vault:"));
        assert!(outcome.wallet.deposit_address.ends_with(":ETH_TEST5"));
        assert_eq!(
            outcome.wallet.deposit_address,
            format!("vault:{}:ETH_TEST5", outcome.wallet.external_vault_id)
        );
    }

    #[tokio::test]
    async fn second_setup_short_circuits_with_same_wallet() {
        let (_dir, api, provisioner) = test_provisioner(vec![]);

        let first = provisioner
            .setup_issuer_wallet(setup_request("issuer-1"))
            .await
            .unwrap();
        let calls_after_first = api.calls().len();

        let second = provisioner
            .setup_issuer_wallet(setup_request("issuer-1"))
            .await
            .unwrap();

        assert!(second.already_provisioned);
        assert_eq!(second.wallet.wallet_id, first.wallet.wallet_id);
        assert_eq!(api.calls().len(), calls_after_first, "no further calls");
    }

    #[tokio::test]
    async fn concurrent_setups_for_same_issuer_yield_one_wallet() {
        let (_dir, _api, provisioner) = test_provisioner(vec![]);
        let provisioner = Arc::new(provisioner);

        let a = {
            let p = provisioner.clone();
            tokio::spawn(async move { p.setup_issuer_wallet(setup_request("issuer-1")).await })
        };
        let b = {
            let p = provisioner.clone();
            tokio::spawn(async move { p.setup_issuer_wallet(setup_request("issuer-1")).await })
        };

        let first = a.await.unwrap().unwrap();
        let second = b.await.unwrap().unwrap();

        assert_eq!(first.wallet.wallet_id, second.wallet.wallet_id);
        assert!(
            first.already_provisioned != second.already_provisioned,
            "exactly one run should provision"
        );
    }

    #[tokio::test]
    async fn different_issuers_provision_independently() {
        let (_dir, _api, provisioner) = test_provisioner(vec![]);

        let first = provisioner
            .setup_issuer_wallet(setup_request("issuer-1"))
            .await
            .unwrap();
        let second = provisioner
            .setup_issuer_wallet(setup_request("issuer-2"))
            .await
            .unwrap();

        assert_ne!(first.wallet.wallet_id, second.wallet.wallet_id);
        assert_ne!(
            first.wallet.external_vault_id,
            second.wallet.external_vault_id
        );
    }

    #[tokio::test]
    async fn status_round_trips_persisted_wallet() {
        let (_dir, _api, provisioner) = test_provisioner(vec![]);

        let outcome = provisioner
            .setup_issuer_wallet(setup_request("issuer-1"))
            .await
            .unwrap();

        let status = provisioner.check_setup_status("issuer-1").unwrap();
        assert!(status.completed);
        let wallet = status.wallet.unwrap();
        assert_eq!(wallet.chain, Blockchain::Ethereum);
        assert_eq!(wallet.asset_id, "ETH_TEST5");
        assert_eq!(wallet.deposit_address, outcome.wallet.deposit_address);
    }

    #[tokio::test]
    async fn mock_balance_is_zeroed_and_tagged() {
        let (_dir, _api, provisioner) = test_provisioner(vec![]);

        let balance = provisioner
            .vault_asset_balance("vault-1", "ETH_TEST5")
            .await
            .unwrap();
        assert_eq!(balance.available, "0");
        assert_eq!(balance.total, "0");
        assert!(balance.mock);

        let refreshed = provisioner
            .refresh_vault_asset_balance("vault-1", "ETH_TEST5")
            .await
            .unwrap();
        assert_eq!(refreshed.id.as_deref(), Some("ETH_TEST5"));
    }

    #[tokio::test]
    async fn invalid_identifier_is_rejected() {
        let (_dir, api, provisioner) = test_provisioner(vec![]);

        let mut request = setup_request("issuer-1");
        request.issuer_id = "../escape".to_string();

        let err = provisioner.setup_issuer_wallet(request).await.unwrap_err();
        assert!(matches!(err, ProvisioningError::Validation(_)));
        assert!(api.calls().is_empty());
    }
}
