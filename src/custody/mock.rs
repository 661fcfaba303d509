// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Meridian Tokenization

//! Mock custody responses, keyed by endpoint pattern.
//!
//! All fabrication lives here so mock shapes stay consistent across call
//! sites and tests can inject the responder directly. Responses are tagged
//! with `"mock": true` and derive their variable parts from a sha256 over the
//! endpoint and a per-responder sequence number, so repeated runs produce
//! stable shapes without a PRNG.

use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use super::signer::HttpMethod;

/// Fabricates provider responses for mock-mode and fallback calls.
#[derive(Debug, Default)]
pub struct MockResponder {
    seq: AtomicU64,
}

impl MockResponder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce a mock response for the given endpoint pattern.
    ///
    /// Never performs I/O.
    pub fn respond(&self, method: HttpMethod, endpoint: &str) -> Value {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let path = endpoint.split('?').next().unwrap_or(endpoint);
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match (method, segments.as_slice()) {
            // POST /v1/vault/accounts
            (HttpMethod::Post, ["v1", "vault", "accounts"]) => json!({
                "id": format!("mock-vault-{seq}"),
                "name": "Mock Vault Account",
                "hiddenOnUI": false,
                "customerRefId": format!("mock-ref-{seq}"),
                "autoFuel": false,
                "assets": [],
                "mock": true,
            }),
            // GET /v1/vault/accounts/{vault}
            (HttpMethod::Get, ["v1", "vault", "accounts", vault_id]) => json!({
                "id": vault_id,
                "name": "Mock Retrieved Vault",
                "hiddenOnUI": false,
                "assets": [],
                "mock": true,
            }),
            // PUT /v1/vault/accounts/{vault} (rename)
            (HttpMethod::Put, ["v1", "vault", "accounts", vault_id]) => json!({
                "id": vault_id,
                "name": format!("mock-renamed-{seq}"),
                "mock": true,
            }),
            // GET|POST /v1/vault/accounts/{vault}/{asset}/addresses
            (_, ["v1", "vault", "accounts", _, _, "addresses"]) => {
                let address = self.mock_chain_address(path, seq);
                let entry = json!({
                    "address": address,
                    "tag": null,
                    "description": "Mock deposit address",
                    "mock": true,
                });
                match method {
                    HttpMethod::Get => json!([entry]),
                    _ => entry,
                }
            }
            // POST /v1/vault/accounts/{vault}/{asset}/activate
            (HttpMethod::Post, ["v1", "vault", "accounts", _, _, "activate"]) => json!({
                "status": "ACTIVE",
                "mock": true,
            }),
            // POST /v1/vault/accounts/{vault}/{asset}/balance (refresh)
            (HttpMethod::Post, ["v1", "vault", "accounts", _, asset_id, "balance"]) => {
                self.mock_balance(asset_id)
            }
            // GET /v1/vault/accounts/{vault}/{asset} (balance)
            (HttpMethod::Get, ["v1", "vault", "accounts", _, asset_id]) => {
                self.mock_balance(asset_id)
            }
            // POST /v1/vault/accounts/{vault}/{asset} (attach asset wallet)
            (HttpMethod::Post, ["v1", "vault", "accounts", _, _]) => json!({
                "id": format!("mock-wallet-{seq}"),
                "address": self.mock_chain_address(path, seq),
                "legacyAddress": null,
                "tag": null,
                "status": "ACTIVE",
                "mock": true,
            }),
            _ => json!({ "mock": true }),
        }
    }

    fn mock_balance(&self, asset_id: &str) -> Value {
        json!({
            "id": asset_id,
            "available": "0",
            "total": "0",
            "pending": "0",
            "mock": true,
        })
    }

    /// A well-formed EVM-style address: `0x` + 40 hex chars, derived from the
    /// endpoint and sequence number.
    fn mock_chain_address(&self, endpoint: &str, seq: u64) -> String {
        let digest = Sha256::digest(format!("{endpoint}:{seq}").as_bytes());
        let mut address = String::with_capacity(42);
        address.push_str("0x");
        for byte in digest.iter().take(20) {
            use std::fmt::Write;
            let _ = write!(address, "{byte:02x}");
        }
        address
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_evm_address(value: &str) -> bool {
        value.len() == 42
            && value.starts_with("0x")
            && value[2..].chars().all(|c| c.is_ascii_hexdigit())
    }

    #[test]
    fn vault_creation_fabricates_vault_shape() {
        let responder = MockResponder::new();
        let response = responder.respond(HttpMethod::Post, "/v1/vault/accounts");
        assert!(response["id"].as_str().unwrap().starts_with("mock-vault-"));
        assert_eq!(response["mock"], true);
    }

    #[test]
    fn wallet_creation_fabricates_chain_address() {
        let responder = MockResponder::new();
        let response = responder.respond(HttpMethod::Post, "/v1/vault/accounts/7/ETH_TEST5");
        let address = response["address"].as_str().unwrap();
        assert!(is_evm_address(address), "bad address: {address}");
        assert_eq!(response["mock"], true);
    }

    #[test]
    fn address_list_returns_non_empty_array() {
        let responder = MockResponder::new();
        let response = responder.respond(HttpMethod::Get, "/v1/vault/accounts/7/ETH_TEST5/addresses");
        let entries = response.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert!(is_evm_address(entries[0]["address"].as_str().unwrap()));
    }

    #[test]
    fn balance_endpoints_return_zeroed_balances() {
        let responder = MockResponder::new();
        let get = responder.respond(HttpMethod::Get, "/v1/vault/accounts/7/AVAXTEST");
        assert_eq!(get["available"], "0");
        assert_eq!(get["total"], "0");
        assert_eq!(get["mock"], true);

        let refresh = responder.respond(HttpMethod::Post, "/v1/vault/accounts/7/AVAXTEST/balance");
        assert_eq!(refresh["id"], "AVAXTEST");
        assert_eq!(refresh["total"], "0");
    }

    #[test]
    fn addresses_differ_across_calls_but_keep_shape() {
        let responder = MockResponder::new();
        let first = responder.respond(HttpMethod::Post, "/v1/vault/accounts/7/ETH_TEST5");
        let second = responder.respond(HttpMethod::Post, "/v1/vault/accounts/7/ETH_TEST5");
        assert_ne!(first["address"], second["address"]);
    }

    #[test]
    fn unknown_endpoints_still_carry_mock_tag() {
        let responder = MockResponder::new();
        let response = responder.respond(HttpMethod::Get, "/v1/supported_assets");
        assert_eq!(response["mock"], true);
    }

    #[test]
    fn query_string_does_not_change_pattern_match() {
        let responder = MockResponder::new();
        let response = responder.respond(HttpMethod::Get, "/v1/vault/accounts/9?include=assets");
        assert_eq!(response["id"], "9");
    }
}
