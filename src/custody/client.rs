// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Meridian Tokenization

//! Custody provider HTTP client.
//!
//! Single point of contact with the provider REST API. Owns mode selection
//! (live vs mock) and error normalization; never touches persistent storage.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::CustodyConfig;

use super::{
    error::CustodyError,
    mock::MockResponder,
    signer::{HttpMethod, RequestSigner},
};

/// How outbound requests authenticate. The provider's newer workspaces accept
/// the bearer token alone; older ones additionally require the static
/// `X-API-Key` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    Bearer,
    BearerWithApiKey,
}

/// Seam between the provisioning workflow and the provider transport.
///
/// The workflow depends on this trait rather than the concrete client so
/// tests can script per-endpoint outcomes.
#[async_trait]
pub trait VaultApi: Send + Sync {
    /// Issue one provider call and return the parsed JSON body.
    async fn call(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<Value>,
    ) -> Result<Value, CustodyError>;
}

/// Custody provider API client.
///
/// Constructed once from configuration. If the signing credentials are
/// missing or unparsable the client permanently operates in mock mode; key
/// loading is never retried.
pub struct CustodyClient {
    base_url: String,
    api_key: Option<String>,
    auth_scheme: AuthScheme,
    signer: Option<RequestSigner>,
    mock_mode: bool,
    fallback_to_mock: bool,
    http: Client,
    mock: MockResponder,
    requests_issued: AtomicU64,
}

impl CustodyClient {
    /// Build a client from loaded configuration.
    ///
    /// Only fails if the HTTP connector itself cannot be constructed;
    /// credential problems degrade to mock mode instead.
    pub fn from_config(config: &CustodyConfig) -> Result<Self, CustodyError> {
        let signer = match (&config.api_key, &config.signing_key_pem) {
            (Some(api_key), Some(pem)) => match RequestSigner::from_pem(api_key, pem) {
                Ok(signer) => Some(signer),
                Err(e) => {
                    warn!(error = %e, "signing key unusable, entering mock mode");
                    None
                }
            },
            _ => {
                if !config.mock_mode {
                    warn!("custody credentials not configured, entering mock mode");
                }
                None
            }
        };

        let mock_mode = config.mock_mode || signer.is_none();
        let auth_scheme = if config.send_api_key_header {
            AuthScheme::BearerWithApiKey
        } else {
            AuthScheme::Bearer
        };

        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| {
                CustodyError::Configuration(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            auth_scheme,
            signer,
            mock_mode,
            fallback_to_mock: config.fallback_to_mock_on_error,
            http,
            mock: MockResponder::new(),
            requests_issued: AtomicU64::new(0),
        })
    }

    /// Whether this client fabricates responses instead of calling out.
    pub fn is_mock(&self) -> bool {
        self.mock_mode
    }

    /// Number of HTTP requests actually put on the wire.
    pub fn requests_issued(&self) -> u64 {
        self.requests_issued.load(Ordering::Relaxed)
    }

    async fn live_call(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<Value, CustodyError> {
        let signer = self.signer.as_ref().ok_or_else(|| {
            CustodyError::Configuration("live call attempted without credentials".to_string())
        })?;
        let token = signer.sign(method, endpoint, body)?;
        let url = format!("{}{}", self.base_url, endpoint);

        let mut request = match method {
            HttpMethod::Get => self.http.get(&url),
            HttpMethod::Post => self.http.post(&url),
            HttpMethod::Put => self.http.put(&url),
        }
        .header("Authorization", format!("Bearer {token}"))
        .header("Content-Type", "application/json")
        .header("Accept", "application/json");

        if self.auth_scheme == AuthScheme::BearerWithApiKey {
            if let Some(api_key) = &self.api_key {
                request = request.header("X-API-Key", api_key.clone());
            }
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        self.requests_issued.fetch_add(1, Ordering::Relaxed);
        debug!(method = %method, endpoint = %endpoint, "custody API request");

        let response = request
            .send()
            .await
            .map_err(|e| CustodyError::Transport {
                endpoint: endpoint.to_string(),
                detail: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status == reqwest::StatusCode::UNAUTHORIZED
                || status == reqwest::StatusCode::FORBIDDEN
            {
                return Err(CustodyError::Authentication {
                    endpoint: endpoint.to_string(),
                    detail: format!("{status}: {body}"),
                });
            }
            return Err(CustodyError::Api {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        response.json().await.map_err(|e| {
            CustodyError::InvalidResponse(format!("{method} {endpoint} invalid JSON: {e}"))
        })
    }
}

#[async_trait]
impl VaultApi for CustodyClient {
    async fn call(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<Value>,
    ) -> Result<Value, CustodyError> {
        if self.mock_mode {
            return Ok(self.mock.respond(method, endpoint));
        }

        match self.live_call(method, endpoint, body.as_ref()).await {
            Ok(value) => Ok(value),
            Err(e) if self.fallback_to_mock => {
                warn!(
                    method = %method,
                    endpoint = %endpoint,
                    error = %e,
                    "custody call failed, serving mock response"
                );
                Ok(self.mock.respond(method, endpoint))
            }
            Err(e) => Err(e),
        }
    }
}
