// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Meridian Tokenization

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Root directory for wallet/setup records | `./data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `CUSTODY_API_BASE_URL` | Custody provider base URL | sandbox URL |
//! | `CUSTODY_API_KEY` | Custody API key (JWT `sub` claim) | Required for live mode |
//! | `CUSTODY_SIGNING_KEY_PEM` | RSA signing key, inline PEM | - |
//! | `CUSTODY_SIGNING_KEY_PATH` | RSA signing key, file path | - |
//! | `CUSTODY_MOCK_MODE` | Force mock mode (`true`/`false`) | `false` |
//! | `CUSTODY_FALLBACK_TO_MOCK` | Mock response on live call failure | `false` |
//! | `CUSTODY_REQUEST_TIMEOUT_SECS` | Outbound request timeout | `15` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::{fs, time::Duration};

/// Environment variable name for the record store directory path.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Default custody provider endpoint (sandbox workspace).
const DEFAULT_API_BASE_URL: &str = "https://sandbox-api.custody.example.com";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Custody client configuration, loaded once at startup.
///
/// A missing or unreadable signing key is not fatal: the client falls back
/// to mock mode for the process lifetime.
#[derive(Debug, Clone)]
pub struct CustodyConfig {
    /// Custody provider base URL, trailing slash stripped.
    pub api_base_url: String,
    /// API key identifying the workspace; becomes the JWT `sub` claim and,
    /// when the secondary header scheme is enabled, the `X-API-Key` value.
    pub api_key: Option<String>,
    /// RSA private key in PEM form, if one could be loaded.
    pub signing_key_pem: Option<String>,
    /// Force mock mode regardless of credentials.
    pub mock_mode: bool,
    /// Serve a mock response instead of surfacing live call failures.
    pub fallback_to_mock_on_error: bool,
    /// Whether to attach the static `X-API-Key` header alongside the JWT.
    pub send_api_key_header: bool,
    /// Bound on each outbound provider call.
    pub request_timeout: Duration,
}

impl CustodyConfig {
    /// Load configuration from the environment.
    ///
    /// Never fails: absent credentials simply leave `signing_key_pem`/`api_key`
    /// unset, which the client maps to permanent mock mode.
    pub fn from_env() -> Self {
        let api_base_url = normalize_base_url(&env_or_default(
            "CUSTODY_API_BASE_URL",
            DEFAULT_API_BASE_URL,
        ));
        let api_key = env_optional("CUSTODY_API_KEY");
        let signing_key_pem = load_signing_key_pem();
        let mock_mode = env_flag("CUSTODY_MOCK_MODE");
        let fallback_to_mock_on_error = env_flag("CUSTODY_FALLBACK_TO_MOCK");
        let send_api_key_header = env_flag("CUSTODY_SEND_API_KEY_HEADER");
        let request_timeout = Duration::from_secs(
            env_optional("CUSTODY_REQUEST_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        );

        Self {
            api_base_url,
            api_key,
            signing_key_pem,
            mock_mode,
            fallback_to_mock_on_error,
            send_api_key_header,
            request_timeout,
        }
    }

    /// Configuration for a client that never touches the network.
    pub fn mock() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_key: None,
            signing_key_pem: None,
            mock_mode: true,
            fallback_to_mock_on_error: false,
            send_api_key_header: false,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

fn normalize_base_url(raw: &str) -> String {
    let mut candidate = raw.trim().to_string();
    if !candidate.starts_with("http") {
        candidate = format!("https://{candidate}");
    }
    match url::Url::parse(&candidate) {
        Ok(parsed) => parsed.to_string().trim_end_matches('/').to_string(),
        Err(e) => {
            tracing::warn!(url = %candidate, error = %e, "custody base URL did not parse, using as-is");
            candidate.trim_end_matches('/').to_string()
        }
    }
}

fn env_optional(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) => {
            let trimmed = value.trim().to_string();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        }
        Err(_) => None,
    }
}

fn env_or_default(name: &str, default: &str) -> String {
    env_optional(name).unwrap_or_else(|| default.to_string())
}

fn env_flag(name: &str) -> bool {
    env_optional(name)
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// Load the signing key from the inline PEM variable, falling back to the
/// path variable. Inline values may carry `\n` escapes from .env files.
fn load_signing_key_pem() -> Option<String> {
    if let Some(pem) = env_optional("CUSTODY_SIGNING_KEY_PEM") {
        return Some(pem.replace("\\n", "\n"));
    }

    let path = env_optional("CUSTODY_SIGNING_KEY_PATH")?;
    match fs::read_to_string(&path) {
        Ok(pem) => {
            let trimmed = pem.trim().to_string();
            if trimmed.is_empty() {
                tracing::warn!(path = %path, "signing key file is empty");
                None
            } else {
                Some(trimmed)
            }
        }
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "failed to read signing key file");
            None
        }
    }
}
