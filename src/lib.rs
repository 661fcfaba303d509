// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Meridian Tokenization

//! Meridian Custody Server - Issuer Vault Provisioning Service
//!
//! This crate provisions custodial blockchain wallets for asset-tokenization
//! issuers by driving a third-party custody provider's REST API and recording
//! the resulting wallet in local storage.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `custody` - Signed custody API client and provisioning workflow
//! - `storage` - JSON-document record store and repositories

pub mod api;
pub mod config;
pub mod custody;
pub mod error;
pub mod state;
pub mod storage;
