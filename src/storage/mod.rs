// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Meridian Tokenization

//! # Record Storage Module
//!
//! Persistence for this service is a small JSON-document store: one file per
//! record under the data directory, written atomically (temp file + rename).
//!
//! ## Storage Layout
//!
//! ```text
//! {DATA_DIR}/
//!   wallets/{issuer_id}.json   # Provisioned wallet record
//!   setup/{issuer_id}.json     # Issuer setup state and selections
//! ```
//!
//! Wallet documents are keyed by issuer id, so the filesystem itself enforces
//! at most one wallet per issuer and the atomic rename makes every write an
//! upsert.

pub mod paths;
pub mod repository;
pub mod store;

pub use paths::StoragePaths;
pub use repository::{
    SetupRecord, SetupRepository, WalletProvider, WalletRecord, WalletRepository,
};
pub use store::{FileStore, StorageError, StorageResult};
