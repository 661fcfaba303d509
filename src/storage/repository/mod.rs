// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Meridian Tokenization

//! Repository layer providing typed access to the record store.

pub mod setup;
pub mod wallets;

pub use setup::{SetupRecord, SetupRepository};
pub use wallets::{WalletProvider, WalletRecord, WalletRepository};
