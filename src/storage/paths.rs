// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Meridian Tokenization

//! Storage layout helpers.

use std::path::{Path, PathBuf};

/// Default record store location.
const DEFAULT_ROOT: &str = "./data";

/// Resolves record paths under the data directory.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl StoragePaths {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn wallets_dir(&self) -> PathBuf {
        self.root.join("wallets")
    }

    pub fn setup_dir(&self) -> PathBuf {
        self.root.join("setup")
    }

    /// Wallet record path. Keyed by issuer id: one wallet per issuer.
    pub fn wallet_record(&self, issuer_id: &str) -> PathBuf {
        self.wallets_dir().join(format!("{issuer_id}.json"))
    }

    pub fn setup_record(&self, issuer_id: &str) -> PathBuf {
        self.setup_dir().join(format!("{issuer_id}.json"))
    }
}

impl Default for StoragePaths {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_paths_are_keyed_by_issuer() {
        let paths = StoragePaths::new("/tmp/custody-data");
        assert_eq!(
            paths.wallet_record("issuer-1"),
            PathBuf::from("/tmp/custody-data/wallets/issuer-1.json")
        );
        assert_eq!(
            paths.setup_record("issuer-1"),
            PathBuf::from("/tmp/custody-data/setup/issuer-1.json")
        );
    }
}
