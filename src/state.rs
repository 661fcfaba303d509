// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Meridian Tokenization

use std::sync::Arc;

use crate::custody::VaultProvisioner;

#[derive(Clone)]
pub struct AppState {
    pub provisioner: Arc<VaultProvisioner>,
}

impl AppState {
    pub fn new(provisioner: VaultProvisioner) -> Self {
        Self {
            provisioner: Arc::new(provisioner),
        }
    }
}
