// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Meridian Tokenization

//! Vault asset balance endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{custody::Balance, error::ApiError, state::AppState};

/// Balance response for a vault asset.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VaultBalanceResponse {
    /// Vault container id at the custody provider.
    pub vault_id: String,
    /// Provider asset identifier.
    pub asset_id: String,
    /// Balance figures.
    #[serde(flatten)]
    pub balance: Balance,
}

/// Get the current balance of a vault asset.
#[utoipa::path(
    get,
    path = "/v1/vaults/{vault_id}/assets/{asset_id}/balance",
    tag = "Vaults",
    params(
        ("vault_id" = String, Path, description = "Vault ID"),
        ("asset_id" = String, Path, description = "Provider asset ID")
    ),
    responses(
        (status = 200, description = "Balance retrieved", body = VaultBalanceResponse),
        (status = 502, description = "Custody provider unavailable")
    )
)]
pub async fn get_vault_asset_balance(
    State(state): State<AppState>,
    Path((vault_id, asset_id)): Path<(String, String)>,
) -> Result<Json<VaultBalanceResponse>, ApiError> {
    let balance = state
        .provisioner
        .vault_asset_balance(&vault_id, &asset_id)
        .await?;
    Ok(Json(VaultBalanceResponse {
        vault_id,
        asset_id,
        balance,
    }))
}

/// Ask the provider to refresh a vault asset balance, then return it.
#[utoipa::path(
    post,
    path = "/v1/vaults/{vault_id}/assets/{asset_id}/balance/refresh",
    tag = "Vaults",
    params(
        ("vault_id" = String, Path, description = "Vault ID"),
        ("asset_id" = String, Path, description = "Provider asset ID")
    ),
    responses(
        (status = 200, description = "Balance refreshed", body = VaultBalanceResponse),
        (status = 502, description = "Custody provider unavailable")
    )
)]
pub async fn refresh_vault_asset_balance(
    State(state): State<AppState>,
    Path((vault_id, asset_id)): Path<(String, String)>,
) -> Result<Json<VaultBalanceResponse>, ApiError> {
    let balance = state
        .provisioner
        .refresh_vault_asset_balance(&vault_id, &asset_id)
        .await?;
    Ok(Json(VaultBalanceResponse {
        vault_id,
        asset_id,
        balance,
    }))
}
