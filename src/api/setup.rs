// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Meridian Tokenization

//! Issuer setup API: provisioning, status, and option catalog.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    custody::{
        assets::{AssetType, Blockchain},
        SetupOutcome, SetupRequest, WalletSummary,
    },
    error::ApiError,
    state::AppState,
};

/// Request body for issuer wallet provisioning.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SetupIssuerRequest {
    /// Issuer to provision for.
    pub issuer_id: String,
    /// User who owns the issuer profile.
    pub user_id: String,
    /// Company name used for the vault label.
    pub company_name: String,
    /// Asset class (e.g. `EQUITY`).
    pub asset_type: String,
    /// Chain (`ethereum`, `polygon`, `avalanche`).
    pub blockchain: String,
    /// Token standard (`ERC-20`, `ERC-721`, `ERC-1155`).
    pub token_standard: String,
}

/// Setup status response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SetupStatusResponse {
    /// Whether provisioning has completed.
    pub completed: bool,
    /// When provisioning completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// The provisioned wallet, when completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet: Option<WalletSummary>,
}

/// One selectable option.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OptionEntry {
    /// Stable identifier clients submit back.
    pub id: String,
    /// Human-friendly name for display.
    pub name: String,
}

/// Query parameters for the option catalog.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct SetupOptionsQuery {
    /// Narrow blockchains/token standards to this asset type.
    pub asset_type: Option<String>,
    /// Narrow token standards to this blockchain.
    pub blockchain: Option<String>,
}

/// Option catalog for the issuer setup flow.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SetupOptionsResponse {
    /// Asset classes available for tokenization.
    pub asset_types: Vec<OptionEntry>,
    /// Chains for the selected asset type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blockchains: Option<Vec<OptionEntry>>,
    /// Token standards for the selected asset type and chain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_standards: Option<Vec<String>>,
}

/// Provision a custodial wallet for an issuer.
#[utoipa::path(
    post,
    path = "/v1/issuers/setup",
    tag = "Issuer Setup",
    request_body = SetupIssuerRequest,
    responses(
        (status = 201, description = "Wallet provisioned", body = SetupOutcome),
        (status = 200, description = "Setup already completed", body = SetupOutcome),
        (status = 400, description = "Unsupported selection or malformed input"),
        (status = 502, description = "A provisioning step failed at the provider")
    )
)]
pub async fn setup_issuer(
    State(state): State<AppState>,
    Json(request): Json<SetupIssuerRequest>,
) -> Result<(StatusCode, Json<SetupOutcome>), ApiError> {
    let outcome = state
        .provisioner
        .setup_issuer_wallet(SetupRequest {
            issuer_id: request.issuer_id,
            user_id: request.user_id,
            company_name: request.company_name,
            asset_type: request.asset_type,
            blockchain: request.blockchain,
            token_standard: request.token_standard,
        })
        .await?;

    let status = if outcome.already_provisioned {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(outcome)))
}

/// Check whether an issuer's setup has completed.
#[utoipa::path(
    get,
    path = "/v1/issuers/{issuer_id}/setup/status",
    tag = "Issuer Setup",
    params(("issuer_id" = String, Path, description = "Issuer ID")),
    responses(
        (status = 200, description = "Setup status", body = SetupStatusResponse)
    )
)]
pub async fn setup_status(
    State(state): State<AppState>,
    Path(issuer_id): Path<String>,
) -> Result<Json<SetupStatusResponse>, ApiError> {
    let status = state.provisioner.check_setup_status(&issuer_id)?;
    Ok(Json(SetupStatusResponse {
        completed: status.completed,
        completed_at: status.completed_at,
        wallet: status.wallet.map(WalletSummary::from),
    }))
}

/// Option catalog for the setup wizard. Blockchains appear once an asset type
/// is chosen; token standards once both are.
#[utoipa::path(
    get,
    path = "/v1/issuers/setup/options",
    tag = "Issuer Setup",
    params(SetupOptionsQuery),
    responses(
        (status = 200, description = "Available options", body = SetupOptionsResponse),
        (status = 400, description = "Unknown asset type or blockchain")
    )
)]
pub async fn setup_options(
    Query(query): Query<SetupOptionsQuery>,
) -> Result<Json<SetupOptionsResponse>, ApiError> {
    let asset_types = AssetType::ALL
        .iter()
        .map(|a| OptionEntry {
            id: a.as_str().to_string(),
            name: a.display_name().to_string(),
        })
        .collect();

    let mut response = SetupOptionsResponse {
        asset_types,
        blockchains: None,
        token_standards: None,
    };

    let Some(raw_asset_type) = query.asset_type else {
        return Ok(Json(response));
    };
    let asset_type = AssetType::parse(&raw_asset_type)
        .ok_or_else(|| ApiError::bad_request(format!("unknown asset type: {raw_asset_type}")))?;

    response.blockchains = Some(
        Blockchain::ALL
            .iter()
            .map(|b| OptionEntry {
                id: b.as_str().to_string(),
                name: b.display_name().to_string(),
            })
            .collect(),
    );

    let Some(raw_blockchain) = query.blockchain else {
        return Ok(Json(response));
    };
    Blockchain::parse(&raw_blockchain)
        .ok_or_else(|| ApiError::bad_request(format!("unknown blockchain: {raw_blockchain}")))?;

    response.token_standards = Some(
        asset_type
            .token_standards()
            .iter()
            .map(|t| t.as_str().to_string())
            .collect(),
    );

    Ok(Json(response))
}
