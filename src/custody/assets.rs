// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Meridian Tokenization

//! Blockchain, asset-type, and token-standard catalog.
//!
//! The custody sandbox runs against testnets, so each supported chain maps to
//! the provider's testnet asset identifier. Selection validation happens here,
//! before any provider call is made.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Chains issuers can provision wallets on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Blockchain {
    Ethereum,
    Polygon,
    Avalanche,
}

impl Blockchain {
    pub const ALL: [Blockchain; 3] = [
        Blockchain::Ethereum,
        Blockchain::Polygon,
        Blockchain::Avalanche,
    ];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "ethereum" => Some(Blockchain::Ethereum),
            "polygon" => Some(Blockchain::Polygon),
            "avalanche" => Some(Blockchain::Avalanche),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Blockchain::Ethereum => "ethereum",
            Blockchain::Polygon => "polygon",
            Blockchain::Avalanche => "avalanche",
        }
    }

    /// The provider's asset identifier for this chain's testnet.
    pub fn asset_id(&self) -> &'static str {
        match self {
            Blockchain::Ethereum => "ETH_TEST5",
            Blockchain::Polygon => "AMOY_POLYGON_TEST",
            Blockchain::Avalanche => "AVAXTEST",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Blockchain::Ethereum => "Ethereum Testnet",
            Blockchain::Polygon => "Polygon Testnet",
            Blockchain::Avalanche => "Avalanche Testnet",
        }
    }
}

impl std::fmt::Display for Blockchain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Real-world asset classes issuers can tokenize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetType {
    Gold,
    Equity,
    RealEstate,
    Art,
    CarbonCredits,
    Commodities,
}

impl AssetType {
    pub const ALL: [AssetType; 6] = [
        AssetType::Gold,
        AssetType::Equity,
        AssetType::RealEstate,
        AssetType::Art,
        AssetType::CarbonCredits,
        AssetType::Commodities,
    ];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "GOLD" => Some(AssetType::Gold),
            "EQUITY" => Some(AssetType::Equity),
            "REAL_ESTATE" => Some(AssetType::RealEstate),
            "ART" => Some(AssetType::Art),
            "CARBON_CREDITS" => Some(AssetType::CarbonCredits),
            "COMMODITIES" => Some(AssetType::Commodities),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Gold => "GOLD",
            AssetType::Equity => "EQUITY",
            AssetType::RealEstate => "REAL_ESTATE",
            AssetType::Art => "ART",
            AssetType::CarbonCredits => "CARBON_CREDITS",
            AssetType::Commodities => "COMMODITIES",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AssetType::Gold => "Gold",
            AssetType::Equity => "Company Equity",
            AssetType::RealEstate => "Real Estate",
            AssetType::Art => "Art",
            AssetType::CarbonCredits => "Carbon Credits",
            AssetType::Commodities => "Commodities",
        }
    }

    /// Unique assets (real estate, art) tokenize as NFTs; everything else is
    /// fungible.
    pub fn token_standards(&self) -> &'static [TokenStandard] {
        match self {
            AssetType::RealEstate | AssetType::Art => {
                &[TokenStandard::Erc721, TokenStandard::Erc1155]
            }
            _ => &[TokenStandard::Erc20],
        }
    }
}

/// Token standards supported on the EVM chains above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum TokenStandard {
    #[serde(rename = "ERC20")]
    Erc20,
    #[serde(rename = "ERC721")]
    Erc721,
    #[serde(rename = "ERC1155")]
    Erc1155,
}

impl TokenStandard {
    /// Accepts both `ERC20` and the hyphenated `ERC-20` the web client sends.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().replace('-', "").as_str() {
            "ERC20" => Some(TokenStandard::Erc20),
            "ERC721" => Some(TokenStandard::Erc721),
            "ERC1155" => Some(TokenStandard::Erc1155),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenStandard::Erc20 => "ERC20",
            TokenStandard::Erc721 => "ERC721",
            TokenStandard::Erc1155 => "ERC1155",
        }
    }
}

impl std::fmt::Display for TokenStandard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated (asset type, blockchain, token standard) combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub asset_type: AssetType,
    pub blockchain: Blockchain,
    pub token_standard: TokenStandard,
}

impl Selection {
    /// Provider asset identifier for the selected chain.
    pub fn asset_id(&self) -> &'static str {
        self.blockchain.asset_id()
    }
}

/// Validate raw selection strings against the catalog.
///
/// Runs before any network call; an unsupported combination never reaches the
/// custody client.
pub fn validate_selection(
    asset_type: &str,
    blockchain: &str,
    token_standard: &str,
) -> Result<Selection, String> {
    let asset_type = AssetType::parse(asset_type)
        .ok_or_else(|| format!("unsupported asset type: {asset_type}"))?;
    let blockchain = Blockchain::parse(blockchain)
        .ok_or_else(|| format!("unsupported blockchain: {blockchain}"))?;
    let token_standard = TokenStandard::parse(token_standard)
        .ok_or_else(|| format!("unsupported token standard: {token_standard}"))?;

    if !asset_type.token_standards().contains(&token_standard) {
        return Err(format!(
            "token standard {token_standard} not supported for asset type {}",
            asset_type.as_str()
        ));
    }

    Ok(Selection {
        asset_type,
        blockchain,
        token_standard,
    })
}
