// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Orbital Finance

//! # API Data Models
//!
//! This module defines the request and response data structures used by
//! the authentication API. All types derive `Serialize`, `Deserialize`,
//! and `ToSchema` for automatic JSON handling and OpenAPI documentation.
//!
//! Wire format is camelCase JSON, matching the dashboard frontend.
//!
//! ## Wallet Address Type
//!
//! The [`WalletAddress`] newtype wraps Ethereum-style addresses
//! (0x-prefixed, 40 hex characters). It provides type safety and a single
//! place for parsing and canonicalization.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::AuthError;

// =============================================================================
// Wallet Address Type
// =============================================================================

/// Ethereum-compatible wallet address wrapper.
///
/// Format: `0x` followed by 40 hexadecimal characters (20 bytes).
///
/// # Example
///
/// ```rust,ignore
/// let addr = WalletAddress::from("0x742d35Cc6634C0532925a3b844Bc9e7595f4aB12");
/// let parsed = addr.parse()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WalletAddress(pub String);

impl WalletAddress {
    /// Parse into a checksummed EVM address.
    ///
    /// Fails with [`AuthError::InvalidAddress`] if the string is not a
    /// well-formed 20-byte hex address.
    pub fn parse(&self) -> Result<Address, AuthError> {
        self.0
            .parse::<Address>()
            .map_err(|_| AuthError::InvalidAddress)
    }

    /// Canonical lowercase form used as a store key.
    pub fn canonical(&self) -> String {
        self.0.to_lowercase()
    }
}

impl std::fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for WalletAddress {
    fn from(value: String) -> Self {
        WalletAddress(value)
    }
}

impl From<&str> for WalletAddress {
    fn from(value: &str) -> Self {
        WalletAddress(value.to_string())
    }
}

impl From<WalletAddress> for String {
    fn from(value: WalletAddress) -> Self {
        value.0
    }
}

// =============================================================================
// Nonce Models
// =============================================================================

/// Request body for `POST /api/auth/wallet/nonce`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NonceRequest {
    /// Wallet address requesting to sign in.
    pub address: WalletAddress,
    /// EVM chain ID the session is scoped to.
    pub chain_id: u64,
}

/// Response body for `POST /api/auth/wallet/nonce`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NonceResponse {
    /// Single-use random nonce (64 hex characters).
    pub nonce: String,
    /// Full sign-in message the wallet must sign.
    pub message: String,
    /// When the nonce stops being accepted (RFC 3339).
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

// =============================================================================
// Verification Models
// =============================================================================

/// Request body for `POST /api/auth/wallet/verify`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    /// Wallet address claimed by the caller.
    pub address: WalletAddress,
    /// Hex-encoded EIP-191 signature over the sign-in message.
    pub signature: String,
    /// The nonce previously issued for this address.
    pub nonce: String,
    /// EVM chain ID the nonce was issued for.
    pub chain_id: u64,
}

/// Response body for `POST /api/auth/wallet/verify`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    /// Short-lived bearer JWT for API requests.
    pub access_token: String,
    /// Long-lived token used only to mint new access tokens.
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
    /// The authenticated wallet address.
    pub address: WalletAddress,
    /// The chain ID the session is scoped to.
    pub chain_id: u64,
}

// =============================================================================
// Refresh / Logout Models
// =============================================================================

/// Request body for `POST /api/auth/wallet/refresh`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    /// The refresh token minted at verification time.
    pub refresh_token: String,
}

/// Response body for `POST /api/auth/wallet/refresh`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    /// Newly minted access token.
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// Request body for `POST /api/auth/wallet/logout`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    /// The refresh token to revoke.
    pub refresh_token: String,
    /// Revoke every outstanding refresh token for this wallet.
    #[serde(default)]
    pub logout_all: bool,
}

/// Response body for `POST /api/auth/wallet/logout`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogoutResponse {
    /// Always `true`; revoking an already-revoked token is not an error.
    pub success: bool,
}

// =============================================================================
// Profile Models
// =============================================================================

/// Response body for `GET /api/auth/wallet/me`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    /// The authenticated wallet address.
    pub address: WalletAddress,
    /// The chain ID the session is scoped to.
    pub chain_id: u64,
    /// Number of successful sign-ins for this wallet.
    pub login_count: u64,
    /// Timestamp of the most recent sign-in (RFC 3339).
    pub last_login: chrono::DateTime<chrono::Utc>,
}
