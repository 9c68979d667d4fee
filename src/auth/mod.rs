// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Orbital Finance

//! # Authentication Module
//!
//! Sign-In-With-Ethereum authentication and JWT session lifecycle.
//!
//! ## Auth Flow
//!
//! 1. Frontend requests a nonce for `(address, chainId)`
//! 2. Wallet extension signs the returned sign-in message (EIP-191)
//! 3. Server verifies the signature:
//!    - consumes the nonce atomically (single use, 5-minute expiry)
//!    - recovers the signer and compares it to the claimed address
//!    - mints an access token (15 min) and a refresh token (7 days)
//! 4. Frontend sends `Authorization: Bearer <access token>` on API calls
//! 5. Expired access tokens are re-minted via the refresh token; logout
//!    adds the refresh token to the revocation set
//!
//! ## Security
//!
//! - Nonces are single-use; a raced verification loses with `NonceNotFound`
//! - Tokens are HS256 JWTs with an explicit `tokenType` claim
//! - Access tokens are never individually revocable; refresh tokens are
//! - Token expiry is enforced with zero clock-skew leeway
//! - Nonce and verify endpoints are rate limited per address

pub mod claims;
pub mod error;
pub mod extractor;
pub mod message;
pub mod service;
pub mod signature;

pub use claims::{AccessClaims, AuthenticatedWallet, RefreshClaims};
pub use error::AuthError;
pub use extractor::Auth;
pub use service::WalletAuthService;
