// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Orbital Finance

//! Axum extractor for authenticated wallets.
//!
//! Use the `Auth` extractor in handlers to require a valid bearer access
//! token:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(wallet): Auth) -> impl IntoResponse {
//!     // wallet is AuthenticatedWallet
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::{AuthenticatedWallet, AuthError};
use crate::state::AppState;

/// Extractor for authenticated wallets.
///
/// Validates the access token from the `Authorization` header and
/// provides the wallet it authenticates. The revocation set is never
/// consulted here; only refresh tokens are revocable.
pub struct Auth(pub AuthenticatedWallet);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // A previous layer may have validated the token already.
        if let Some(wallet) = parts.extensions.get::<AuthenticatedWallet>().cloned() {
            return Ok(Auth(wallet));
        }

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidAuthHeader)?;

        let wallet = state.auth.validate_access_token(token.trim())?;
        Ok(Auth(wallet))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthConfig;
    use crate::models::WalletAddress;
    use axum::http::Request;
    use chrono::Duration;

    const ADDR: &str = "0x742d35cc6634c0532925a3b844bc9e7595f4ab12";

    fn test_state() -> AppState {
        AppState::in_memory(AuthConfig::with_secret("extractor-secret"))
    }

    /// Mint a real access token with the state's own codec.
    fn access_token(secret: &str, ttl: Duration) -> String {
        use crate::auth::claims::TokenCodec;
        TokenCodec::new(secret)
            .mint_access(ADDR, 1, chrono::Utc::now(), ttl)
            .unwrap()
    }

    fn parts_with_header(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/test");
        if let Some(value) = value {
            builder = builder.header("Authorization", value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn missing_header_is_rejected() {
        let state = test_state();
        let mut parts = parts_with_header(None);

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[tokio::test]
    async fn non_bearer_header_is_rejected() {
        let state = test_state();
        let mut parts = parts_with_header(Some("Basic dXNlcjpwYXNz"));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidAuthHeader)));
    }

    #[tokio::test]
    async fn valid_token_authenticates() {
        let state = test_state();
        let token = access_token("extractor-secret", Duration::minutes(15));
        let mut parts = parts_with_header(Some(&format!("Bearer {token}")));

        let Auth(wallet) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(wallet.address.0, ADDR);
        assert_eq!(wallet.chain_id, 1);
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let state = test_state();
        let token = access_token("extractor-secret", Duration::seconds(-5));
        let mut parts = parts_with_header(Some(&format!("Bearer {token}")));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::TokenExpired)));
    }

    #[tokio::test]
    async fn foreign_token_is_rejected() {
        let state = test_state();
        let token = access_token("some-other-secret", Duration::minutes(15));
        let mut parts = parts_with_header(Some(&format!("Bearer {token}")));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn extension_wallet_is_preferred() {
        let state = test_state();
        let mut parts = parts_with_header(None);
        parts.extensions.insert(AuthenticatedWallet {
            address: WalletAddress("0xfromlayer".into()),
            chain_id: 10,
            expires_at: 0,
        });

        let Auth(wallet) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(wallet.address.0, "0xfromlayer");
        assert_eq!(wallet.chain_id, 10);
    }
}
