// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Orbital Finance

//! JWT claims and the token encode/decode boundary.
//!
//! Both token kinds are HS256-signed JWTs carrying an explicit
//! `tokenType` claim so an access token can never be replayed as a
//! refresh token or vice versa. All claim payloads are named structs;
//! nothing is built from ad hoc JSON.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AuthError;
use crate::models::WalletAddress;

/// `tokenType` claim value for access tokens.
pub const TOKEN_TYPE_ACCESS: &str = "access";

/// `tokenType` claim value for refresh tokens.
pub const TOKEN_TYPE_REFRESH: &str = "refresh";

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccessClaims {
    /// Wallet address the token authenticates (canonical lowercase).
    pub address: String,
    /// Chain ID the session is scoped to.
    pub chain_id: u64,
    /// Issued-at timestamp (Unix seconds).
    pub iat: i64,
    /// Expiration timestamp (Unix seconds).
    pub exp: i64,
    /// Always `"access"`.
    pub token_type: String,
}

/// Claims carried by a refresh token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RefreshClaims {
    /// Wallet address the token belongs to (canonical lowercase).
    pub address: String,
    /// Chain ID the session is scoped to.
    pub chain_id: u64,
    /// Unique token id; the unit of revocation.
    pub jti: String,
    /// Issued-at timestamp (Unix seconds).
    pub iat: i64,
    /// Expiration timestamp (Unix seconds).
    pub exp: i64,
    /// Always `"refresh"`.
    pub token_type: String,
}

/// The authenticated wallet behind a validated access token.
///
/// This is the type handlers receive from the [`Auth`](super::Auth)
/// extractor.
#[derive(Debug, Clone)]
pub struct AuthenticatedWallet {
    /// The wallet address (canonical lowercase).
    pub address: WalletAddress,
    /// Chain ID the session is scoped to.
    pub chain_id: u64,
    /// Token expiration (Unix seconds).
    pub expires_at: i64,
}

impl From<AccessClaims> for AuthenticatedWallet {
    fn from(claims: AccessClaims) -> Self {
        Self {
            address: WalletAddress(claims.address),
            chain_id: claims.chain_id,
            expires_at: claims.exp,
        }
    }
}

/// HS256 encoder/decoder for both token kinds.
///
/// Expiry is enforced with zero leeway: a token is rejected from its
/// `exp` claim onward.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenCodec {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Mint an access token for a wallet.
    pub fn mint_access(
        &self,
        address: &str,
        chain_id: u64,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<String, AuthError> {
        let claims = AccessClaims {
            address: address.to_string(),
            chain_id,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            token_type: TOKEN_TYPE_ACCESS.to_string(),
        };
        self.encode_claims(&claims)
    }

    /// Mint a refresh token for a wallet, returning the token and its
    /// claims (the caller records the `jti` as a session).
    pub fn mint_refresh(
        &self,
        address: &str,
        chain_id: u64,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<(String, RefreshClaims), AuthError> {
        let claims = RefreshClaims {
            address: address.to_string(),
            chain_id,
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            token_type: TOKEN_TYPE_REFRESH.to_string(),
        };
        let token = self.encode_claims(&claims)?;
        Ok((token, claims))
    }

    /// Decode and validate an access token.
    pub fn decode_access(&self, token: &str) -> Result<AccessClaims, AuthError> {
        let claims: AccessClaims = self.decode_claims(token, true)?;
        if claims.token_type != TOKEN_TYPE_ACCESS {
            return Err(AuthError::InvalidToken);
        }
        Ok(claims)
    }

    /// Decode and validate a refresh token.
    ///
    /// `enforce_expiry` is disabled during logout so an expired token can
    /// still be torn down idempotently.
    pub fn decode_refresh(
        &self,
        token: &str,
        enforce_expiry: bool,
    ) -> Result<RefreshClaims, AuthError> {
        let claims: RefreshClaims = self.decode_claims(token, enforce_expiry)?;
        if claims.token_type != TOKEN_TYPE_REFRESH {
            return Err(AuthError::InvalidToken);
        }
        Ok(claims)
    }

    fn encode_claims<T: Serialize>(&self, claims: &T) -> Result<String, AuthError> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("token encoding failed: {e}")))
    }

    fn decode_claims<T: serde::de::DeserializeOwned>(
        &self,
        token: &str,
        enforce_expiry: bool,
    ) -> Result<T, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = enforce_expiry;
        if !enforce_expiry {
            validation.required_spec_claims.clear();
        }

        let token_data = decode::<T>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            }
        })?;
        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new("test-secret")
    }

    const ADDR: &str = "0x742d35cc6634c0532925a3b844bc9e7595f4ab12";

    #[test]
    fn access_token_round_trips() {
        let now = Utc::now();
        let token = codec()
            .mint_access(ADDR, 1, now, Duration::minutes(15))
            .unwrap();

        let claims = codec().decode_access(&token).unwrap();
        assert_eq!(claims.address, ADDR);
        assert_eq!(claims.chain_id, 1);
        assert_eq!(claims.token_type, TOKEN_TYPE_ACCESS);
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn refresh_token_round_trips_with_unique_jti() {
        let now = Utc::now();
        let (token_a, claims_a) = codec()
            .mint_refresh(ADDR, 1, now, Duration::days(7))
            .unwrap();
        let (_, claims_b) = codec()
            .mint_refresh(ADDR, 1, now, Duration::days(7))
            .unwrap();
        assert_ne!(claims_a.jti, claims_b.jti);

        let decoded = codec().decode_refresh(&token_a, true).unwrap();
        assert_eq!(decoded, claims_a);
    }

    #[test]
    fn expired_access_token_is_rejected() {
        let past = Utc::now() - Duration::hours(2);
        let token = codec()
            .mint_access(ADDR, 1, past, Duration::minutes(15))
            .unwrap();

        let err = codec().decode_access(&token).unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired));
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let now = Utc::now();
        let (refresh, _) = codec()
            .mint_refresh(ADDR, 1, now, Duration::days(7))
            .unwrap();

        let err = codec().decode_access(&refresh).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }

    #[test]
    fn access_token_is_not_a_refresh_token() {
        let now = Utc::now();
        let access = codec()
            .mint_access(ADDR, 1, now, Duration::minutes(15))
            .unwrap();

        let err = codec().decode_refresh(&access, true).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let now = Utc::now();
        let token = codec()
            .mint_access(ADDR, 1, now, Duration::minutes(15))
            .unwrap();

        let other = TokenCodec::new("other-secret");
        let err = other.decode_access(&token).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }

    #[test]
    fn garbage_is_invalid_token() {
        let err = codec().decode_access("not.a.jwt").unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));

        let err = codec().decode_refresh("", true).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }

    #[test]
    fn expired_refresh_token_decodes_when_expiry_not_enforced() {
        let past = Utc::now() - Duration::days(30);
        let (token, claims) = codec()
            .mint_refresh(ADDR, 1, past, Duration::days(7))
            .unwrap();

        let err = codec().decode_refresh(&token, true).unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired));

        let decoded = codec().decode_refresh(&token, false).unwrap();
        assert_eq!(decoded.jti, claims.jti);
    }

    #[test]
    fn tampered_payload_is_rejected() {
        use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

        let now = Utc::now();
        let token = codec()
            .mint_access(ADDR, 1, now, Duration::minutes(15))
            .unwrap();
        let parts: Vec<&str> = token.split('.').collect();

        let payload = URL_SAFE_NO_PAD.decode(parts[1]).unwrap();
        let mut claims: serde_json::Value = serde_json::from_slice(&payload).unwrap();
        claims["address"] = serde_json::Value::String("0xattacker".into());
        let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap());

        let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);
        let err = codec().decode_access(&forged).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }

    #[test]
    fn three_segment_wire_format() {
        let now = Utc::now();
        let token = codec()
            .mint_access(ADDR, 1, now, Duration::minutes(15))
            .unwrap();
        assert_eq!(token.split('.').count(), 3);
    }
}
