// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Orbital Finance

//! The wallet authentication service.
//!
//! [`WalletAuthService`] owns the full sign-in lifecycle: nonce issuance,
//! signature verification, token minting, refresh, revocation, and
//! validation. It is constructed explicitly from an [`AuthConfig`] and an
//! injected [`AuthStore`]; tests build isolated instances with their own
//! in-memory stores and shortened lifetimes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;

use super::claims::{AuthenticatedWallet, TokenCodec};
use super::{message, signature, AuthError};
use crate::config::AuthConfig;
use crate::models::{
    LogoutRequest, LogoutResponse, MeResponse, NonceRequest, NonceResponse, RefreshResponse,
    VerifyRequest, VerifyResponse, WalletAddress,
};
use crate::store::{AuthStore, NonceRecord, NonceTake, SessionRecord};

struct Window {
    started_at: DateTime<Utc>,
    count: u32,
}

/// Fixed-window request counter, keyed by canonical wallet address.
///
/// Process-local: this throttles abusive clients at the door, it is not
/// a distributed quota.
struct RateLimiter {
    max: u32,
    window: Duration,
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    fn new(max: u32, window: Duration) -> Self {
        Self {
            max,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    fn check(&self, key: &str, now: DateTime<Utc>) -> Result<(), AuthError> {
        let mut windows = self
            .windows
            .lock()
            .map_err(|_| AuthError::Internal("rate limiter mutex poisoned".to_string()))?;

        let window = windows.entry(key.to_string()).or_insert(Window {
            started_at: now,
            count: 0,
        });
        if now - window.started_at >= self.window {
            window.started_at = now;
            window.count = 0;
        }
        if window.count >= self.max {
            let retry_after_secs =
                (window.started_at + self.window - now).num_seconds().max(1) as u64;
            return Err(AuthError::RateLimited { retry_after_secs });
        }
        window.count += 1;
        Ok(())
    }

    fn prune(&self, now: DateTime<Utc>) {
        if let Ok(mut windows) = self.windows.lock() {
            windows.retain(|_, window| now - window.started_at < self.window);
        }
    }
}

/// SIWE authentication and JWT session lifecycle.
pub struct WalletAuthService {
    config: AuthConfig,
    store: Arc<dyn AuthStore>,
    codec: TokenCodec,
    rate_limiter: RateLimiter,
}

impl WalletAuthService {
    /// Build a service over an injected store.
    pub fn new(config: AuthConfig, store: Arc<dyn AuthStore>) -> Self {
        let codec = TokenCodec::new(&config.jwt_secret);
        let rate_limiter = RateLimiter::new(config.rate_limit_max, config.rate_limit_window);
        Self {
            config,
            store,
            codec,
            rate_limiter,
        }
    }

    /// Issue a fresh sign-in nonce for `(address, chainId)`.
    ///
    /// Replaces any nonce already outstanding for the same key. The
    /// returned message is exactly what the wallet must sign.
    pub async fn request_nonce(&self, request: NonceRequest) -> Result<NonceResponse, AuthError> {
        request.address.parse()?;
        let address = request.address.canonical();
        let now = Utc::now();
        self.rate_limiter.check(&address, now)?;

        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);

        let record = NonceRecord {
            address: address.clone(),
            chain_id: request.chain_id,
            nonce: hex::encode(bytes),
            issued_at: now,
            expires_at: now + self.config.nonce_ttl,
        };
        let message = message::render(&self.config, &record);
        let response = NonceResponse {
            nonce: record.nonce.clone(),
            message,
            expires_at: record.expires_at,
        };
        self.store.put_nonce(record).await?;

        tracing::debug!(%address, chain_id = request.chain_id, "issued sign-in nonce");
        Ok(response)
    }

    /// Verify a signed sign-in message and mint a token pair.
    ///
    /// The nonce is consumed atomically before signature recovery: under
    /// a race, exactly one caller proceeds and the rest observe
    /// [`AuthError::NonceNotFound`]. A consumed nonce stays consumed even
    /// if the signature then fails to match.
    pub async fn verify_signature(
        &self,
        request: VerifyRequest,
    ) -> Result<VerifyResponse, AuthError> {
        let claimed = request.address.parse()?;
        let address = request.address.canonical();
        let now = Utc::now();
        self.rate_limiter.check(&address, now)?;

        let record = match self
            .store
            .take_nonce(&address, request.chain_id, &request.nonce, now)
            .await?
        {
            NonceTake::NotFound => return Err(AuthError::NonceNotFound),
            NonceTake::Expired => return Err(AuthError::NonceExpired),
            NonceTake::Consumed(record) => record,
        };

        let message = message::render(&self.config, &record);
        let signer = signature::recover_signer(&message, &request.signature)?;
        if signer != claimed {
            tracing::warn!(%address, recovered = %signer, "sign-in signature mismatch");
            return Err(AuthError::SignatureMismatch);
        }

        let profile = self
            .store
            .record_login(&address, request.chain_id, now)
            .await?;

        let access_token =
            self.codec
                .mint_access(&address, request.chain_id, now, self.config.access_ttl)?;
        let (refresh_token, refresh_claims) =
            self.codec
                .mint_refresh(&address, request.chain_id, now, self.config.refresh_ttl)?;

        self.store
            .insert_session(SessionRecord {
                jti: refresh_claims.jti,
                address: address.clone(),
                chain_id: request.chain_id,
                issued_at: now,
                expires_at: now + self.config.refresh_ttl,
            })
            .await?;

        tracing::info!(
            %address,
            chain_id = request.chain_id,
            login_count = profile.login_count,
            "wallet signed in"
        );

        Ok(VerifyResponse {
            access_token,
            refresh_token,
            expires_in: self.config.access_ttl.num_seconds().max(0) as u64,
            address: WalletAddress(address),
            chain_id: request.chain_id,
        })
    }

    /// Mint a new access token against a live refresh token.
    ///
    /// The refresh token itself is not rotated; it stays valid until its
    /// natural expiry or revocation.
    pub async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<RefreshResponse, AuthError> {
        let claims = self.codec.decode_refresh(refresh_token, true)?;
        if self.store.is_revoked(&claims.jti).await? {
            return Err(AuthError::TokenRevoked);
        }

        let now = Utc::now();
        let access_token =
            self.codec
                .mint_access(&claims.address, claims.chain_id, now, self.config.access_ttl)?;

        tracing::debug!(address = %claims.address, "access token refreshed");
        Ok(RefreshResponse {
            access_token,
            expires_in: self.config.access_ttl.num_seconds().max(0) as u64,
        })
    }

    /// Revoke a refresh token, or every live session for the wallet.
    ///
    /// Idempotent: revoking an already-revoked or expired token still
    /// succeeds. The bearer may only revoke their own sessions.
    pub async fn logout(
        &self,
        wallet: &AuthenticatedWallet,
        request: LogoutRequest,
    ) -> Result<LogoutResponse, AuthError> {
        // Expiry is not enforced here; tearing down a dead session is fine.
        let claims = self.codec.decode_refresh(&request.refresh_token, false)?;
        if claims.address != wallet.address.canonical() {
            return Err(AuthError::InvalidToken);
        }

        let now = Utc::now();
        let expires_at = DateTime::<Utc>::from_timestamp(claims.exp, 0)
            .unwrap_or_else(|| now + self.config.refresh_ttl);
        self.store.revoke(&claims.jti, expires_at).await?;

        if request.logout_all {
            let revoked = self
                .store
                .revoke_all_for_address(&claims.address, now)
                .await?;
            tracing::info!(address = %claims.address, revoked, "logged out all sessions");
        } else {
            tracing::info!(address = %claims.address, "logged out");
        }

        Ok(LogoutResponse { success: true })
    }

    /// Validate an access token and return the wallet it authenticates.
    ///
    /// Never consults the revocation set: access tokens are short-lived
    /// and only their parent refresh token is revocable.
    pub fn validate_access_token(&self, token: &str) -> Result<AuthenticatedWallet, AuthError> {
        let claims = self.codec.decode_access(token)?;
        Ok(claims.into())
    }

    /// Fetch the sign-in profile behind a validated access token.
    pub async fn profile(&self, wallet: &AuthenticatedWallet) -> Result<MeResponse, AuthError> {
        let profile = self
            .store
            .profile(&wallet.address.canonical(), wallet.chain_id)
            .await?
            // A valid token whose profile is gone means the backing store
            // lost the session state; force a fresh sign-in.
            .ok_or(AuthError::InvalidToken)?;

        Ok(MeResponse {
            address: WalletAddress(profile.address),
            chain_id: profile.chain_id,
            login_count: profile.login_count,
            last_login: profile.last_login,
        })
    }

    /// Drop expired nonces, sessions, revocations, and rate windows.
    pub async fn prune_expired(&self) -> Result<u64, AuthError> {
        let now = Utc::now();
        self.rate_limiter.prune(now);
        let removed = self.store.prune_expired(now).await?;
        if removed > 0 {
            tracing::debug!(removed, "pruned expired auth records");
        }
        Ok(removed)
    }
}
