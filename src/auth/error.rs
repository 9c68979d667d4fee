// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Orbital Finance

//! Authentication errors.

use axum::{
    http::{header::RETRY_AFTER, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Authentication error type.
///
/// Every failure in the sign-in, refresh, and validation flows maps to
/// one of these variants. Each carries a stable machine-readable code and
/// an HTTP status; nothing is silently recovered.
#[derive(Debug)]
pub enum AuthError {
    /// The supplied address is not a well-formed EVM address
    InvalidAddress,
    /// No matching nonce is outstanding for the address/chain pair
    NonceNotFound,
    /// The nonce existed but its 5-minute window has passed
    NonceExpired,
    /// The signature does not recover to the claimed address
    SignatureMismatch,
    /// Token is malformed, carries a bad signature, or is the wrong kind
    InvalidToken,
    /// Token is past its expiry claim
    TokenExpired,
    /// Refresh token is present in the revocation set
    TokenRevoked,
    /// No authorization header present
    MissingAuthHeader,
    /// Invalid authorization header format
    InvalidAuthHeader,
    /// The per-address request budget is exhausted
    RateLimited {
        /// Seconds until the current window resets.
        retry_after_secs: u64,
    },
    /// Store backend failure
    Internal(String),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthErrorBody {
    error: String,
    error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_after: Option<u64>,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::InvalidAddress => "invalid_address",
            AuthError::NonceNotFound => "nonce_not_found",
            AuthError::NonceExpired => "nonce_expired",
            AuthError::SignatureMismatch => "signature_mismatch",
            AuthError::InvalidToken => "invalid_token",
            AuthError::TokenExpired => "token_expired",
            AuthError::TokenRevoked => "token_revoked",
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::RateLimited { .. } => "rate_limited",
            AuthError::Internal(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidAddress => StatusCode::BAD_REQUEST,
            AuthError::NonceNotFound
            | AuthError::NonceExpired
            | AuthError::SignatureMismatch
            | AuthError::InvalidToken
            | AuthError::TokenExpired
            | AuthError::TokenRevoked
            | AuthError::MissingAuthHeader
            | AuthError::InvalidAuthHeader => StatusCode::UNAUTHORIZED,
            AuthError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::InvalidAddress => {
                write!(f, "Address is not a well-formed EVM address")
            }
            AuthError::NonceNotFound => {
                write!(f, "No sign-in nonce is outstanding for this wallet")
            }
            AuthError::NonceExpired => write!(f, "Sign-in nonce has expired"),
            AuthError::SignatureMismatch => {
                write!(f, "Signature does not match the claimed address")
            }
            AuthError::InvalidToken => write!(f, "Token is invalid"),
            AuthError::TokenExpired => write!(f, "Token has expired"),
            AuthError::TokenRevoked => write!(f, "Token has been revoked"),
            AuthError::MissingAuthHeader => write!(f, "Authorization header is required"),
            AuthError::InvalidAuthHeader => {
                write!(f, "Invalid authorization header format (expected 'Bearer <token>')")
            }
            AuthError::RateLimited { retry_after_secs } => {
                write!(f, "Rate limit exceeded, retry in {retry_after_secs}s")
            }
            AuthError::Internal(msg) => write!(f, "Internal authentication error: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<crate::store::StoreError> for AuthError {
    fn from(err: crate::store::StoreError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let retry_after = match &self {
            AuthError::RateLimited { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        };
        let body = Json(AuthErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
            retry_after,
        });

        let mut response = (status, body).into_response();
        if let Some(secs) = retry_after {
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(RETRY_AFTER, value);
            }
        }
        response
    }
}
