// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Orbital Finance

//! Wallet authentication endpoints.

use axum::{extract::State, Json};

use crate::auth::{Auth, AuthError};
use crate::models::{
    LogoutRequest, LogoutResponse, MeResponse, NonceRequest, NonceResponse, RefreshRequest,
    RefreshResponse, VerifyRequest, VerifyResponse,
};
use crate::state::AppState;

/// Issue a single-use sign-in nonce.
#[utoipa::path(
    post,
    path = "/api/auth/wallet/nonce",
    tag = "Auth",
    request_body = NonceRequest,
    responses(
        (status = 200, description = "Nonce issued", body = NonceResponse),
        (status = 400, description = "Malformed wallet address"),
        (status = 429, description = "Rate limit exceeded"),
    )
)]
pub async fn request_nonce(
    State(state): State<AppState>,
    Json(request): Json<NonceRequest>,
) -> Result<Json<NonceResponse>, AuthError> {
    let response = state.auth.request_nonce(request).await?;
    Ok(Json(response))
}

/// Verify a signed sign-in message and mint a token pair.
#[utoipa::path(
    post,
    path = "/api/auth/wallet/verify",
    tag = "Auth",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Signature verified, tokens minted", body = VerifyResponse),
        (status = 400, description = "Malformed wallet address"),
        (status = 401, description = "Nonce missing/expired or signature mismatch"),
        (status = 429, description = "Rate limit exceeded"),
    )
)]
pub async fn verify_signature(
    State(state): State<AppState>,
    Json(request): Json<VerifyRequest>,
) -> Result<Json<VerifyResponse>, AuthError> {
    let response = state.auth.verify_signature(request).await?;
    Ok(Json(response))
}

/// Mint a new access token against a live refresh token.
#[utoipa::path(
    post,
    path = "/api/auth/wallet/refresh",
    tag = "Auth",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token minted", body = RefreshResponse),
        (status = 401, description = "Refresh token invalid, expired, or revoked"),
    )
)]
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, AuthError> {
    let response = state.auth.refresh_access_token(&request.refresh_token).await?;
    Ok(Json(response))
}

/// Revoke a refresh token, or every session for the wallet.
#[utoipa::path(
    post,
    path = "/api/auth/wallet/logout",
    tag = "Auth",
    security(("bearer" = [])),
    request_body = LogoutRequest,
    responses(
        (status = 200, description = "Session(s) revoked", body = LogoutResponse),
        (status = 401, description = "Missing/invalid bearer token or foreign refresh token"),
    )
)]
pub async fn logout(
    Auth(wallet): Auth,
    State(state): State<AppState>,
    Json(request): Json<LogoutRequest>,
) -> Result<Json<LogoutResponse>, AuthError> {
    let response = state.auth.logout(&wallet, request).await?;
    Ok(Json(response))
}

/// Get the authenticated wallet's sign-in profile.
#[utoipa::path(
    get,
    path = "/api/auth/wallet/me",
    tag = "Auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Wallet profile", body = MeResponse),
        (status = 401, description = "Missing or invalid bearer token"),
    )
)]
pub async fn me(
    Auth(wallet): Auth,
    State(state): State<AppState>,
) -> Result<Json<MeResponse>, AuthError> {
    let response = state.auth.profile(&wallet).await?;
    Ok(Json(response))
}
