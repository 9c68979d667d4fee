// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Orbital Finance

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{
        LogoutRequest, LogoutResponse, MeResponse, NonceRequest, NonceResponse, RefreshRequest,
        RefreshResponse, VerifyRequest, VerifyResponse, WalletAddress,
    },
    state::AppState,
};

pub mod auth;
pub mod health;

pub fn router(state: AppState) -> Router {
    let wallet_routes = Router::new()
        .route("/nonce", post(auth::request_nonce))
        .route("/verify", post(auth::verify_signature))
        .route("/refresh", post(auth::refresh_token))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me));

    let api_routes = Router::new()
        .nest("/api/auth/wallet", wallet_routes)
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    api_routes
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::request_nonce,
        auth::verify_signature,
        auth::refresh_token,
        auth::logout,
        auth::me,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            WalletAddress,
            NonceRequest,
            NonceResponse,
            VerifyRequest,
            VerifyResponse,
            RefreshRequest,
            RefreshResponse,
            LogoutRequest,
            LogoutResponse,
            MeResponse
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Auth", description = "Wallet sign-in and token lifecycle"),
        (name = "Health", description = "Service probes")
    )
)]
struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthConfig;

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let app = router(AppState::in_memory(AuthConfig::with_secret("router-secret")));
        // Ensure the router can be converted into a service without panicking.
        let _ = app.into_make_service();
    }

    #[test]
    fn openapi_doc_includes_bearer_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components present");
        assert!(components.security_schemes.contains_key("bearer"));
    }
}
