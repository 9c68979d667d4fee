// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Orbital Finance

use std::{env, net::SocketAddr, sync::Arc, time::Duration};

use orbital_auth_server::{
    api::router,
    auth::WalletAuthService,
    config::{AuthConfig, HOST_ENV, PORT_ENV},
    state::AppState,
    store::InMemoryAuthStore,
    telemetry,
};

/// How often expired nonces, sessions, and revocations are swept.
const PRUNE_INTERVAL: Duration = Duration::from_secs(600);

#[tokio::main]
async fn main() {
    telemetry::init();

    let config = AuthConfig::from_env().expect("Invalid configuration");
    let service = WalletAuthService::new(config, Arc::new(InMemoryAuthStore::new()));
    let state = AppState::new(service);

    // Expiry is enforced at validation time; the sweeper just keeps the
    // store from accumulating dead records.
    let pruner = state.auth.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PRUNE_INTERVAL);
        loop {
            interval.tick().await;
            if let Err(error) = pruner.prune_expired().await {
                tracing::warn!(%error, "pruning expired auth records failed");
            }
        }
    });

    let app = router(state);

    // Parse bind address
    let host = env::var(HOST_ENV).unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var(PORT_ENV)
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .expect("Failed to parse bind address");

    tracing::info!("Orbital auth server listening on http://{addr} (docs at /docs)");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("HTTP server failed");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("shutdown signal received");
}
