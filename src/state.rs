// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Orbital Finance

use std::sync::Arc;

use crate::auth::WalletAuthService;
use crate::config::AuthConfig;
use crate::store::InMemoryAuthStore;

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<WalletAuthService>,
}

impl AppState {
    pub fn new(auth: WalletAuthService) -> Self {
        Self {
            auth: Arc::new(auth),
        }
    }

    /// State over a fresh in-memory store; used by tests.
    pub fn in_memory(config: AuthConfig) -> Self {
        Self::new(WalletAuthService::new(
            config,
            Arc::new(InMemoryAuthStore::new()),
        ))
    }
}
