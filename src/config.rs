// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Orbital Finance

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values, and the
//! [`AuthConfig`] struct injected into the authentication service at
//! startup. Configuration is loaded from the environment once; tests build
//! their own `AuthConfig` values directly.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `JWT_SECRET` | HS256 signing secret for access/refresh tokens | Required |
//! | `SIWE_DOMAIN` | Domain shown in the sign-in message | `app.orbital.finance` |
//! | `SIWE_URI` | URI shown in the sign-in message | `https://app.orbital.finance` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use chrono::Duration;

/// Environment variable name for the server bind address.
pub const HOST_ENV: &str = "HOST";

/// Environment variable name for the server bind port.
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the JWT signing secret.
///
/// The secret is used for HS256 signing of both access and refresh
/// tokens. It is never logged and never leaves the process.
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";

/// Environment variable name for the sign-in message domain.
pub const SIWE_DOMAIN_ENV: &str = "SIWE_DOMAIN";

/// Environment variable name for the sign-in message URI.
pub const SIWE_URI_ENV: &str = "SIWE_URI";

/// Environment variable name for the logging format (`json` or `pretty`).
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Statement embedded in every sign-in message. Signing it constitutes
/// acceptance of the terms of service.
pub const SIWE_STATEMENT: &str =
    "Sign in to Orbital Finance. By signing this message you accept the Terms of Service.";

/// Configuration for [`WalletAuthService`](crate::auth::WalletAuthService).
///
/// Constructed once at startup via [`AuthConfig::from_env`] and passed to
/// the service constructor. Tests construct their own values with short
/// lifetimes to exercise expiry paths without sleeping.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Domain rendered into the sign-in message.
    pub domain: String,
    /// URI rendered into the sign-in message.
    pub uri: String,
    /// Statement rendered into the sign-in message.
    pub statement: String,
    /// HS256 signing secret for both token kinds.
    pub jwt_secret: String,
    /// How long an issued nonce stays valid.
    pub nonce_ttl: Duration,
    /// Access token lifetime.
    pub access_ttl: Duration,
    /// Refresh token lifetime.
    pub refresh_ttl: Duration,
    /// Maximum requests per wallet address per rate-limit window.
    pub rate_limit_max: u32,
    /// Length of the rate-limit window.
    pub rate_limit_window: Duration,
}

impl AuthConfig {
    /// Load configuration from the environment.
    ///
    /// Fails if `JWT_SECRET` is unset, since tokens signed with an
    /// ephemeral secret would not survive a restart.
    pub fn from_env() -> Result<Self, String> {
        let jwt_secret = std::env::var(JWT_SECRET_ENV)
            .map_err(|_| format!("{JWT_SECRET_ENV} must be set"))?;

        let uri = std::env::var(SIWE_URI_ENV)
            .unwrap_or_else(|_| "https://app.orbital.finance".to_string());
        url::Url::parse(&uri).map_err(|e| format!("{SIWE_URI_ENV} is not a valid URL: {e}"))?;

        Ok(Self {
            domain: std::env::var(SIWE_DOMAIN_ENV)
                .unwrap_or_else(|_| "app.orbital.finance".to_string()),
            uri,
            jwt_secret,
            ..Self::with_secret("")
        })
    }

    /// Build a config with production lifetimes and the given secret.
    ///
    /// Used by `from_env` and by tests that need real token round-trips.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            domain: "app.orbital.finance".to_string(),
            uri: "https://app.orbital.finance".to_string(),
            statement: SIWE_STATEMENT.to_string(),
            jwt_secret: secret.into(),
            nonce_ttl: Duration::minutes(5),
            access_ttl: Duration::minutes(15),
            refresh_ttl: Duration::days(7),
            rate_limit_max: 100,
            rate_limit_window: Duration::hours(1),
        }
    }
}
