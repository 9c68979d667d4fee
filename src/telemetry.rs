// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Orbital Finance

//! Tracing/logging initialization.
//!
//! Output format is selected by `LOG_FORMAT` (`json` for production log
//! shippers, anything else for human-readable output). The filter comes
//! from `RUST_LOG`, defaulting to `info,tower_http=debug`.

use tracing_subscriber::EnvFilter;

use crate::config::LOG_FORMAT_ENV;

/// Default level filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info,tower_http=debug";

/// Install the global tracing subscriber. Call once at startup.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let json = std::env::var(LOG_FORMAT_ENV)
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
