// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Orbital Finance

//! Sign-in message rendering.
//!
//! The message follows the EIP-4361 plaintext layout so browser wallets
//! display it with the familiar "Sign-In With Ethereum" formatting. The
//! exact same string must be rendered at nonce issuance and at
//! verification time; any drift makes signature recovery fail. For that
//! reason the address is always rendered in its canonical lowercase form
//! from the stored record, regardless of how the client cased it.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::config::AuthConfig;
use crate::store::NonceRecord;

/// Render the sign-in message for an issued nonce.
pub fn render(config: &AuthConfig, record: &NonceRecord) -> String {
    format!(
        "{domain} wants you to sign in with your Ethereum account:\n\
         {address}\n\
         \n\
         {statement}\n\
         \n\
         URI: {uri}\n\
         Version: 1\n\
         Chain ID: {chain_id}\n\
         Nonce: {nonce}\n\
         Issued At: {issued_at}\n\
         Expiration Time: {expires_at}",
        domain = config.domain,
        address = record.address,
        statement = config.statement,
        uri = config.uri,
        chain_id = record.chain_id,
        nonce = record.nonce,
        issued_at = timestamp(record.issued_at),
        expires_at = timestamp(record.expires_at),
    )
}

fn timestamp(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}
