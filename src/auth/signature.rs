// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Orbital Finance

//! EIP-191 signature recovery.
//!
//! Browser wallets sign the sign-in message with `personal_sign`, which
//! prefixes the payload with `"\x19Ethereum Signed Message:\n" + len`
//! before hashing. Recovery reverses that to obtain the signer address;
//! the caller compares it against the claimed address.

use alloy::primitives::{Address, Signature};

use super::AuthError;

/// Recover the signer of an EIP-191 `personal_sign` signature.
///
/// `signature` is the 65-byte hex string returned by the wallet
/// extension (with or without `0x` prefix). Any parse or recovery
/// failure is reported as [`AuthError::SignatureMismatch`]; a garbled
/// signature is indistinguishable from a wrong one.
pub fn recover_signer(message: &str, signature: &str) -> Result<Address, AuthError> {
    let raw = signature.strip_prefix("0x").unwrap_or(signature);
    let bytes = hex::decode(raw).map_err(|_| AuthError::SignatureMismatch)?;

    let signature =
        Signature::try_from(bytes.as_slice()).map_err(|_| AuthError::SignatureMismatch)?;

    signature
        .recover_address_from_msg(message.as_bytes())
        .map_err(|_| AuthError::SignatureMismatch)
}
