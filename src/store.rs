// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Orbital Finance

//! Storage seam for authentication state.
//!
//! The service owns no shared mutable state directly; everything mutable
//! (nonces, sessions, the revocation set, wallet profiles) lives behind
//! the [`AuthStore`] trait so it can be backed by any key-value engine.
//! [`InMemoryAuthStore`] is the default backend and the one used in tests.
//!
//! Nonce consumption is a single atomic compare-and-delete
//! ([`AuthStore::take_nonce`]): under concurrent verification attempts for
//! the same key, exactly one caller receives the record and every other
//! caller observes `NotFound`.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend itself failed (I/O, poisoned lock, remote engine).
    #[error("store backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A nonce issued to a wallet, pending signature verification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NonceRecord {
    /// Canonical (lowercase) wallet address.
    pub address: String,
    /// Chain ID the nonce is bound to.
    pub chain_id: u64,
    /// The random nonce value (64 hex characters).
    pub nonce: String,
    /// When the nonce was issued.
    pub issued_at: DateTime<Utc>,
    /// When the nonce stops being accepted.
    pub expires_at: DateTime<Utc>,
}

/// A minted refresh token, tracked until expiry so logout-all can find it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionRecord {
    /// The refresh token's `jti` claim.
    pub jti: String,
    /// Canonical (lowercase) wallet address.
    pub address: String,
    /// Chain ID the session is scoped to.
    pub chain_id: u64,
    /// When the refresh token was minted.
    pub issued_at: DateTime<Utc>,
    /// When the refresh token naturally expires.
    pub expires_at: DateTime<Utc>,
}

/// Per-wallet sign-in statistics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WalletProfile {
    /// Canonical (lowercase) wallet address.
    pub address: String,
    /// Chain ID the profile is scoped to.
    pub chain_id: u64,
    /// Number of successful sign-ins.
    pub login_count: u64,
    /// Timestamp of the most recent sign-in.
    pub last_login: DateTime<Utc>,
}

/// Outcome of an atomic nonce take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NonceTake {
    /// No nonce stored for the key, or the stored value does not match.
    NotFound,
    /// A matching nonce existed but its expiry has passed; it was removed.
    Expired,
    /// The matching, live nonce; it was removed from the store.
    Consumed(NonceRecord),
}

/// Storage interface for authentication state.
///
/// Implementations must make each method atomic with respect to the keys
/// it touches; no method spans multiple keys transactionally.
#[async_trait]
pub trait AuthStore: Send + Sync {
    /// Store a nonce, replacing any previous nonce for the same key.
    async fn put_nonce(&self, record: NonceRecord) -> StoreResult<()>;

    /// Atomically consume the nonce for `(address, chain_id)` if its value
    /// matches `nonce`.
    ///
    /// A value mismatch leaves the stored nonce in place and reports
    /// `NotFound`; an expired match is removed and reported as `Expired`.
    async fn take_nonce(
        &self,
        address: &str,
        chain_id: u64,
        nonce: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<NonceTake>;

    /// Record a freshly minted refresh token.
    async fn insert_session(&self, session: SessionRecord) -> StoreResult<()>;

    /// Add a refresh token id to the revocation set. Idempotent.
    async fn revoke(&self, jti: &str, expires_at: DateTime<Utc>) -> StoreResult<()>;

    /// Revoke every live session for an address, returning how many were
    /// newly revoked.
    async fn revoke_all_for_address(&self, address: &str, now: DateTime<Utc>)
        -> StoreResult<u64>;

    /// Whether a refresh token id is in the revocation set.
    async fn is_revoked(&self, jti: &str) -> StoreResult<bool>;

    /// Bump the login counter and last-login timestamp for a wallet.
    async fn record_login(
        &self,
        address: &str,
        chain_id: u64,
        now: DateTime<Utc>,
    ) -> StoreResult<WalletProfile>;

    /// Fetch a wallet's profile, if it has ever signed in.
    async fn profile(&self, address: &str, chain_id: u64) -> StoreResult<Option<WalletProfile>>;

    /// Drop expired nonces, sessions, and revocation entries.
    ///
    /// Returns the number of records removed. Safe to call at any time;
    /// also run periodically by the server's pruning task.
    async fn prune_expired(&self, now: DateTime<Utc>) -> StoreResult<u64>;
}

#[derive(Default)]
struct Inner {
    nonces: HashMap<(String, u64), NonceRecord>,
    sessions: HashMap<String, SessionRecord>,
    revoked: HashMap<String, DateTime<Utc>>,
    profiles: HashMap<(String, u64), WalletProfile>,
}

/// In-memory store backend.
///
/// A single mutex guards all maps, which makes every trait method a
/// single critical section; in particular `take_nonce` is an atomic
/// compare-and-delete.
#[derive(Default)]
pub struct InMemoryAuthStore {
    inner: Mutex<Inner>,
}

impl InMemoryAuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<std::sync::MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Backend("store mutex poisoned".to_string()))
    }
}

#[async_trait]
impl AuthStore for InMemoryAuthStore {
    async fn put_nonce(&self, record: NonceRecord) -> StoreResult<()> {
        let mut inner = self.lock()?;
        inner
            .nonces
            .insert((record.address.clone(), record.chain_id), record);
        Ok(())
    }

    async fn take_nonce(
        &self,
        address: &str,
        chain_id: u64,
        nonce: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<NonceTake> {
        let mut inner = self.lock()?;
        let key = (address.to_string(), chain_id);

        let Some(record) = inner.nonces.remove(&key) else {
            return Ok(NonceTake::NotFound);
        };
        if record.nonce != nonce {
            // A different nonce is outstanding; leave it in place.
            inner.nonces.insert(key, record);
            return Ok(NonceTake::NotFound);
        }
        if record.expires_at <= now {
            return Ok(NonceTake::Expired);
        }
        Ok(NonceTake::Consumed(record))
    }

    async fn insert_session(&self, session: SessionRecord) -> StoreResult<()> {
        let mut inner = self.lock()?;
        inner.sessions.insert(session.jti.clone(), session);
        Ok(())
    }

    async fn revoke(&self, jti: &str, expires_at: DateTime<Utc>) -> StoreResult<()> {
        let mut inner = self.lock()?;
        inner.revoked.entry(jti.to_string()).or_insert(expires_at);
        Ok(())
    }

    async fn revoke_all_for_address(
        &self,
        address: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<u64> {
        let mut inner = self.lock()?;
        let live: Vec<(String, DateTime<Utc>)> = inner
            .sessions
            .values()
            .filter(|session| session.address == address && session.expires_at > now)
            .map(|session| (session.jti.clone(), session.expires_at))
            .collect();

        let mut newly_revoked = 0;
        for (jti, expires_at) in live {
            if !inner.revoked.contains_key(&jti) {
                inner.revoked.insert(jti, expires_at);
                newly_revoked += 1;
            }
        }
        Ok(newly_revoked)
    }

    async fn is_revoked(&self, jti: &str) -> StoreResult<bool> {
        let inner = self.lock()?;
        Ok(inner.revoked.contains_key(jti))
    }

    async fn record_login(
        &self,
        address: &str,
        chain_id: u64,
        now: DateTime<Utc>,
    ) -> StoreResult<WalletProfile> {
        let mut inner = self.lock()?;
        let profile = inner
            .profiles
            .entry((address.to_string(), chain_id))
            .and_modify(|profile| {
                profile.login_count += 1;
                profile.last_login = now;
            })
            .or_insert_with(|| WalletProfile {
                address: address.to_string(),
                chain_id,
                login_count: 1,
                last_login: now,
            });
        Ok(profile.clone())
    }

    async fn profile(&self, address: &str, chain_id: u64) -> StoreResult<Option<WalletProfile>> {
        let inner = self.lock()?;
        Ok(inner.profiles.get(&(address.to_string(), chain_id)).cloned())
    }

    async fn prune_expired(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let mut inner = self.lock()?;
        let mut removed = 0u64;

        let before = inner.nonces.len();
        inner.nonces.retain(|_, record| record.expires_at > now);
        removed += (before - inner.nonces.len()) as u64;

        let before = inner.sessions.len();
        inner.sessions.retain(|_, session| session.expires_at > now);
        removed += (before - inner.sessions.len()) as u64;

        let before = inner.revoked.len();
        inner.revoked.retain(|_, expires_at| *expires_at > now);
        removed += (before - inner.revoked.len()) as u64;

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn nonce_record(address: &str, chain_id: u64, nonce: &str, now: DateTime<Utc>) -> NonceRecord {
        NonceRecord {
            address: address.to_string(),
            chain_id,
            nonce: nonce.to_string(),
            issued_at: now,
            expires_at: now + Duration::minutes(5),
        }
    }

    fn session_record(jti: &str, address: &str, now: DateTime<Utc>) -> SessionRecord {
        SessionRecord {
            jti: jti.to_string(),
            address: address.to_string(),
            chain_id: 1,
            issued_at: now,
            expires_at: now + Duration::days(7),
        }
    }

    #[tokio::test]
    async fn take_nonce_consumes_exactly_once() {
        let store = InMemoryAuthStore::new();
        let now = Utc::now();
        store
            .put_nonce(nonce_record("0xaaa", 1, "abc123", now))
            .await
            .unwrap();

        let first = store.take_nonce("0xaaa", 1, "abc123", now).await.unwrap();
        assert!(matches!(first, NonceTake::Consumed(_)));

        let second = store.take_nonce("0xaaa", 1, "abc123", now).await.unwrap();
        assert_eq!(second, NonceTake::NotFound);
    }

    #[tokio::test]
    async fn take_nonce_value_mismatch_leaves_stored_nonce() {
        let store = InMemoryAuthStore::new();
        let now = Utc::now();
        store
            .put_nonce(nonce_record("0xaaa", 1, "real", now))
            .await
            .unwrap();

        let miss = store.take_nonce("0xaaa", 1, "guess", now).await.unwrap();
        assert_eq!(miss, NonceTake::NotFound);

        // The real nonce is still consumable.
        let hit = store.take_nonce("0xaaa", 1, "real", now).await.unwrap();
        assert!(matches!(hit, NonceTake::Consumed(_)));
    }

    #[tokio::test]
    async fn take_nonce_reports_expiry() {
        let store = InMemoryAuthStore::new();
        let now = Utc::now();
        let mut record = nonce_record("0xaaa", 1, "abc123", now);
        record.expires_at = now - Duration::seconds(1);
        store.put_nonce(record).await.unwrap();

        let taken = store.take_nonce("0xaaa", 1, "abc123", now).await.unwrap();
        assert_eq!(taken, NonceTake::Expired);

        // Expired take also removes the record.
        let again = store.take_nonce("0xaaa", 1, "abc123", now).await.unwrap();
        assert_eq!(again, NonceTake::NotFound);
    }

    #[tokio::test]
    async fn take_nonce_is_scoped_to_chain_id() {
        let store = InMemoryAuthStore::new();
        let now = Utc::now();
        store
            .put_nonce(nonce_record("0xaaa", 1, "abc123", now))
            .await
            .unwrap();

        let wrong_chain = store.take_nonce("0xaaa", 5, "abc123", now).await.unwrap();
        assert_eq!(wrong_chain, NonceTake::NotFound);
    }

    #[tokio::test]
    async fn put_nonce_replaces_previous() {
        let store = InMemoryAuthStore::new();
        let now = Utc::now();
        store
            .put_nonce(nonce_record("0xaaa", 1, "old", now))
            .await
            .unwrap();
        store
            .put_nonce(nonce_record("0xaaa", 1, "new", now))
            .await
            .unwrap();

        let old = store.take_nonce("0xaaa", 1, "old", now).await.unwrap();
        assert_eq!(old, NonceTake::NotFound);
        let new = store.take_nonce("0xaaa", 1, "new", now).await.unwrap();
        assert!(matches!(new, NonceTake::Consumed(_)));
    }

    #[tokio::test]
    async fn revoke_is_idempotent() {
        let store = InMemoryAuthStore::new();
        let now = Utc::now();
        store.revoke("jti-1", now + Duration::days(7)).await.unwrap();
        store.revoke("jti-1", now + Duration::days(7)).await.unwrap();
        assert!(store.is_revoked("jti-1").await.unwrap());
        assert!(!store.is_revoked("jti-2").await.unwrap());
    }

    #[tokio::test]
    async fn revoke_all_only_touches_one_address() {
        let store = InMemoryAuthStore::new();
        let now = Utc::now();
        store.insert_session(session_record("a1", "0xaaa", now)).await.unwrap();
        store.insert_session(session_record("a2", "0xaaa", now)).await.unwrap();
        store.insert_session(session_record("b1", "0xbbb", now)).await.unwrap();

        let revoked = store.revoke_all_for_address("0xaaa", now).await.unwrap();
        assert_eq!(revoked, 2);
        assert!(store.is_revoked("a1").await.unwrap());
        assert!(store.is_revoked("a2").await.unwrap());
        assert!(!store.is_revoked("b1").await.unwrap());
    }

    #[tokio::test]
    async fn revoke_all_skips_expired_and_already_revoked() {
        let store = InMemoryAuthStore::new();
        let now = Utc::now();
        let mut stale = session_record("stale", "0xaaa", now);
        stale.expires_at = now - Duration::seconds(1);
        store.insert_session(stale).await.unwrap();
        store.insert_session(session_record("live", "0xaaa", now)).await.unwrap();
        store.revoke("live", now + Duration::days(7)).await.unwrap();

        let revoked = store.revoke_all_for_address("0xaaa", now).await.unwrap();
        assert_eq!(revoked, 0);
        assert!(!store.is_revoked("stale").await.unwrap());
    }

    #[tokio::test]
    async fn record_login_counts_and_stamps() {
        let store = InMemoryAuthStore::new();
        let first = Utc::now();
        let second = first + Duration::minutes(10);

        let profile = store.record_login("0xaaa", 1, first).await.unwrap();
        assert_eq!(profile.login_count, 1);
        assert_eq!(profile.last_login, first);

        let profile = store.record_login("0xaaa", 1, second).await.unwrap();
        assert_eq!(profile.login_count, 2);
        assert_eq!(profile.last_login, second);

        let fetched = store.profile("0xaaa", 1).await.unwrap().unwrap();
        assert_eq!(fetched, profile);
        assert!(store.profile("0xbbb", 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn prune_removes_only_expired_records() {
        let store = InMemoryAuthStore::new();
        let now = Utc::now();

        let mut dead_nonce = nonce_record("0xaaa", 1, "dead", now);
        dead_nonce.expires_at = now - Duration::seconds(1);
        store.put_nonce(dead_nonce).await.unwrap();
        store.put_nonce(nonce_record("0xbbb", 1, "live", now)).await.unwrap();

        let mut dead_session = session_record("dead", "0xaaa", now);
        dead_session.expires_at = now - Duration::seconds(1);
        store.insert_session(dead_session).await.unwrap();
        store.insert_session(session_record("live", "0xbbb", now)).await.unwrap();

        store.revoke("gone", now - Duration::seconds(1)).await.unwrap();
        store.revoke("kept", now + Duration::days(1)).await.unwrap();

        let removed = store.prune_expired(now).await.unwrap();
        assert_eq!(removed, 3);

        assert!(matches!(
            store.take_nonce("0xbbb", 1, "live", now).await.unwrap(),
            NonceTake::Consumed(_)
        ));
        assert!(!store.is_revoked("gone").await.unwrap());
        assert!(store.is_revoked("kept").await.unwrap());
    }
}
