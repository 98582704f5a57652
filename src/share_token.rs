//! Governs the lifecycle of report share tokens: issuance, validation,
//! and revocation. The manager never transports or serves report bytes
//! itself -- it only answers whether a given token may be honored right
//! now.

use std::collections::HashMap;
use std::sync::Mutex;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::{ShareTokenError, ShareTokenResult};

const TOKEN_VALIDITY_DAYS: i64 = 30;
const TOKEN_BYTES: usize = 32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareToken {
    pub token: String,
    pub report_id: Uuid,
    pub borrower_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub access_count: u64,
    pub last_accessed_at: Option<DateTime<Utc>>,
    pub last_accessed_ip: Option<String>,
}

/// Storage seam for [`ShareToken`] state. Implementations must provide
/// at least per-token serializability between `compare_and_swap` and
/// `remove` -- see the concurrency note on [`ShareTokenManager::validate`].
pub trait ShareTokenStore: Send + Sync {
    fn get(&self, token: &str) -> Option<ShareToken>;
    fn insert_if_absent(&self, entry: ShareToken) -> ShareTokenResult<()>;
    /// Replaces the stored value for `token` only if the currently
    /// stored `access_count` equals `expected_access_count`. Returns
    /// `false` on mismatch (the caller should re-read and retry).
    fn compare_and_swap(&self, token: &str, expected_access_count: u64, updated: ShareToken) -> bool;
    fn remove(&self, token: &str);
}

/// `Mutex<HashMap<..>>`-backed reference store. Fine for a single
/// process; a production deployment would swap in a shared backing
/// store behind the same trait.
#[derive(Debug, Default)]
pub struct InMemoryShareTokenStore {
    tokens: Mutex<HashMap<String, ShareToken>>,
}

impl InMemoryShareTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ShareTokenStore for InMemoryShareTokenStore {
    fn get(&self, token: &str) -> Option<ShareToken> {
        self.tokens.lock().unwrap().get(token).cloned()
    }

    fn insert_if_absent(&self, entry: ShareToken) -> ShareTokenResult<()> {
        let mut guard = self.tokens.lock().unwrap();
        if guard.contains_key(&entry.token) {
            return Err(ShareTokenError::Collision);
        }
        guard.insert(entry.token.clone(), entry);
        Ok(())
    }

    fn compare_and_swap(&self, token: &str, expected_access_count: u64, updated: ShareToken) -> bool {
        let mut guard = self.tokens.lock().unwrap();
        match guard.get(token) {
            Some(existing) if existing.access_count == expected_access_count => {
                guard.insert(token.to_string(), updated);
                true
            }
            _ => false,
        }
    }

    fn remove(&self, token: &str) {
        self.tokens.lock().unwrap().remove(token);
    }
}

pub struct ShareTokenManager<S: ShareTokenStore, C: Clock> {
    store: S,
    clock: C,
}

impl<S: ShareTokenStore, C: Clock> ShareTokenManager<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    pub fn issue(&self, report_id: Uuid, borrower_id: &str) -> ShareTokenResult<ShareToken> {
        let now = self.clock.now();
        let entry = ShareToken {
            token: generate_token(),
            report_id,
            borrower_id: borrower_id.to_string(),
            created_at: now,
            expires_at: now + Duration::days(TOKEN_VALIDITY_DAYS),
            revoked: false,
            access_count: 0,
            last_accessed_at: None,
            last_accessed_ip: None,
        };
        self.store.insert_if_absent(entry.clone())?;
        log::info!("issued share token for report {report_id}");
        Ok(entry)
    }

    /// Returns `true` iff the token is known, not revoked, and not
    /// expired. On success, atomically increments `access_count` and
    /// records the access via compare-and-swap so a concurrent
    /// `revoke` linearizes cleanly against this read-modify-write.
    pub fn validate(&self, token: &str, accessor_ip: &str) -> bool {
        loop {
            let Some(existing) = self.store.get(token) else {
                return false;
            };
            if existing.revoked {
                log::debug!("validate rejected: token for report {} is revoked", existing.report_id);
                return false;
            }
            if self.clock.now() >= existing.expires_at {
                log::debug!("validate rejected: token for report {} expired at {}", existing.report_id, existing.expires_at);
                return false;
            }
            let mut updated = existing.clone();
            updated.access_count += 1;
            updated.last_accessed_at = Some(self.clock.now());
            updated.last_accessed_ip = Some(accessor_ip.to_string());
            if self.store.compare_and_swap(token, existing.access_count, updated) {
                return true;
            }
            // Lost the race against a concurrent validate/revoke; retry.
        }
    }

    pub fn revoke(&self, token: &str) -> ShareTokenResult<()> {
        loop {
            let existing = self.store.get(token).ok_or(ShareTokenError::NotFound)?;
            if existing.revoked {
                return Ok(());
            }
            let mut updated = existing.clone();
            updated.revoked = true;
            if self.store.compare_and_swap(token, existing.access_count, updated) {
                log::info!("revoked share token for report {}", existing.report_id);
                return Ok(());
            }
        }
    }
}

fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
