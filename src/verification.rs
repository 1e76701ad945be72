// ABOUTME: One-time verification code issuance, storage, and validation
// ABOUTME: In-memory TTL store plus the delivery seam for email/SMS channels
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fitplan Labs

//! One-time verification codes
//!
//! Registration and password reset are confirmed with a 4-digit code. Codes
//! are held in an in-memory map keyed by user id and expire after five
//! minutes; restarting the server invalidates outstanding codes, which is
//! acceptable for this flow (the user simply requests a new one).
//!
//! Actual delivery over email or SMS is out of scope; the [`CodeDelivery`]
//! trait is the seam where a real sender would plug in, and the default
//! implementation only logs.

use crate::constants::limits;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rand::Rng;
use uuid::Uuid;

/// A pending verification code
#[derive(Debug, Clone, Copy)]
struct PendingCode {
    code: u32,
    issued_at: DateTime<Utc>,
}

/// In-memory store of outstanding verification codes
#[derive(Default)]
pub struct VerificationStore {
    codes: DashMap<Uuid, PendingCode>,
}

impl VerificationStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh 4-digit code for a user, replacing any outstanding one
    pub fn issue(&self, user_id: Uuid) -> u32 {
        let code =
            rand::thread_rng().gen_range(limits::VERIFICATION_CODE_MIN..=limits::VERIFICATION_CODE_MAX);
        self.codes.insert(
            user_id,
            PendingCode {
                code,
                issued_at: Utc::now(),
            },
        );
        code
    }

    /// Check a submitted code; consumes it on success
    ///
    /// Returns false for unknown users, wrong codes, and expired codes.
    /// Expired entries are removed on the way out.
    pub fn verify(&self, user_id: Uuid, submitted: u32) -> bool {
        let Some(entry) = self.codes.get(&user_id).map(|e| *e) else {
            return false;
        };

        let expired = Utc::now() - entry.issued_at
            > Duration::seconds(limits::VERIFICATION_CODE_TTL_SECS);
        if expired {
            self.codes.remove(&user_id);
            return false;
        }

        if entry.code != submitted {
            return false;
        }

        self.codes.remove(&user_id);
        true
    }

    /// Drop any outstanding code for a user
    pub fn invalidate(&self, user_id: Uuid) {
        self.codes.remove(&user_id);
    }

    #[cfg(test)]
    fn issue_at(&self, user_id: Uuid, code: u32, issued_at: DateTime<Utc>) {
        self.codes.insert(user_id, PendingCode { code, issued_at });
    }
}

/// Delivery seam for verification codes
///
/// Email/SMS delivery is excluded from this service; production deployments
/// sit behind a gateway that owns the sending. The default implementation
/// logs the code at debug level so local development can complete the flow.
pub trait CodeDelivery: Send + Sync {
    /// Deliver a code to the user's registered identifier
    fn deliver(&self, identifier: &str, code: u32);
}

/// Logs codes instead of sending them
#[derive(Default)]
pub struct LoggingDelivery;

impl CodeDelivery for LoggingDelivery {
    fn deliver(&self, identifier: &str, code: u32) {
        tracing::debug!(identifier, code, "verification code issued");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify() {
        let store = VerificationStore::new();
        let user_id = Uuid::new_v4();

        let code = store.issue(user_id);
        assert!((1000..=9999).contains(&code));
        assert!(store.verify(user_id, code));

        // consumed on success
        assert!(!store.verify(user_id, code));
    }

    #[test]
    fn test_wrong_code_rejected_but_not_consumed() {
        let store = VerificationStore::new();
        let user_id = Uuid::new_v4();

        let code = store.issue(user_id);
        let wrong = if code == 9999 { 1000 } else { code + 1 };
        assert!(!store.verify(user_id, wrong));
        assert!(store.verify(user_id, code));
    }

    #[test]
    fn test_expired_code_rejected() {
        let store = VerificationStore::new();
        let user_id = Uuid::new_v4();

        store.issue_at(user_id, 1234, Utc::now() - Duration::seconds(301));
        assert!(!store.verify(user_id, 1234));
    }

    #[test]
    fn test_reissue_replaces_previous_code() {
        let store = VerificationStore::new();
        let user_id = Uuid::new_v4();

        store.issue_at(user_id, 1111, Utc::now());
        let fresh = store.issue(user_id);
        if fresh != 1111 {
            assert!(!store.verify(user_id, 1111));
        }
    }

    #[test]
    fn test_unknown_user_rejected() {
        let store = VerificationStore::new();
        assert!(!store.verify(Uuid::new_v4(), 1234));
    }
}
