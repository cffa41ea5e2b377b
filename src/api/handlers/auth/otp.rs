//! One-time login codes: issue, lookup, consume.
//!
//! The store keeps at most one live code per normalized email; a new
//! issuance overwrites any prior entry, so only the latest code verifies.
//! Expired entries are detected lazily on use and removed by callers;
//! there is no background sweep.
//!
//! The in-memory store is process-local and does not survive multi-instance
//! deployment: codes issued on one replica are invisible to the others.
//! Endpoints only see the [`OtpStore`] trait, so a shared store can replace
//! the map without touching the login flows.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use std::collections::HashMap;
use std::sync::Mutex;

/// Fixed code length, zero-padded decimal.
const CODE_LENGTH: u32 = 6;

/// A live one-time code for a single email.
#[derive(Clone, Debug)]
pub struct OtpEntry {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

impl OtpEntry {
    /// Pure comparison against the given instant; callers treat an expired
    /// entry as absent and delete it.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Short-lived single-use code store keyed by normalized email.
pub trait OtpStore: Send + Sync {
    /// Generate and store a fresh code, overwriting any prior entry for the
    /// same email (last-writer-wins), and return it for delivery.
    fn issue(&self, email: &str) -> String;

    fn lookup(&self, email: &str) -> Option<OtpEntry>;

    /// Delete the entry unconditionally. Called after successful
    /// verification to enforce single use; absent entries are a no-op.
    fn consume(&self, email: &str);
}

/// Process-local [`OtpStore`] backed by a mutex-guarded map.
///
/// The single mutex gives single-key-granularity safety: concurrent
/// issuance and consumption for different emails cannot corrupt each
/// other's entries, and same-email races resolve last-writer-wins.
pub struct InMemoryOtpStore {
    ttl: Duration,
    entries: Mutex<HashMap<String, OtpEntry>>,
}

impl InMemoryOtpStore {
    #[must_use]
    pub fn new(ttl_seconds: i64) -> Self {
        Self {
            ttl: Duration::seconds(ttl_seconds),
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn generate_code() -> String {
        let code: u32 = rand::thread_rng().gen_range(0..10u32.pow(CODE_LENGTH));
        format!("{code:06}")
    }
}

impl OtpStore for InMemoryOtpStore {
    fn issue(&self, email: &str) -> String {
        let code = Self::generate_code();
        let entry = OtpEntry {
            code: code.clone(),
            expires_at: Utc::now() + self.ttl,
        };
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(email.to_string(), entry);
        }
        code
    }

    fn lookup(&self, email: &str) -> Option<OtpEntry> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(email).cloned())
    }

    fn consume(&self, email: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(email);
        }
    }
}
