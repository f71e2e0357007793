//! Admin authentication
//!
//! The admin password is held server-side and compared once at login.
//! A successful login issues an opaque, expiring session token that every
//! admin request must present; the password itself is never stored or
//! compared client-side.
//!
//! # Pure Functions
//!
//! No HTTP framework dependencies here; the web crate wraps these in
//! handlers and middleware.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// Default session lifetime, in hours
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 12;

/// Compare a submitted password against the configured one
///
/// Both sides are hashed first so the comparison runs over fixed-length
/// digests and does not short-circuit on the first differing byte.
pub fn verify_password(provided: &str, expected: &str) -> bool {
    let provided = Sha256::digest(provided.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());

    provided
        .iter()
        .zip(expected.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// An issued admin session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// In-memory store of live admin sessions
///
/// Sessions do not survive a restart; admins simply log in again.
#[derive(Debug)]
pub struct SessionStore {
    ttl: Duration,
    sessions: Mutex<HashMap<Uuid, DateTime<Utc>>>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Store with a lifetime in hours (non-positive values use the default)
    pub fn with_ttl_hours(hours: i64) -> Self {
        let hours = if hours > 0 {
            hours
        } else {
            DEFAULT_SESSION_TTL_HOURS
        };
        Self::new(Duration::hours(hours))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a new session starting now
    pub fn issue(&self) -> Session {
        self.issue_at(Utc::now())
    }

    /// Issue a new session starting at `now`
    pub fn issue_at(&self, now: DateTime<Utc>) -> Session {
        let token = Uuid::new_v4();
        let expires_at = now + self.ttl;

        let mut sessions = self.lock();
        sessions.retain(|_, expiry| *expiry > now);
        sessions.insert(token, expires_at);

        Session {
            token: token.to_string(),
            expires_at,
        }
    }

    /// Whether `token` names a live session
    pub fn validate(&self, token: &str) -> bool {
        self.validate_at(token, Utc::now())
    }

    /// Whether `token` names a session still live at `now`
    ///
    /// Expired sessions are dropped as they are encountered.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> bool {
        let Ok(token) = Uuid::parse_str(token.trim()) else {
            return false;
        };

        let mut sessions = self.lock();
        match sessions.get(&token) {
            Some(expiry) if *expiry > now => true,
            Some(_) => {
                sessions.remove(&token);
                false
            }
            None => false,
        }
    }

    /// End a session; returns whether it existed
    pub fn revoke(&self, token: &str) -> bool {
        let Ok(token) = Uuid::parse_str(token.trim()) else {
            return false;
        };
        self.lock().remove(&token).is_some()
    }

    /// Number of stored sessions (expired ones included until purged)
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, DateTime<Utc>>> {
        // A panic while holding the lock leaves the map itself intact
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_ttl_hours(DEFAULT_SESSION_TTL_HOURS)
    }
}
