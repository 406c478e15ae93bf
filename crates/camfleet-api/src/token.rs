// Persisted bearer token storage
//
// The single authoritative accessor for the session credential. The HTTP
// facade reads it on every outbound request and the session guard writes
// it on login/logout, so the two can never disagree about whether a
// token exists.
//
// On disk this is the CLI analog of the dashboard's session cookie: a
// small JSON file holding the token and a fixed expiry.

use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Fixed credential lifetime: one day from issuance.
const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl StoredToken {
    fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Shared store for the bearer credential.
///
/// `path: None` keeps the token purely in memory (tests, ephemeral use).
/// Corrupt or expired persisted state is treated as "no token" rather
/// than an error -- the caller simply has to log in again.
#[derive(Debug)]
pub struct TokenStore {
    path: Option<PathBuf>,
    cached: RwLock<Option<StoredToken>>,
}

impl TokenStore {
    /// Open a file-backed store, loading any previously persisted token.
    pub fn open(path: PathBuf) -> Self {
        let cached = load_from_disk(&path);
        Self {
            path: Some(path),
            cached: RwLock::new(cached),
        }
    }

    /// Create a store with no persistence.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            cached: RwLock::new(None),
        }
    }

    /// The current token, if one is present and unexpired.
    pub fn get(&self) -> Option<String> {
        let guard = self.cached.read().expect("token lock poisoned");
        match guard.as_ref() {
            Some(stored) if !stored.is_expired() => Some(stored.token.clone()),
            _ => None,
        }
    }

    /// `true` if an unexpired token is present.
    pub fn has_token(&self) -> bool {
        self.get().is_some()
    }

    /// Store a new token with the fixed one-day expiry, persisting it
    /// if the store is file-backed.
    pub fn set(&self, token: &str) {
        let stored = StoredToken {
            token: token.to_owned(),
            expires_at: Utc::now() + Duration::hours(TOKEN_TTL_HOURS),
        };

        if let Some(ref path) = self.path {
            persist(path, &stored);
        }

        *self.cached.write().expect("token lock poisoned") = Some(stored);
        debug!("stored session token");
    }

    /// Drop the token from memory and disk. Idempotent.
    pub fn clear(&self) {
        *self.cached.write().expect("token lock poisoned") = None;

        if let Some(ref path) = self.path {
            match fs::remove_file(path) {
                Ok(()) => debug!("removed persisted token"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(error = %e, "failed to remove persisted token"),
            }
        }
    }
}

fn load_from_disk(path: &PathBuf) -> Option<StoredToken> {
    let raw = fs::read_to_string(path).ok()?;
    let stored: StoredToken = match serde_json::from_str(&raw) {
        Ok(stored) => stored,
        Err(e) => {
            warn!(error = %e, "ignoring corrupt token file");
            return None;
        }
    };

    if stored.is_expired() {
        debug!("ignoring expired persisted token");
        return None;
    }
    Some(stored)
}

fn persist(path: &PathBuf, stored: &StoredToken) {
    let write = || -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(stored)?;
        fs::write(path, json)
    };

    if let Err(e) = write() {
        // In-memory state stays valid for this process either way.
        warn!(error = %e, path = %path.display(), "failed to persist token");
    }
}
