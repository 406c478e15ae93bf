// ── Session guard ──
//
// Owns the authentication state derived from the token lifecycle.
// All session-mutating operations (login, logout, validation) are
// serialized through one async mutex: overlapping login/logout calls
// from independent triggers cannot interleave, so the state cannot
// be left half-updated.

use std::sync::Arc;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use camfleet_api::{ApiClient, Error};

use crate::model::{ActionOutcome, Device, Health};

const LOGIN_FAILED: &str = "Login failed";

/// Role attached to a validated session.
///
/// The token endpoint does not report a role, so every validated session
/// is treated as `Admin`. Kept as an enum so a real role claim can slot
/// in without touching callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
}

/// The authenticated principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub role: Role,
}

#[derive(Debug, Default)]
struct SessionState {
    authenticated: bool,
    user: Option<User>,
}

/// Authentication state and lifecycle operations.
///
/// Cheap to clone; all clones share one state. The guard and the HTTP
/// facade read the same `TokenStore`, so "is there a token" has exactly
/// one answer at any point in time.
#[derive(Clone)]
pub struct SessionGuard {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    api: ApiClient,
    state: Mutex<SessionState>,
}

impl SessionGuard {
    /// Create a guard over an API client. The session starts empty; a
    /// previously persisted token is picked up by the first `check_auth`.
    pub fn new(api: ApiClient) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                api,
                state: Mutex::new(SessionState::default()),
            }),
        }
    }

    /// The underlying API client.
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    // ── Lifecycle operations ─────────────────────────────────────────

    /// Submit credentials to the token endpoint.
    ///
    /// On success the token is persisted (fixed 1-day expiry) and the
    /// session is immediately re-validated through the `check_auth` path.
    /// A successful exchange yields a success outcome even if the
    /// follow-up validation cannot complete -- `is_authenticated` then
    /// simply stays false until the next check.
    ///
    /// The credential exchange itself runs outside the state lock: a slow
    /// token endpoint must not stall concurrent `is_authenticated` reads.
    /// Only the token write and validation hold the lock.
    ///
    /// On rejection the outcome carries the server's `detail` message,
    /// or a default when the failure never reached the server.
    pub async fn login(&self, username: &str, password: &SecretString) -> ActionOutcome {
        match self.inner.api.login(username, password).await {
            Ok(token) => {
                let mut state = self.inner.state.lock().await;
                self.inner.api.tokens().set(&token);
                let validated = self.validate_locked(&mut state).await;
                info!(validated, "login succeeded");
                ActionOutcome::ok()
            }
            // The server's `detail` wording when it rejected us; the
            // default for failures that never produced a response.
            Err(Error::Authentication { message }) => ActionOutcome::failed(message),
            Err(err) => {
                debug!(error = %err, "login failed before reaching the server");
                ActionOutcome::failed(LOGIN_FAILED)
            }
        }
    }

    /// Validate the current token, if any.
    ///
    /// - no token: returns `false` without any network call;
    /// - probe succeeds: marks the session authenticated and returns `true`;
    /// - probe answers 401: the token is dead -- logs out and returns `false`;
    /// - anything else (network trouble, 5xx): returns `false` but keeps
    ///   the token, since the failure may be transient.
    pub async fn check_auth(&self) -> bool {
        let mut state = self.inner.state.lock().await;
        self.validate_locked(&mut state).await
    }

    /// Clear the in-memory session and the persisted token. Idempotent.
    pub async fn logout(&self) {
        let mut state = self.inner.state.lock().await;
        Self::logout_locked(&self.inner.api, &mut state);
    }

    /// `GET /health` service liveness report. Needs no authentication
    /// and touches no session state.
    pub async fn health(&self) -> Result<Health, Error> {
        self.inner.api.get_json("health").await
    }

    // ── Derived state ────────────────────────────────────────────────

    pub async fn is_authenticated(&self) -> bool {
        self.inner.state.lock().await.authenticated
    }

    pub async fn current_user(&self) -> Option<User> {
        self.inner.state.lock().await.user
    }

    /// `false` only in the ambiguous "token present but not yet verified"
    /// state -- the one case where the navigation guard must spend a
    /// validation round-trip before deciding.
    pub async fn has_checked_auth(&self) -> bool {
        let state = self.inner.state.lock().await;
        state.authenticated || !self.inner.api.tokens().has_token()
    }

    // ── Internals ────────────────────────────────────────────────────

    async fn validate_locked(&self, state: &mut SessionState) -> bool {
        if !self.inner.api.tokens().has_token() {
            // No token: stay logged out, never probe the network.
            return false;
        }

        // The device collection doubles as the token-validation probe.
        match self.inner.api.get_json::<Vec<Device>>("devices").await {
            Ok(_) => {
                state.authenticated = true;
                state.user = Some(User { role: Role::Admin });
                true
            }
            Err(err) if err.is_auth_expired() => {
                debug!("token rejected, clearing session");
                Self::logout_locked(&self.inner.api, state);
                false
            }
            Err(err) => {
                // Transient failure: keep the token for a later retry.
                debug!(error = %err, "auth check failed transiently");
                false
            }
        }
    }

    fn logout_locked(api: &ApiClient, state: &mut SessionState) {
        state.authenticated = false;
        state.user = None;
        api.tokens().clear();
    }
}
