// ── Navigation guard ──
//
// Pre-transition hook over route changes. Decides, before anything is
// rendered or executed, whether the caller may enter a route -- and if
// not, where to send them. The guarantee: no protected route resolves
// to Allow without at least one successful token validation in the
// current session lifetime.

use tracing::debug;

use crate::session::SessionGuard;

/// Default login route.
pub const LOGIN_PATH: &str = "/login";

/// A navigable route with its auth requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub path: String,
    pub requires_auth: bool,
}

impl Route {
    pub fn public(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            requires_auth: false,
        }
    }

    pub fn protected(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            requires_auth: true,
        }
    }
}

/// Registered routes, looked up by exact path.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_route(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
    }

    pub fn find(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.path == path)
    }
}

/// Outcome of a route transition check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavDecision {
    Allow,
    Redirect { to: String },
}

/// Permits or denies route transitions based on session state.
#[derive(Clone)]
pub struct NavigationGuard {
    session: SessionGuard,
    login_path: String,
}

impl NavigationGuard {
    pub fn new(session: SessionGuard) -> Self {
        Self {
            session,
            login_path: LOGIN_PATH.to_owned(),
        }
    }

    /// Decide whether a transition to `route` may proceed.
    ///
    /// - the login route and public routes always pass, with no checks;
    /// - an already-validated session passes;
    /// - a token that has never been verified costs one validation
    ///   round-trip, after which the result decides;
    /// - no token at all redirects to login immediately, without any
    ///   network call.
    pub async fn resolve(&self, route: &Route) -> NavDecision {
        if route.path == self.login_path || !route.requires_auth {
            return NavDecision::Allow;
        }

        if self.session.is_authenticated().await {
            return NavDecision::Allow;
        }

        if !self.session.has_checked_auth().await {
            // Token present but unverified: one round-trip settles it.
            if self.session.check_auth().await {
                return NavDecision::Allow;
            }
        }

        debug!(path = %route.path, "denying unauthenticated transition");
        NavDecision::Redirect {
            to: self.login_path.clone(),
        }
    }

    /// Resolve by path against a route table. Unregistered paths are
    /// treated as public.
    pub async fn resolve_path(&self, table: &RouteTable, path: &str) -> NavDecision {
        match table.find(path) {
            Some(route) => self.resolve(route).await,
            None => NavDecision::Allow,
        }
    }
}
