//! Route guard for protected screens.
//!
//! The decision is made from local session presence alone - never from a
//! live token-validity check - so navigation never blocks on the network.
//! A locally present but server-invalidated token passes the guard and is
//! caught by the first protected API call, which reports `Unauthorized`
//! and triggers the session manager's teardown. That window is accepted
//! behavior: the guard is a UX convenience, the backend is the enforcer.

/// Path prefixes reachable without a session.
const PUBLIC_PREFIXES: &[&str] = &["/login", "/register", "/contact", "/api/auth", "/assets"];

/// Prefix of the protected dashboard subtree.
const PROTECTED_PREFIX: &str = "/dashboard";

/// Outcome of a guard check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Render the requested screen.
    Allow,
    /// Send the user to the login screen before anything protected renders.
    RedirectToLogin,
}

/// Navigation targets the session manager hands back to the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// The dashboard landing screen.
    Dashboard,
    /// The login screen.
    Login,
}

impl Route {
    /// Path of this route.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Dashboard => "/dashboard",
            Self::Login => "/login",
        }
    }
}

/// Decide whether `path` may render given local session presence.
#[must_use]
pub fn check(path: &str, authenticated: bool) -> GuardDecision {
    if is_public(path) {
        return GuardDecision::Allow;
    }

    if path.starts_with(PROTECTED_PREFIX) && !authenticated {
        return GuardDecision::RedirectToLogin;
    }

    GuardDecision::Allow
}

fn is_public(path: &str) -> bool {
    path == "/"
        || path == "/favicon.ico"
        || PUBLIC_PREFIXES
            .iter()
            .any(|prefix| path.starts_with(prefix))
}
