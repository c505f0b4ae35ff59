//! The session manager: single source of truth for "who is logged in".
//!
//! An explicitly-scoped object passed to whoever needs it - no ambient
//! globals. It owns the durable session record (single writer), the bearer
//! token installed on the transport, the notification channels, and every
//! teardown decision. When any API call reports the session as
//! unauthorized, the shell routes the error here; neither the transport
//! nor the services redirect on their own.

use secrecy::SecretString;
use tokio::sync::RwLock;
use tracing::instrument;

use comanda_core::{Role, UserId};

use crate::api::ApiClient;
use crate::error::{ApiError, Result};
use crate::guard::Route;
use crate::models::User;
use crate::services::auth::AuthService;

use super::notifications::Notifier;
use super::store::{LoadedSession, SessionStore};

/// Authentication state of this process.
///
/// Starts in `Loading` until [`SessionManager::restore`] has consulted the
/// durable store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// Restoring from the durable store.
    Loading,
    /// No session.
    Anonymous,
    /// Valid session with a cached profile.
    Authenticated(User),
}

/// Session manager.
pub struct SessionManager {
    api: ApiClient,
    auth: AuthService,
    store: Box<dyn SessionStore>,
    notifier: Notifier,
    state: RwLock<AuthState>,
}

impl SessionManager {
    /// Create a manager in the `Loading` state.
    ///
    /// Call [`restore`](Self::restore) before consulting the state.
    #[must_use]
    pub fn new(api: ApiClient, store: Box<dyn SessionStore>) -> Self {
        let auth = AuthService::new(api.clone());
        Self {
            api,
            auth,
            store,
            notifier: Notifier::new(),
            state: RwLock::new(AuthState::Loading),
        }
    }

    /// The notification channels owned by this session.
    #[must_use]
    pub const fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Current authentication state.
    pub async fn state(&self) -> AuthState {
        self.state.read().await.clone()
    }

    /// The cached profile, if authenticated.
    pub async fn current_user(&self) -> Option<User> {
        match &*self.state.read().await {
            AuthState::Authenticated(user) => Some(user.clone()),
            _ => None,
        }
    }

    /// Whether a session is locally present.
    pub async fn is_authenticated(&self) -> bool {
        matches!(&*self.state.read().await, AuthState::Authenticated(_))
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Restore the session from durable storage.
    ///
    /// Moves `Loading` to `Authenticated` for a valid stored session and to
    /// `Anonymous` otherwise. Corrupted entries are purged and treated as
    /// no-session; this never fails.
    #[instrument(skip(self))]
    pub async fn restore(&self) {
        match self.store.load() {
            Ok(LoadedSession::Active { token, user }) => {
                self.api.set_token(token).await;
                *self.state.write().await = AuthState::Authenticated(user);
            }
            Ok(LoadedSession::Missing) => {
                *self.state.write().await = AuthState::Anonymous;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Purging unusable stored session");
                if let Err(e) = self.store.clear() {
                    tracing::warn!(error = %e, "Failed to purge stored session");
                }
                *self.state.write().await = AuthState::Anonymous;
            }
        }
    }

    /// Log in with the given credentials.
    ///
    /// On success the token and profile are persisted together, the token
    /// is installed on the transport, a success notice is published, and
    /// the caller is sent to the dashboard.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidCredentials` when the backend rejects the
    /// login (an error notice is published and the session stays cleared);
    /// any transport failure is reported the same way.
    #[instrument(skip(self, password), fields(user = %email))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Route> {
        let response = match self.auth.login(email, password).await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(error = %e, "Login rejected");
                self.notifier.error("Invalid credentials");
                return Err(ApiError::InvalidCredentials);
            }
        };

        let role = Role::from_claims(&response.roles);
        let user = User {
            id: UserId::new(response.id),
            name: response.display_name(),
            email: email.to_string(),
            role,
        };
        let token = SecretString::from(response.access_token);

        // Both entries are written together; a storage failure must not
        // leave a half-written record behind.
        if let Err(e) = self.store.save(&token, &user) {
            tracing::warn!(error = %e, "Failed to persist session, continuing in memory");
            if let Err(e) = self.store.clear() {
                tracing::warn!(error = %e, "Failed to clear half-written session");
            }
        }

        self.api.set_token(token).await;
        *self.state.write().await = AuthState::Authenticated(user);
        self.notifier.success("Login succeeded");
        Ok(Route::Dashboard)
    }

    /// Log out.
    ///
    /// The backend call is best-effort; the local clear always happens and
    /// never fails the operation.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Route {
        if let Err(e) = self.auth.logout().await {
            tracing::debug!(error = %e, "Backend logout failed, clearing locally anyway");
        }
        self.clear_local_session().await;
        self.notifier.success("Session closed");
        Route::Login
    }

    /// Tear the session down after an API call reported it unauthorized.
    ///
    /// This is the one place the 401-handling decision lives; callers that
    /// see [`ApiError::Unauthorized`] route it here.
    #[instrument(skip(self))]
    pub async fn force_logout(&self) -> Route {
        self.clear_local_session().await;
        self.notifier.error("Session expired, please log in again");
        Route::Login
    }

    /// Require an authenticated admin session.
    ///
    /// The gate every write operation passes before issuing a request. A
    /// UX convenience only; the backend remains the authoritative
    /// enforcer.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Forbidden` (publishing a permission-denied
    /// notice) for a non-admin session, or `ApiError::Unauthorized` when
    /// no session is present.
    pub async fn require_admin(&self) -> Result<User> {
        match &*self.state.read().await {
            AuthState::Authenticated(user) if user.is_admin() => Ok(user.clone()),
            AuthState::Authenticated(_) => {
                self.notifier.error("Permission denied");
                Err(ApiError::Forbidden("admin role required".to_string()))
            }
            _ => Err(ApiError::Unauthorized),
        }
    }

    async fn clear_local_session(&self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "Failed to clear stored session");
        }
        self.api.clear_token().await;
        *self.state.write().await = AuthState::Anonymous;
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager").finish_non_exhaustive()
    }
}
