//! Authentication calls against the backend.
//!
//! Thin request/response wrapper; session state belongs to the session
//! manager, which is this service's only caller for login/logout.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use comanda_core::RoleClaim;

use crate::api::ApiClient;
use crate::error::Result;

/// Login request body.
#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    #[serde(rename = "usernameOrEmail")]
    username_or_email: &'a str,
    password: &'a str,
}

/// Login response payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests.
    #[serde(rename = "accessToken")]
    pub access_token: String,
    /// Backend user ID.
    pub id: i64,
    /// Role claims in either of the backend's two shapes.
    #[serde(default)]
    pub roles: Vec<RoleClaim>,
    /// Display name; some backend versions send `username` instead.
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl LoginResponse {
    /// Display name, whichever field the backend filled in.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.nombre
            .clone()
            .or_else(|| self.username.clone())
            .unwrap_or_default()
    }
}

/// Profile payload from the whoami endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileResponse {
    pub id: i64,
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub roles: Vec<RoleClaim>,
}

/// Authentication service.
#[derive(Debug, Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` when the backend rejects the
    /// credentials; the session manager translates that into its
    /// invalid-credentials outcome.
    #[instrument(skip(self, password), fields(user = %username_or_email))]
    pub async fn login(&self, username_or_email: &str, password: &str) -> Result<LoginResponse> {
        self.api
            .post(
                "/api/auth/login",
                &LoginRequest {
                    username_or_email,
                    password,
                },
            )
            .await
    }

    /// Invalidate the session server-side.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails; callers treat this as
    /// best-effort and clear the local session regardless.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        self.api.post_empty("/api/auth/logout").await
    }

    /// Fetch the profile the backend associates with the current token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` when the token is stale.
    #[instrument(skip(self))]
    pub async fn me(&self) -> Result<ProfileResponse> {
        self.api.get("/api/auth/me").await
    }
}
