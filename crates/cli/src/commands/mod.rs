//! Command context and shared helpers.

use std::sync::Arc;

use comanda_dashboard::api::ApiClient;
use comanda_dashboard::config::DashboardConfig;
use comanda_dashboard::error::{ApiError, Result};
use comanda_dashboard::guard::{self, GuardDecision};
use comanda_dashboard::services::{AuthService, ClientsService, OrdersService, ProductsService};
use comanda_dashboard::session::{FileStore, NoticeLevel, SessionManager};

pub mod auth;
pub mod clients;
pub mod orders;
pub mod products;

/// Everything a command needs: the session manager and the resource
/// services, all sharing one transport.
pub struct Context {
    pub session: Arc<SessionManager>,
    pub auth: AuthService,
    pub clients: ClientsService,
    pub products: ProductsService,
    pub orders: OrdersService,
}

impl Context {
    /// Build the context from environment configuration and restore the
    /// persisted session.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or the HTTP client
    /// fails to build.
    pub async fn from_env() -> std::result::Result<Self, Box<dyn std::error::Error>> {
        let config = DashboardConfig::from_env()?;
        let api = ApiClient::new(&config)?;
        let store = FileStore::new(config.session_dir.clone());

        let session = Arc::new(SessionManager::new(api.clone(), Box::new(store)));
        session.restore().await;

        Ok(Self {
            auth: AuthService::new(api.clone()),
            clients: ClientsService::new(api.clone(), session.clone()),
            products: ProductsService::new(api.clone(), session.clone()),
            orders: OrdersService::new(api, session.clone()),
            session,
        })
    }
}

/// Run the route guard for a dashboard screen.
///
/// # Errors
///
/// Returns `ApiError::Unauthorized` when no session is locally present;
/// the shell turns that into the login redirect.
pub async fn guard_dashboard(ctx: &Context, path: &str) -> Result<()> {
    match guard::check(path, ctx.session.is_authenticated().await) {
        GuardDecision::Allow => Ok(()),
        GuardDecision::RedirectToLogin => {
            tracing::warn!("{path} requires a session");
            Err(ApiError::Unauthorized)
        }
    }
}

/// Print and clear whatever the command left on the notification
/// channels.
pub fn report_notices(ctx: &Context) {
    for notice in ctx.session.notifier().drain() {
        match notice.level {
            NoticeLevel::Success => tracing::info!("{}", notice.message),
            NoticeLevel::Error => tracing::warn!("{}", notice.message),
        }
    }
}
