//! Session lifecycle commands.

use comanda_dashboard::error::Result;

use super::Context;

/// Log in and persist the session.
pub async fn login(ctx: &Context, email: &str, password: &str) -> Result<()> {
    let route = ctx.session.login(email, password).await?;
    tracing::info!("Navigating to {}", route.path());
    Ok(())
}

/// Clear the session locally and best-effort server-side.
pub async fn logout(ctx: &Context) -> Result<()> {
    let route = ctx.session.logout().await;
    tracing::info!("Navigating to {}", route.path());
    Ok(())
}

/// Show the cached profile and verify the token against the backend.
pub async fn whoami(ctx: &Context) -> Result<()> {
    let Some(user) = ctx.session.current_user().await else {
        tracing::info!("Not logged in");
        return Ok(());
    };

    tracing::info!("{} <{}> ({})", user.name, user.email, user.role);

    // A stale token surfaces here as Unauthorized, which the shell routes
    // into the session teardown.
    let profile = ctx.auth.me().await?;
    tracing::info!("Session confirmed by backend (user id {})", profile.id);
    Ok(())
}
