//! Clients screen commands.

use comanda_core::ClientId;
use comanda_dashboard::error::Result;
use comanda_dashboard::models::{Client, ClientDraft};

use super::Context;

/// List all clients.
pub async fn list(ctx: &Context) -> Result<()> {
    render(&ctx.clients.list().await?);
    Ok(())
}

/// Search clients by free text.
pub async fn search(ctx: &Context, query: &str) -> Result<()> {
    render(&ctx.clients.search(query).await?);
    Ok(())
}

/// Create a client.
pub async fn create(
    ctx: &Context,
    first_name: String,
    last_name: String,
    email: Option<String>,
    phone: Option<String>,
    address: Option<String>,
) -> Result<()> {
    let draft = ClientDraft {
        first_name,
        last_name,
        email,
        phone,
        address,
    };
    let client = ctx.clients.create(&draft).await?;
    ctx.session
        .notifier()
        .success(format!("Client #{} created", client.id));
    Ok(())
}

/// Update a client.
#[allow(clippy::too_many_arguments)]
pub async fn update(
    ctx: &Context,
    id: ClientId,
    first_name: String,
    last_name: String,
    email: Option<String>,
    phone: Option<String>,
    address: Option<String>,
) -> Result<()> {
    let draft = ClientDraft {
        first_name,
        last_name,
        email,
        phone,
        address,
    };
    let client = ctx.clients.update(id, &draft).await?;
    ctx.session
        .notifier()
        .success(format!("Client #{} updated", client.id));
    Ok(())
}

/// Delete a client.
pub async fn delete(ctx: &Context, id: ClientId) -> Result<()> {
    let deleted = ctx.clients.delete(id).await?;
    if deleted {
        ctx.session
            .notifier()
            .success(format!("Client #{id} deleted"));
    } else {
        ctx.session
            .notifier()
            .error(format!("Client #{id} was not deleted"));
    }
    Ok(())
}

fn render(clients: &[Client]) {
    if clients.is_empty() {
        tracing::info!("No clients");
        return;
    }
    for client in clients {
        tracing::info!(
            "#{} {} {} {}",
            client.id,
            client.first_name,
            client.last_name,
            client.email.as_deref().unwrap_or("-"),
        );
    }
}
