//! Orders screen commands.

use std::str::FromStr;

use thiserror::Error;

use comanda_core::{ClientId, OrderId, OrderStatus, ProductId};
use comanda_dashboard::error::{ApiError, Result};
use comanda_dashboard::models::{Order, OrderDraft, OrderLine};

use super::Context;

/// An order line given on the command line as `product_id:quantity`.
#[derive(Debug, Clone)]
pub struct LineSpec {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Error parsing a `product_id:quantity` argument.
#[derive(Debug, Error)]
#[error("expected product_id:quantity, got {0:?}")]
pub struct LineSpecParseError(String);

impl FromStr for LineSpec {
    type Err = LineSpecParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (product, quantity) = s
            .split_once(':')
            .ok_or_else(|| LineSpecParseError(s.to_string()))?;
        let product_id = product
            .parse::<i64>()
            .map_err(|_| LineSpecParseError(s.to_string()))?;
        let quantity = quantity
            .parse::<u32>()
            .map_err(|_| LineSpecParseError(s.to_string()))?;
        Ok(Self {
            product_id: ProductId::new(product_id),
            quantity,
        })
    }
}

/// List all orders.
pub async fn list(ctx: &Context) -> Result<()> {
    let orders = ctx.orders.list().await?;
    if orders.is_empty() {
        tracing::info!("No orders");
        return Ok(());
    }
    for order in &orders {
        render(order);
    }
    Ok(())
}

/// Create a pending order, pricing its lines from the catalog snapshot.
pub async fn create(ctx: &Context, client_id: ClientId, lines: &[LineSpec]) -> Result<()> {
    let catalog = ctx.products.catalog().await?;
    let lines: Vec<OrderLine> = lines
        .iter()
        .map(|spec| OrderLine::new(spec.product_id, spec.quantity))
        .collect();
    let draft = OrderDraft::new(client_id, lines, &catalog);

    let order = ctx.orders.create(&draft).await?;
    ctx.session
        .notifier()
        .success(format!("Order #{} created, total {}", order.id, order.total));
    Ok(())
}

/// Advance an order one step along the workflow.
pub async fn advance(ctx: &Context, id: OrderId) -> Result<()> {
    let order = find(ctx, id).await?;
    let updated = ctx.orders.advance(&order).await?;
    ctx.session
        .notifier()
        .success(format!("Order #{} is now {}", updated.id, updated.status));
    render(&updated);
    Ok(())
}

/// Cancel an open order.
pub async fn cancel(ctx: &Context, id: OrderId) -> Result<()> {
    let order = find(ctx, id).await?;
    let updated = ctx.orders.cancel(&order).await?;
    ctx.session
        .notifier()
        .success(format!("Order #{} cancelled", updated.id));
    Ok(())
}

/// Move an order to an explicit status.
pub async fn set_status(ctx: &Context, id: OrderId, status: OrderStatus) -> Result<()> {
    let order = find(ctx, id).await?;
    let updated = ctx.orders.set_status(&order, status).await?;
    ctx.session
        .notifier()
        .success(format!("Order #{} is now {}", updated.id, updated.status));
    Ok(())
}

/// Delete an order.
pub async fn delete(ctx: &Context, id: OrderId) -> Result<()> {
    ctx.orders.delete(id).await?;
    ctx.session.notifier().success(format!("Order #{id} deleted"));
    Ok(())
}

/// The orders endpoint has no by-id read; fetch the list and pick.
async fn find(ctx: &Context, id: OrderId) -> Result<Order> {
    ctx.orders
        .list()
        .await?
        .into_iter()
        .find(|order| order.id == id)
        .ok_or_else(|| ApiError::NotFound(format!("order {id}")))
}

fn render(order: &Order) {
    tracing::info!(
        "#{} client {} {} total {} ({} lines){}",
        order.id,
        order.client_id,
        order.status,
        order.total,
        order.lines.len(),
        order
            .delivered_at
            .map(|at| format!(", delivered {at}"))
            .unwrap_or_default(),
    );
}
