//! Orders, order lines, and total recomputation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use comanda_core::{ClientId, EmployeeId, OrderId, OrderStatus, ProductId};

use super::product::Product;

/// An order as returned by the backend.
///
/// Held only as a transient cached copy; the backend is the record of
/// truth, and the cached status is replaced only after a confirmed status
/// update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(rename = "clienteId")]
    pub client_id: ClientId,
    #[serde(rename = "empleadoId", default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<EmployeeId>,
    #[serde(rename = "fechaPedido")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "fechaEntrega", default, skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<DateTime<Utc>>,
    #[serde(rename = "estado")]
    pub status: OrderStatus,
    pub total: Decimal,
    #[serde(rename = "detalles", default)]
    pub lines: Vec<OrderLine>,
}

/// One product+quantity entry within an order.
///
/// `unit_price` and `subtotal` are optional caches filled in by the
/// backend; when absent, totals fall back to the product catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    #[serde(rename = "productoId")]
    pub product_id: ProductId,
    #[serde(rename = "cantidad")]
    pub quantity: u32,
    #[serde(
        rename = "precioUnitario",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub unit_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<Decimal>,
}

impl OrderLine {
    /// A plain product+quantity line with no cached prices.
    #[must_use]
    pub const fn new(product_id: ProductId, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
            unit_price: None,
            subtotal: None,
        }
    }
}

/// Payload for creating or fully editing an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDraft {
    #[serde(rename = "clienteId")]
    pub client_id: ClientId,
    #[serde(rename = "empleadoId", default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<EmployeeId>,
    #[serde(rename = "estado")]
    pub status: OrderStatus,
    pub total: Decimal,
    #[serde(rename = "detalles")]
    pub lines: Vec<OrderLine>,
}

impl OrderDraft {
    /// Draft a new pending order, computing the total from the catalog
    /// snapshot.
    #[must_use]
    pub fn new(client_id: ClientId, lines: Vec<OrderLine>, catalog: &[Product]) -> Self {
        let total = compute_total(&lines, catalog);
        Self {
            client_id,
            employee_id: None,
            status: OrderStatus::Pending,
            total,
            lines,
        }
    }
}

/// Recompute an order's total from its lines and a product catalog
/// snapshot.
///
/// Pure and idempotent: per line, a cached subtotal wins; otherwise the
/// cached unit price times quantity; otherwise the catalog price times
/// quantity; a line whose product is unknown to the snapshot contributes
/// nothing.
#[must_use]
pub fn compute_total(lines: &[OrderLine], catalog: &[Product]) -> Decimal {
    lines
        .iter()
        .map(|line| {
            line.subtotal.unwrap_or_else(|| {
                let quantity = Decimal::from(line.quantity);
                line.unit_price.map_or_else(
                    || {
                        catalog
                            .iter()
                            .find(|product| product.id == line.product_id)
                            .map_or(Decimal::ZERO, |product| product.price * quantity)
                    },
                    |unit_price| unit_price * quantity,
                )
            })
        })
        .sum()
}
