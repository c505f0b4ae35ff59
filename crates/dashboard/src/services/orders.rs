//! Orders screen service and the status workflow.
//!
//! Status changes go through [`advance`](OrdersService::advance),
//! [`cancel`](OrdersService::cancel) or
//! [`set_status`](OrdersService::set_status), all of which reject
//! impossible transitions client-side - terminal orders never produce a
//! request. The caller's cached order is replaced only by the order the
//! backend returns, so a failed update leaves the prior status in place.

use std::sync::Arc;

use tracing::instrument;

use comanda_core::{OrderId, OrderStatus};

use crate::api::ApiClient;
use crate::error::{ApiError, Result};
use crate::models::{Order, OrderDraft};
use crate::session::SessionManager;

const BASE_PATH: &str = "/api/pedidos";

/// Service for the orders resource. Payloads are not enveloped.
#[derive(Debug, Clone)]
pub struct OrdersService {
    api: ApiClient,
    session: Arc<SessionManager>,
}

impl OrdersService {
    /// Create a new orders service.
    #[must_use]
    pub const fn new(api: ApiClient, session: Arc<SessionManager>) -> Self {
        Self { api, session }
    }

    /// List all orders.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Order>> {
        self.api.get(BASE_PATH).await
    }

    /// Create an order. Admin only.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Forbidden` for non-admin sessions and
    /// `ApiError::Validation` for a draft without valid lines; neither
    /// issues a request.
    #[instrument(skip(self, draft))]
    pub async fn create(&self, draft: &OrderDraft) -> Result<Order> {
        self.session.require_admin().await?;
        validate(draft)?;
        self.api.post(BASE_PATH, draft).await
    }

    /// Fully edit an order. Admin only.
    ///
    /// # Errors
    ///
    /// Same client-side rejections as [`create`](Self::create).
    #[instrument(skip(self, draft))]
    pub async fn update(&self, id: OrderId, draft: &OrderDraft) -> Result<Order> {
        self.session.require_admin().await?;
        validate(draft)?;
        self.api.put(&format!("{BASE_PATH}/{id}"), draft).await
    }

    /// Delete an order. Admin only.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Forbidden` for non-admin sessions without
    /// issuing a request.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: OrderId) -> Result<()> {
        self.session.require_admin().await?;
        self.api.delete_empty(&format!("{BASE_PATH}/{id}")).await
    }

    /// Advance an order one step along the forward path. Admin only.
    ///
    /// PENDING moves to PREPARING, PREPARING to READY, any other open
    /// order to DELIVERED. Returns the updated order; the caller replaces
    /// its cached copy only with this value.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` for a terminal order (no request is
    /// issued) and `ApiError::Forbidden` for non-admin sessions.
    #[instrument(skip(self, order), fields(order_id = %order.id, from = %order.status))]
    pub async fn advance(&self, order: &Order) -> Result<Order> {
        self.session.require_admin().await?;
        let Some(next) = order.status.next_forward() else {
            return Err(ApiError::Validation(format!(
                "order {} is already {}",
                order.id, order.status
            )));
        };
        self.change_status(order.id, next).await
    }

    /// Cancel an open order. Admin only.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` for a terminal order (no request is
    /// issued) and `ApiError::Forbidden` for non-admin sessions.
    #[instrument(skip(self, order), fields(order_id = %order.id, from = %order.status))]
    pub async fn cancel(&self, order: &Order) -> Result<Order> {
        self.session.require_admin().await?;
        if !order.status.can_cancel() {
            return Err(ApiError::Validation(format!(
                "order {} is already {}",
                order.id, order.status
            )));
        }
        self.change_status(order.id, OrderStatus::Cancelled).await
    }

    /// Move an order to an explicit status. Admin only.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` when the transition is not permitted
    /// (no request is issued) and `ApiError::Forbidden` for non-admin
    /// sessions.
    #[instrument(skip(self, order), fields(order_id = %order.id, from = %order.status, to = %target))]
    pub async fn set_status(&self, order: &Order, target: OrderStatus) -> Result<Order> {
        self.session.require_admin().await?;
        if !order.status.can_transition_to(target) {
            return Err(ApiError::Validation(format!(
                "order {} cannot move from {} to {}",
                order.id, order.status, target
            )));
        }
        self.change_status(order.id, target).await
    }

    async fn change_status(&self, id: OrderId, status: OrderStatus) -> Result<Order> {
        self.api
            .put_with_query(
                &format!("{BASE_PATH}/{id}/estado"),
                &[("estado", status.as_str())],
            )
            .await
    }
}

fn validate(draft: &OrderDraft) -> Result<()> {
    if draft.lines.is_empty() {
        return Err(ApiError::Validation(
            "an order needs at least one line".to_string(),
        ));
    }
    if draft.lines.iter().any(|line| line.quantity == 0) {
        return Err(ApiError::Validation(
            "line quantities must be at least 1".to_string(),
        ));
    }
    Ok(())
}
