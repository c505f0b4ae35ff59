//! Clients screen service.

use std::sync::Arc;

use tracing::instrument;

use comanda_core::ClientId;

use crate::api::ApiClient;
use crate::error::{ApiError, Result};
use crate::models::{Client, ClientDraft, DeleteAck};
use crate::session::SessionManager;

const BASE_PATH: &str = "/api/clientes";

/// Service for the clients resource. Payloads are not enveloped.
#[derive(Debug, Clone)]
pub struct ClientsService {
    api: ApiClient,
    session: Arc<SessionManager>,
}

impl ClientsService {
    /// Create a new clients service.
    #[must_use]
    pub const fn new(api: ApiClient, session: Arc<SessionManager>) -> Self {
        Self { api, session }
    }

    /// List all clients.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Client>> {
        self.api.get(BASE_PATH).await
    }

    /// Search clients by free text.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<Client>> {
        self.api
            .get_with_query(&format!("{BASE_PATH}/search"), &[("query", query)])
            .await
    }

    /// Create a client. Admin only.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Forbidden` for non-admin sessions and
    /// `ApiError::Validation` for an incomplete draft; neither issues a
    /// request.
    #[instrument(skip(self, draft))]
    pub async fn create(&self, draft: &ClientDraft) -> Result<Client> {
        self.session.require_admin().await?;
        validate(draft)?;
        self.api.post(BASE_PATH, draft).await
    }

    /// Update a client. Admin only.
    ///
    /// # Errors
    ///
    /// Same client-side rejections as [`create`](Self::create).
    #[instrument(skip(self, draft))]
    pub async fn update(&self, id: ClientId, draft: &ClientDraft) -> Result<Client> {
        self.session.require_admin().await?;
        validate(draft)?;
        self.api.put(&format!("{BASE_PATH}/{id}"), draft).await
    }

    /// Delete a client. Admin only.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Forbidden` for non-admin sessions without
    /// issuing a request.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ClientId) -> Result<bool> {
        self.session.require_admin().await?;
        let ack: DeleteAck = self.api.delete(&format!("{BASE_PATH}/{id}")).await?;
        Ok(ack.deleted)
    }
}

fn validate(draft: &ClientDraft) -> Result<()> {
    if draft.first_name.trim().is_empty() {
        return Err(ApiError::Validation("first name is required".to_string()));
    }
    if draft.last_name.trim().is_empty() {
        return Err(ApiError::Validation("last name is required".to_string()));
    }
    Ok(())
}
