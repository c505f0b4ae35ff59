//! Products screen service.
//!
//! The productos endpoints wrap their payloads in the backend's envelope.
//! The service also holds the product catalog snapshot - a 5-minute moka
//! cache - that order forms use to resolve line prices without refetching
//! the catalog on every keystroke.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use rust_decimal::Decimal;
use tracing::instrument;

use comanda_core::ProductId;

use crate::api::ApiClient;
use crate::error::{ApiError, Result};
use crate::models::{Product, ProductDraft};
use crate::session::SessionManager;

const BASE_PATH: &str = "/api/productos";

/// Cache key for the catalog snapshot; there is only one.
const CATALOG_KEY: &str = "catalog";

/// Snapshot time-to-live.
const CATALOG_TTL: Duration = Duration::from_secs(300);

/// Service for the products resource. Payloads are enveloped.
#[derive(Clone)]
pub struct ProductsService {
    api: ApiClient,
    session: Arc<SessionManager>,
    catalog: Cache<&'static str, Arc<Vec<Product>>>,
}

impl ProductsService {
    /// Create a new products service.
    #[must_use]
    pub fn new(api: ApiClient, session: Arc<SessionManager>) -> Self {
        let catalog = Cache::builder()
            .max_capacity(1)
            .time_to_live(CATALOG_TTL)
            .build();
        Self {
            api,
            session,
            catalog,
        }
    }

    /// List active products.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Product>> {
        self.api.get_enveloped(BASE_PATH).await
    }

    /// Fetch one product.
    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: ProductId) -> Result<Product> {
        self.api.get_enveloped(&format!("{BASE_PATH}/{id}")).await
    }

    /// Search products by free text.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<Product>> {
        self.api
            .get_enveloped_with_query(&format!("{BASE_PATH}/search"), &[("query", query)])
            .await
    }

    /// List products in one category.
    #[instrument(skip(self))]
    pub async fn by_category(&self, category: &str) -> Result<Vec<Product>> {
        self.api
            .get_enveloped(&format!("{BASE_PATH}/categoria/{category}"))
            .await
    }

    /// List the category constants known to the backend.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<String>> {
        self.api.get_enveloped(&format!("{BASE_PATH}/categorias")).await
    }

    /// List every product including inactive ones. Admin only.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Forbidden` for non-admin sessions without
    /// issuing a request.
    #[instrument(skip(self))]
    pub async fn admin_all(&self) -> Result<Vec<Product>> {
        self.session.require_admin().await?;
        self.api.get_enveloped(&format!("{BASE_PATH}/admin/all")).await
    }

    /// The catalog snapshot used for order total computation.
    ///
    /// Served from cache for up to five minutes; mutations through this
    /// service invalidate it.
    pub async fn catalog(&self) -> Result<Arc<Vec<Product>>> {
        if let Some(snapshot) = self.catalog.get(CATALOG_KEY).await {
            return Ok(snapshot);
        }
        let snapshot = Arc::new(self.list().await?);
        self.catalog.insert(CATALOG_KEY, snapshot.clone()).await;
        Ok(snapshot)
    }

    /// Create a product. Admin only.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Forbidden` for non-admin sessions and
    /// `ApiError::Validation` for an incomplete draft; neither issues a
    /// request.
    #[instrument(skip(self, draft))]
    pub async fn create(&self, draft: &ProductDraft) -> Result<Product> {
        self.session.require_admin().await?;
        validate(draft)?;
        let product = self.api.post_enveloped(BASE_PATH, draft).await?;
        self.catalog.invalidate(CATALOG_KEY).await;
        Ok(product)
    }

    /// Update a product. Admin only.
    ///
    /// # Errors
    ///
    /// Same client-side rejections as [`create`](Self::create).
    #[instrument(skip(self, draft))]
    pub async fn update(&self, id: ProductId, draft: &ProductDraft) -> Result<Product> {
        self.session.require_admin().await?;
        validate(draft)?;
        let product = self
            .api
            .put_enveloped(&format!("{BASE_PATH}/{id}"), draft)
            .await?;
        self.catalog.invalidate(CATALOG_KEY).await;
        Ok(product)
    }

    /// Delete a product. Admin only.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Forbidden` for non-admin sessions without
    /// issuing a request.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ProductId) -> Result<()> {
        self.session.require_admin().await?;
        self.api
            .delete_enveloped_ack(&format!("{BASE_PATH}/{id}"))
            .await?;
        self.catalog.invalidate(CATALOG_KEY).await;
        Ok(())
    }
}

impl std::fmt::Debug for ProductsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductsService").finish_non_exhaustive()
    }
}

fn validate(draft: &ProductDraft) -> Result<()> {
    if draft.name.trim().is_empty() {
        return Err(ApiError::Validation("product name is required".to_string()));
    }
    if draft.category.trim().is_empty() {
        return Err(ApiError::Validation("category is required".to_string()));
    }
    if draft.price < Decimal::ZERO {
        return Err(ApiError::Validation(
            "price must not be negative".to_string(),
        ));
    }
    Ok(())
}
