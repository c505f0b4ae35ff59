//! HTTP transport for the backend REST API.
//!
//! [`ApiClient`] owns the reqwest client, the base URL, and the bearer
//! token installed by the session manager. Every authenticated request
//! attaches the token; status codes are mapped to typed [`ApiError`]
//! variants before any body decoding happens.
//!
//! The transport raises errors only. A 401 becomes
//! [`ApiError::Unauthorized`] and nothing else: session teardown and the
//! redirect to login belong to the session manager, never to this layer.
//!
//! Some endpoints wrap their payload in an envelope carrying a success flag
//! and a `data` field; others return the payload directly. The `*_enveloped`
//! helpers unwrap the former, the plain helpers decode the latter, and each
//! service uses the variant its endpoints actually speak.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, de::DeserializeOwned};
use tokio::sync::RwLock;
use tracing::instrument;

use crate::config::DashboardConfig;
use crate::error::{ApiError, Result};

/// Maximum number of body characters carried into an error message.
const ERROR_BODY_LIMIT: usize = 200;

/// Client for the backend REST API.
///
/// Cheaply cloneable; all clones share the bearer token, so installing or
/// clearing it on one handle affects every request in flight after that.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
    /// Bearer token for authenticated requests; absent when logged out.
    token: RwLock<Option<SecretString>>,
}

/// Response wrapper used by the enveloped endpoints.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    message: Option<String>,
}

impl ApiClient {
    /// Create a new API client without a token.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &DashboardConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        let base_url = config.api_base_url.as_str().trim_end_matches('/').to_string();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url,
                token: RwLock::new(None),
            }),
        })
    }

    // =========================================================================
    // Token lifecycle (written only by the session manager)
    // =========================================================================

    /// Install the bearer token for subsequent requests.
    pub async fn set_token(&self, token: SecretString) {
        *self.inner.token.write().await = Some(token);
    }

    /// Remove the bearer token.
    pub async fn clear_token(&self) {
        *self.inner.token.write().await = None;
    }

    /// Whether a bearer token is currently installed.
    pub async fn has_token(&self) -> bool {
        self.inner.token.read().await.is_some()
    }

    // =========================================================================
    // Direct-payload helpers
    // =========================================================================

    /// GET a direct JSON payload.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send(Method::GET, path, &[], None).await?;
        decode(response).await
    }

    /// GET a direct JSON payload with query parameters.
    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let response = self.send(Method::GET, path, query, None).await?;
        decode(response).await
    }

    /// POST a JSON body, decoding a direct JSON payload.
    pub async fn post<B: serde::Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let body = serde_json::to_value(body).map_err(|e| ApiError::Parse(e.to_string()))?;
        let response = self.send(Method::POST, path, &[], Some(body)).await?;
        decode(response).await
    }

    /// POST without a body, ignoring the response payload.
    pub async fn post_empty(&self, path: &str) -> Result<()> {
        self.send(Method::POST, path, &[], None).await?;
        Ok(())
    }

    /// PUT a JSON body, decoding a direct JSON payload.
    pub async fn put<B: serde::Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let body = serde_json::to_value(body).map_err(|e| ApiError::Parse(e.to_string()))?;
        let response = self.send(Method::PUT, path, &[], Some(body)).await?;
        decode(response).await
    }

    /// PUT with query parameters and no body, decoding a direct payload.
    pub async fn put_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let response = self.send(Method::PUT, path, query, None).await?;
        decode(response).await
    }

    /// DELETE, decoding a direct JSON payload.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send(Method::DELETE, path, &[], None).await?;
        decode(response).await
    }

    /// DELETE, ignoring the response payload.
    pub async fn delete_empty(&self, path: &str) -> Result<()> {
        self.send(Method::DELETE, path, &[], None).await?;
        Ok(())
    }

    // =========================================================================
    // Enveloped helpers
    // =========================================================================

    /// GET an enveloped payload.
    pub async fn get_enveloped<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send(Method::GET, path, &[], None).await?;
        unwrap_envelope(decode(response).await?)
    }

    /// GET an enveloped payload with query parameters.
    pub async fn get_enveloped_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let response = self.send(Method::GET, path, query, None).await?;
        unwrap_envelope(decode(response).await?)
    }

    /// POST a JSON body, unwrapping an enveloped payload.
    pub async fn post_enveloped<B: serde::Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let body = serde_json::to_value(body).map_err(|e| ApiError::Parse(e.to_string()))?;
        let response = self.send(Method::POST, path, &[], Some(body)).await?;
        unwrap_envelope(decode(response).await?)
    }

    /// PUT a JSON body, unwrapping an enveloped payload.
    pub async fn put_enveloped<B: serde::Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let body = serde_json::to_value(body).map_err(|e| ApiError::Parse(e.to_string()))?;
        let response = self.send(Method::PUT, path, &[], Some(body)).await?;
        unwrap_envelope(decode(response).await?)
    }

    /// DELETE against an enveloped endpoint, checking only the success flag.
    pub async fn delete_enveloped_ack(&self, path: &str) -> Result<()> {
        let response = self.send(Method::DELETE, path, &[], None).await?;
        let envelope: Envelope<serde_json::Value> = decode(response).await?;
        if envelope.success {
            Ok(())
        } else {
            Err(ApiError::Envelope(
                envelope
                    .message
                    .unwrap_or_else(|| "backend reported failure".to_string()),
            ))
        }
    }

    // =========================================================================
    // Request execution
    // =========================================================================

    /// Build, send, and status-check one request.
    #[instrument(skip(self, body), fields(method = %method, path = %path))]
    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<serde_json::Value>,
    ) -> Result<reqwest::Response> {
        let url = format!("{}{path}", self.inner.base_url);
        let mut request = self.inner.client.request(method, url);

        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = self.inner.token.read().await.as_ref() {
            request = request.bearer_auth(token.expose_secret());
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let message = error_body(response).await;
        tracing::debug!(status = %status, message = %message, "Backend returned an error");

        match status {
            StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized),
            StatusCode::FORBIDDEN => Err(ApiError::Forbidden(message)),
            StatusCode::NOT_FOUND => Err(ApiError::NotFound(message)),
            _ => Err(ApiError::Api {
                status: status.as_u16(),
                message,
            }),
        }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Decode a response body, reading text first for better diagnostics.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| {
        tracing::debug!(
            error = %e,
            body = %text.chars().take(ERROR_BODY_LIMIT).collect::<String>(),
            "Failed to decode response body"
        );
        ApiError::Parse(e.to_string())
    })
}

/// Collapse an error response body into a short message.
async fn error_body(response: reqwest::Response) -> String {
    let text = response.text().await.unwrap_or_default();
    let trimmed: String = text.chars().take(ERROR_BODY_LIMIT).collect();
    if trimmed.is_empty() {
        "(no response body)".to_string()
    } else {
        trimmed
    }
}

fn unwrap_envelope<T>(envelope: Envelope<T>) -> Result<T> {
    if !envelope.success {
        return Err(ApiError::Envelope(
            envelope
                .message
                .unwrap_or_else(|| "backend reported failure".to_string()),
        ));
    }
    envelope
        .data
        .ok_or_else(|| ApiError::Envelope("missing data in successful envelope".to_string()))
}
