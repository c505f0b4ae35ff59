//! Test harness: an in-process stub of the order-management backend.
//!
//! The stub speaks the same REST surface the dashboard client consumes -
//! bearer-token auth, Spanish field names, enveloped productos payloads,
//! direct clientes/pedidos payloads - and binds to an ephemeral port so
//! every test run is self-contained. Tests drive the real dashboard
//! library against it.
//!
//! Seeded accounts:
//! - `admin@example.com` / `sup3rsecreta` - roles `["ROLE_ADMIN", "ADMIN"]`
//! - `mozo@example.com` / `password1` - roles `[{"nombre": "USER"}]`

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::Router;
use axum::extract::{Path as UrlPath, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use serde_json::{Value, json};
use uuid::Uuid;

use comanda_dashboard::api::ApiClient;
use comanda_dashboard::config::DashboardConfig;
use comanda_dashboard::services::{AuthService, ClientsService, OrdersService, ProductsService};
use comanda_dashboard::session::{FileStore, SessionManager};

/// Admin account e-mail.
pub const ADMIN_EMAIL: &str = "admin@example.com";
/// Admin account password.
pub const ADMIN_PASSWORD: &str = "sup3rsecreta";
/// Plain-user account e-mail.
pub const USER_EMAIL: &str = "mozo@example.com";
/// Plain-user account password.
pub const USER_PASSWORD: &str = "password1";

/// Backend category constants served by the stub.
pub const CATEGORIES: &[&str] = &["PIZZAS", "BEBIDAS_ALCOHOLICAS", "POSTRES"];

// =============================================================================
// Stub state
// =============================================================================

#[derive(Debug)]
struct StubState {
    /// token -> user id
    tokens: HashMap<String, i64>,
    clients: Vec<Value>,
    products: Vec<Value>,
    orders: Vec<Value>,
    next_client_id: i64,
    next_order_id: i64,
    /// Count of write requests that reached the stub, authorized or not.
    mutations: usize,
}

type SharedState = Arc<Mutex<StubState>>;

fn seeded_state() -> StubState {
    StubState {
        tokens: HashMap::new(),
        clients: vec![
            json!({"id": 1, "nombre": "Juan", "apellidos": "Pérez", "email": "juan@example.com"}),
            json!({"id": 2, "nombre": "Ana", "apellidos": "Gómez", "telefono": "600111222"}),
        ],
        products: vec![
            json!({
                "id": 1, "nombre": "Pizza Margarita", "precio": 12.5,
                "categoria": "PIZZAS", "stockDisponible": 20, "estaActivo": true
            }),
            json!({
                "id": 2, "nombre": "Cerveza", "precio": 3.5,
                "categoria": "BEBIDAS_ALCOHOLICAS", "stockDisponible": 50, "estaActivo": true
            }),
            json!({
                "id": 3, "nombre": "Flan", "precio": 4.0,
                "categoria": "POSTRES", "stockDisponible": 10, "estaActivo": true
            }),
            json!({
                "id": 4, "nombre": "Plato retirado", "precio": 9.0,
                "categoria": "POSTRES", "stockDisponible": 0, "estaActivo": false
            }),
        ],
        orders: Vec::new(),
        next_client_id: 3,
        next_order_id: 1,
        mutations: 0,
    }
}

// =============================================================================
// Harness
// =============================================================================

/// A running stub backend.
pub struct StubBackend {
    /// Base URL of the stub, e.g. `http://127.0.0.1:49152`.
    pub base_url: String,
    state: SharedState,
}

impl StubBackend {
    /// Bind the stub to an ephemeral port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn spawn() -> Self {
        let state: SharedState = Arc::new(Mutex::new(seeded_state()));
        let app = router(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub listener");
        let addr: SocketAddr = listener.local_addr().expect("stub local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve stub");
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    fn lock(&self) -> MutexGuard<'_, StubState> {
        self.state.lock().expect("stub state lock")
    }

    /// Revoke every issued token; the next authenticated call gets a 401.
    pub fn revoke_all_tokens(&self) {
        self.lock().tokens.clear();
    }

    /// Number of write requests that have reached the stub.
    #[must_use]
    pub fn mutation_count(&self) -> usize {
        self.lock().mutations
    }

    /// Seed one order directly into the stub, bypassing the API.
    ///
    /// Returns the order id.
    pub fn seed_order(&self, status: &str) -> i64 {
        let mut state = self.lock();
        let id = state.next_order_id;
        state.next_order_id += 1;
        state.orders.push(json!({
            "id": id,
            "clienteId": 1,
            "fechaPedido": "2025-03-01T12:00:00Z",
            "estado": status,
            "total": 16.0,
            "detalles": [
                {"productoId": 1, "cantidad": 1, "precioUnitario": 12.5},
                {"productoId": 2, "cantidad": 1, "subtotal": 3.5}
            ]
        }));
        id
    }
}

/// The dashboard library wired against a stub backend.
pub struct TestApp {
    pub session: Arc<SessionManager>,
    pub auth: AuthService,
    pub clients: ClientsService,
    pub products: ProductsService,
    pub orders: OrdersService,
}

impl TestApp {
    /// Build the client stack against `base_url`, persisting the session
    /// under `session_dir`, and restore whatever session is stored there.
    ///
    /// # Panics
    ///
    /// Panics if the base URL does not parse or the HTTP client fails to
    /// build.
    pub async fn connect(base_url: &str, session_dir: &Path) -> Self {
        let config = DashboardConfig {
            api_base_url: base_url.parse().expect("stub base url"),
            timeout: Duration::from_secs(5),
            session_dir: session_dir.to_path_buf(),
        };
        let api = ApiClient::new(&config).expect("api client");
        let store = FileStore::new(config.session_dir.clone());

        let session = Arc::new(SessionManager::new(api.clone(), Box::new(store)));
        session.restore().await;

        Self {
            auth: AuthService::new(api.clone()),
            clients: ClientsService::new(api.clone(), session.clone()),
            products: ProductsService::new(api.clone(), session.clone()),
            orders: OrdersService::new(api, session.clone()),
            session,
        }
    }
}

// =============================================================================
// Router
// =============================================================================

fn router(state: SharedState) -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me))
        .route("/api/clientes", get(clients_list).post(clients_create))
        .route("/api/clientes/search", get(clients_search))
        .route(
            "/api/clientes/{id}",
            put(clients_update).delete(clients_delete),
        )
        .route("/api/productos", get(products_list).post(products_create))
        .route("/api/productos/search", get(products_search))
        .route("/api/productos/categorias", get(products_categories))
        .route("/api/productos/categoria/{cat}", get(products_by_category))
        .route("/api/productos/admin/all", get(products_all))
        .route(
            "/api/productos/{id}",
            get(products_get).put(products_update).delete(products_delete),
        )
        .route("/api/pedidos", get(orders_list).post(orders_create))
        .route("/api/pedidos/{id}", put(orders_update).delete(orders_delete))
        .route("/api/pedidos/{id}/estado", put(orders_status))
        .with_state(state)
}

// =============================================================================
// Helpers
// =============================================================================

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
}

fn authorize(state: &MutexGuard<'_, StubState>, headers: &HeaderMap) -> Result<i64, Response> {
    bearer(headers)
        .and_then(|token| state.tokens.get(&token).copied())
        .ok_or_else(|| StatusCode::UNAUTHORIZED.into_response())
}

fn envelope(data: Value) -> Value {
    json!({"success": true, "data": data, "message": null})
}

fn id_of(record: &Value) -> i64 {
    record.get("id").and_then(Value::as_i64).unwrap_or_default()
}

fn contains_query(record: &Value, fields: &[&str], query: &str) -> bool {
    let needle = query.to_lowercase();
    fields.iter().any(|field| {
        record
            .get(field)
            .and_then(Value::as_str)
            .is_some_and(|value| value.to_lowercase().contains(&needle))
    })
}

// =============================================================================
// Auth handlers
// =============================================================================

async fn login(State(state): State<SharedState>, body: String) -> Response {
    let Ok(credentials) = serde_json::from_str::<Value>(&body) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let user = credentials
        .get("usernameOrEmail")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let password = credentials
        .get("password")
        .and_then(Value::as_str)
        .unwrap_or_default();

    let account = match (user, password) {
        (ADMIN_EMAIL, ADMIN_PASSWORD) => json!({
            "id": 1,
            "nombre": "Ana Admin",
            "roles": ["ROLE_ADMIN", "ADMIN"]
        }),
        (USER_EMAIL, USER_PASSWORD) => json!({
            "id": 2,
            "username": "mozo",
            "roles": [{"nombre": "USER"}]
        }),
        _ => {
            return (StatusCode::UNAUTHORIZED, "Bad credentials").into_response();
        }
    };

    let token = Uuid::new_v4().to_string();
    let mut locked = state.lock().expect("stub state lock");
    locked
        .tokens
        .insert(token.clone(), id_of(&account));

    let mut response = account;
    if let Some(fields) = response.as_object_mut() {
        fields.insert("accessToken".to_string(), json!(token));
    }
    axum::Json(response).into_response()
}

async fn logout(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let mut locked = state.lock().expect("stub state lock");
    if authorize(&locked, &headers).is_err() {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if let Some(token) = bearer(&headers) {
        locked.tokens.remove(&token);
    }
    StatusCode::OK.into_response()
}

async fn me(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let locked = state.lock().expect("stub state lock");
    match authorize(&locked, &headers) {
        Ok(1) => axum::Json(json!({
            "id": 1, "nombre": "Ana Admin", "email": ADMIN_EMAIL,
            "roles": ["ROLE_ADMIN", "ADMIN"]
        }))
        .into_response(),
        Ok(id) => axum::Json(json!({
            "id": id, "username": "mozo", "roles": [{"nombre": "USER"}]
        }))
        .into_response(),
        Err(response) => response,
    }
}

// =============================================================================
// Clientes handlers (direct payloads)
// =============================================================================

async fn clients_list(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let locked = state.lock().expect("stub state lock");
    match authorize(&locked, &headers) {
        Ok(_) => axum::Json(json!(locked.clients)).into_response(),
        Err(response) => response,
    }
}

async fn clients_search(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let locked = state.lock().expect("stub state lock");
    match authorize(&locked, &headers) {
        Ok(_) => {
            let query = params.get("query").map(String::as_str).unwrap_or_default();
            let hits: Vec<&Value> = locked
                .clients
                .iter()
                .filter(|client| contains_query(client, &["nombre", "apellidos"], query))
                .collect();
            axum::Json(json!(hits)).into_response()
        }
        Err(response) => response,
    }
}

async fn clients_create(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let mut locked = state.lock().expect("stub state lock");
    locked.mutations += 1;
    if let Err(response) = authorize(&locked, &headers) {
        return response;
    }
    let Ok(mut draft) = serde_json::from_str::<Value>(&body) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let id = locked.next_client_id;
    locked.next_client_id += 1;
    if let Some(fields) = draft.as_object_mut() {
        fields.insert("id".to_string(), json!(id));
    }
    locked.clients.push(draft.clone());
    axum::Json(draft).into_response()
}

async fn clients_update(
    State(state): State<SharedState>,
    UrlPath(id): UrlPath<i64>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let mut locked = state.lock().expect("stub state lock");
    locked.mutations += 1;
    if let Err(response) = authorize(&locked, &headers) {
        return response;
    }
    let Ok(mut draft) = serde_json::from_str::<Value>(&body) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    if let Some(fields) = draft.as_object_mut() {
        fields.insert("id".to_string(), json!(id));
    }
    let Some(slot) = locked.clients.iter_mut().find(|client| id_of(client) == id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    *slot = draft.clone();
    axum::Json(draft).into_response()
}

async fn clients_delete(
    State(state): State<SharedState>,
    UrlPath(id): UrlPath<i64>,
    headers: HeaderMap,
) -> Response {
    let mut locked = state.lock().expect("stub state lock");
    locked.mutations += 1;
    if let Err(response) = authorize(&locked, &headers) {
        return response;
    }
    let before = locked.clients.len();
    locked.clients.retain(|client| id_of(client) != id);
    let deleted = locked.clients.len() < before;
    axum::Json(json!({"deleted": deleted})).into_response()
}

// =============================================================================
// Productos handlers (enveloped payloads)
// =============================================================================

async fn products_list(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let locked = state.lock().expect("stub state lock");
    match authorize(&locked, &headers) {
        Ok(_) => {
            let active: Vec<&Value> = locked
                .products
                .iter()
                .filter(|product| {
                    product
                        .get("estaActivo")
                        .and_then(Value::as_bool)
                        .unwrap_or(false)
                })
                .collect();
            axum::Json(envelope(json!(active))).into_response()
        }
        Err(response) => response,
    }
}

async fn products_all(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let locked = state.lock().expect("stub state lock");
    match authorize(&locked, &headers) {
        Ok(_) => axum::Json(envelope(json!(locked.products))).into_response(),
        Err(response) => response,
    }
}

async fn products_get(
    State(state): State<SharedState>,
    UrlPath(id): UrlPath<i64>,
    headers: HeaderMap,
) -> Response {
    let locked = state.lock().expect("stub state lock");
    match authorize(&locked, &headers) {
        Ok(_) => locked
            .products
            .iter()
            .find(|product| id_of(product) == id)
            .map_or_else(
                || StatusCode::NOT_FOUND.into_response(),
                |product| axum::Json(envelope(product.clone())).into_response(),
            ),
        Err(response) => response,
    }
}

async fn products_search(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let locked = state.lock().expect("stub state lock");
    match authorize(&locked, &headers) {
        Ok(_) => {
            let query = params.get("query").map(String::as_str).unwrap_or_default();
            let hits: Vec<&Value> = locked
                .products
                .iter()
                .filter(|product| contains_query(product, &["nombre", "descripcion"], query))
                .collect();
            axum::Json(envelope(json!(hits))).into_response()
        }
        Err(response) => response,
    }
}

async fn products_categories(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let locked = state.lock().expect("stub state lock");
    match authorize(&locked, &headers) {
        Ok(_) => axum::Json(envelope(json!(CATEGORIES))).into_response(),
        Err(response) => response,
    }
}

async fn products_by_category(
    State(state): State<SharedState>,
    UrlPath(category): UrlPath<String>,
    headers: HeaderMap,
) -> Response {
    let locked = state.lock().expect("stub state lock");
    match authorize(&locked, &headers) {
        Ok(_) => {
            let hits: Vec<&Value> = locked
                .products
                .iter()
                .filter(|product| {
                    product.get("categoria").and_then(Value::as_str) == Some(category.as_str())
                })
                .collect();
            axum::Json(envelope(json!(hits))).into_response()
        }
        Err(response) => response,
    }
}

async fn products_create(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let mut locked = state.lock().expect("stub state lock");
    locked.mutations += 1;
    if let Err(response) = authorize(&locked, &headers) {
        return response;
    }
    let Ok(mut draft) = serde_json::from_str::<Value>(&body) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let id = locked
        .products
        .iter()
        .map(id_of)
        .max()
        .unwrap_or_default()
        + 1;
    if let Some(fields) = draft.as_object_mut() {
        fields.insert("id".to_string(), json!(id));
    }
    locked.products.push(draft.clone());
    axum::Json(envelope(draft)).into_response()
}

async fn products_update(
    State(state): State<SharedState>,
    UrlPath(id): UrlPath<i64>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let mut locked = state.lock().expect("stub state lock");
    locked.mutations += 1;
    if let Err(response) = authorize(&locked, &headers) {
        return response;
    }
    let Ok(mut draft) = serde_json::from_str::<Value>(&body) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    if let Some(fields) = draft.as_object_mut() {
        fields.insert("id".to_string(), json!(id));
    }
    let Some(slot) = locked
        .products
        .iter_mut()
        .find(|product| id_of(product) == id)
    else {
        return StatusCode::NOT_FOUND.into_response();
    };
    *slot = draft.clone();
    axum::Json(envelope(draft)).into_response()
}

async fn products_delete(
    State(state): State<SharedState>,
    UrlPath(id): UrlPath<i64>,
    headers: HeaderMap,
) -> Response {
    let mut locked = state.lock().expect("stub state lock");
    locked.mutations += 1;
    if let Err(response) = authorize(&locked, &headers) {
        return response;
    }
    locked.products.retain(|product| id_of(product) != id);
    axum::Json(json!({"success": true, "data": null, "message": "deleted"})).into_response()
}

// =============================================================================
// Pedidos handlers (direct payloads)
// =============================================================================

async fn orders_list(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let locked = state.lock().expect("stub state lock");
    match authorize(&locked, &headers) {
        Ok(_) => axum::Json(json!(locked.orders)).into_response(),
        Err(response) => response,
    }
}

async fn orders_create(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let mut locked = state.lock().expect("stub state lock");
    locked.mutations += 1;
    if let Err(response) = authorize(&locked, &headers) {
        return response;
    }
    let Ok(mut draft) = serde_json::from_str::<Value>(&body) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let id = locked.next_order_id;
    locked.next_order_id += 1;
    if let Some(fields) = draft.as_object_mut() {
        fields.insert("id".to_string(), json!(id));
        fields.insert(
            "fechaPedido".to_string(),
            json!("2025-03-01T12:00:00Z"),
        );
    }
    locked.orders.push(draft.clone());
    axum::Json(draft).into_response()
}

async fn orders_update(
    State(state): State<SharedState>,
    UrlPath(id): UrlPath<i64>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let mut locked = state.lock().expect("stub state lock");
    locked.mutations += 1;
    if let Err(response) = authorize(&locked, &headers) {
        return response;
    }
    let Ok(mut draft) = serde_json::from_str::<Value>(&body) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    if let Some(fields) = draft.as_object_mut() {
        fields.insert("id".to_string(), json!(id));
        fields
            .entry("fechaPedido")
            .or_insert(json!("2025-03-01T12:00:00Z"));
    }
    let Some(slot) = locked.orders.iter_mut().find(|order| id_of(order) == id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    *slot = draft.clone();
    axum::Json(draft).into_response()
}

async fn orders_delete(
    State(state): State<SharedState>,
    UrlPath(id): UrlPath<i64>,
    headers: HeaderMap,
) -> Response {
    let mut locked = state.lock().expect("stub state lock");
    locked.mutations += 1;
    if let Err(response) = authorize(&locked, &headers) {
        return response;
    }
    let before = locked.orders.len();
    locked.orders.retain(|order| id_of(order) != id);
    if locked.orders.len() < before {
        StatusCode::NO_CONTENT.into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

async fn orders_status(
    State(state): State<SharedState>,
    UrlPath(id): UrlPath<i64>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let mut locked = state.lock().expect("stub state lock");
    locked.mutations += 1;
    if let Err(response) = authorize(&locked, &headers) {
        return response;
    }
    let Some(status) = params.get("estado").cloned() else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let Some(order) = locked.orders.iter_mut().find(|order| id_of(order) == id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if let Some(fields) = order.as_object_mut() {
        fields.insert("estado".to_string(), json!(status));
        if status == "DELIVERED" {
            fields.insert(
                "fechaEntrega".to_string(),
                json!("2025-03-01T13:00:00Z"),
            );
        }
    }
    axum::Json(order.clone()).into_response()
}
