//! Resource services: stateless request/response wrappers around the
//! backend's REST endpoints.
//!
//! Services never retry and never swallow failures; every error surfaces
//! to the calling UI action, which reports it through the session
//! manager's notifier. Mutating operations pass the admin gate before any
//! request is issued.

pub mod auth;
pub mod clients;
pub mod orders;
pub mod products;

pub use auth::AuthService;
pub use clients::ClientsService;
pub use orders::OrdersService;
pub use products::ProductsService;
