//! Wire models for the backend's REST API.
//!
//! Field names on the wire follow the backend's Spanish vocabulary; the
//! Rust structs expose the domain names and map with `#[serde(rename)]`.

pub mod client;
pub mod order;
pub mod product;
pub mod user;

pub use client::{Client, ClientDraft, DeleteAck};
pub use order::{Order, OrderDraft, OrderLine, compute_total};
pub use product::{Product, ProductDraft, format_category_name};
pub use user::User;
