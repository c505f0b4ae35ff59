//! Comanda Core - Shared types library.
//!
//! This crate provides common types used across all Comanda components:
//! - `dashboard` - Client library for the order-management backend
//! - `cli` - Terminal front end driving the dashboard library
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, the user role model, and the order status
//!   state machine

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
