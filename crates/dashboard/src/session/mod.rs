//! Session state: durable storage, the session manager, and transient
//! notifications.
//!
//! The manager is the single writer of the durable session record and the
//! single owner of the "redirect to login" decision; the transport and the
//! resource services only raise typed errors.

pub mod manager;
pub mod notifications;
pub mod store;

pub use manager::{AuthState, SessionManager};
pub use notifications::{Notice, NoticeLevel, Notifier};
pub use store::{FileStore, LoadedSession, MemoryStore, SessionStore, StoreError};
