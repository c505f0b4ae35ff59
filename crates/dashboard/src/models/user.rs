//! The authenticated user's cached profile.

use serde::{Deserialize, Serialize};

use comanda_core::{Role, UserId};

/// Profile derived from a login response.
///
/// Immutable for the lifetime of the session; the role gates every write
/// operation in every resource screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Backend user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email used to log in.
    pub email: String,
    /// Resolved role.
    pub role: Role,
}

impl User {
    /// Whether this user may invoke write operations.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
