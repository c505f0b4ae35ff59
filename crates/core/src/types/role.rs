//! User roles and login-claim normalization.
//!
//! The backend reports roles in two shapes, sometimes in the same list: a
//! plain string (`"ADMIN"`, `"ROLE_ADMIN"`) or an object carrying the name
//! in a `nombre` field. [`RoleClaim`] models both shapes explicitly and
//! [`Role::from_claims`] collapses them into the single role that gates
//! every write operation in the dashboard.

use serde::{Deserialize, Serialize};

/// Role of the logged-in user.
///
/// `Admin` unlocks create/edit/delete across every resource screen;
/// everyone else is read-only. The backend remains the authoritative
/// enforcer; this value only drives the client-side gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Full access to all resource screens.
    Admin,
    /// Read-only access.
    #[default]
    User,
}

impl Role {
    /// Whether this role may invoke write operations.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Resolve the effective role from a login response's claim list.
    ///
    /// Any claim naming an admin marker yields [`Role::Admin`]; an empty
    /// list yields [`Role::User`]. Matching is case-insensitive and accepts
    /// both the bare marker and its `ROLE_`-prefixed form.
    #[must_use]
    pub fn from_claims(claims: &[RoleClaim]) -> Self {
        if claims.iter().any(|claim| is_admin_marker(claim.name())) {
            Self::Admin
        } else {
            Self::User
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "ADMIN"),
            Self::User => write!(f, "USER"),
        }
    }
}

/// One entry of a login response's `roles` array.
///
/// The backend emits either bare strings or objects with a `nombre` field;
/// the untagged representation accepts both without a custom deserializer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoleClaim {
    /// Plain string form, e.g. `"ROLE_ADMIN"`.
    Name(String),
    /// Object form, e.g. `{"nombre": "ADMIN"}`.
    Named {
        /// Role name as reported by the backend.
        nombre: String,
    },
}

impl RoleClaim {
    /// The claim's role name, regardless of shape.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) | Self::Named { nombre: name } => name,
        }
    }
}

fn is_admin_marker(name: &str) -> bool {
    name.eq_ignore_ascii_case("ADMIN") || name.eq_ignore_ascii_case("ROLE_ADMIN")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claim(name: &str) -> RoleClaim {
        RoleClaim::Name(name.to_string())
    }

    #[test]
    fn test_admin_from_string_claims() {
        let claims = vec![claim("ROLE_ADMIN"), claim("ADMIN")];
        assert_eq!(Role::from_claims(&claims), Role::Admin);
    }

    #[test]
    fn test_user_from_plain_claims() {
        assert_eq!(Role::from_claims(&[claim("USER")]), Role::User);
        assert_eq!(Role::from_claims(&[claim("ROLE_USER")]), Role::User);
    }

    #[test]
    fn test_user_from_empty_claims() {
        assert_eq!(Role::from_claims(&[]), Role::User);
    }

    #[test]
    fn test_admin_from_object_claims() {
        let claims = vec![RoleClaim::Named {
            nombre: "ADMIN".to_string(),
        }];
        assert_eq!(Role::from_claims(&claims), Role::Admin);

        let claims = vec![RoleClaim::Named {
            nombre: "ROLE_ADMIN".to_string(),
        }];
        assert_eq!(Role::from_claims(&claims), Role::Admin);
    }

    #[test]
    fn test_marker_match_is_case_insensitive() {
        assert_eq!(Role::from_claims(&[claim("admin")]), Role::Admin);
        assert_eq!(Role::from_claims(&[claim("Role_Admin")]), Role::Admin);
    }

    #[test]
    fn test_mixed_shapes_resolve_admin() {
        let claims = vec![
            claim("ROLE_USER"),
            RoleClaim::Named {
                nombre: "ROLE_ADMIN".to_string(),
            },
        ];
        assert_eq!(Role::from_claims(&claims), Role::Admin);
    }

    #[test]
    fn test_claim_deserializes_both_shapes() {
        let claims: Vec<RoleClaim> =
            serde_json::from_str(r#"["ROLE_ADMIN", {"nombre": "USER"}]"#).expect("valid claims");
        assert_eq!(claims.len(), 2);
        assert_eq!(claims.first().map(RoleClaim::name), Some("ROLE_ADMIN"));
        assert_eq!(claims.get(1).map(RoleClaim::name), Some("USER"));
    }

    #[test]
    fn test_role_serde_names() {
        assert_eq!(
            serde_json::to_string(&Role::Admin).expect("serialize"),
            "\"ADMIN\""
        );
        let role: Role = serde_json::from_str("\"USER\"").expect("valid role");
        assert_eq!(role, Role::User);
    }
}
