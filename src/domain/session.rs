//! Authenticated session context passed to every request-issuing component.

use serde::{Deserialize, Serialize};

/// Administrative role reported by the backend for the signed-in user.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    #[default]
    Admin,
    SuperAdmin,
}

impl AdminRole {
    /// Whether this role satisfies `required`.
    pub fn grants(self, required: AdminRole) -> bool {
        match required {
            AdminRole::Admin => true,
            AdminRole::SuperAdmin => self == AdminRole::SuperAdmin,
        }
    }
}

/// User object returned alongside the bearer token at sign-in.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionUser {
    #[serde(deserialize_with = "crate::domain::row::id_as_string")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: AdminRole,
}

/// Bearer token plus user, the single source of truth for "is authenticated".
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionContext {
    pub token: String,
    pub user: SessionUser,
}

impl SessionContext {
    pub fn new(token: impl Into<String>, user: SessionUser) -> Self {
        Self {
            token: token.into(),
            user,
        }
    }

    /// Key used to partition shared caches between signed-in users.
    pub fn cache_scope(&self) -> &str {
        &self.user.id
    }

    pub fn has_role(&self, required: AdminRole) -> bool {
        self.user.role.grants(required)
    }
}
