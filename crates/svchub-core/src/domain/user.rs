//! User entity - account with roles and explicit service grants

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role granting full access to every service and the admin API
pub const ADMIN_ROLE: &str = "admin";

/// Default role assigned to users created through registration approval
pub const DEFAULT_ROLE: &str = "user";

/// A gateway account.
///
/// `roles` and `services` are stored de-duplicated; `services` holds
/// explicit per-service grants independent of role membership.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    /// Unique, case-sensitive
    pub username: String,
    /// Argon2 PHC string, never exposed through the API
    pub password_hash: String,
    pub roles: Vec<String>,
    pub services: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a user from an already-computed password hash.
    ///
    /// Incoming roles and services are de-duplicated, preserving first
    /// occurrence order.
    pub fn from_hash(
        username: impl Into<String>,
        password_hash: impl Into<String>,
        roles: Vec<String>,
        services: Vec<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            password_hash: password_hash.into(),
            roles: dedup_preserving_order(roles),
            services: dedup_preserving_order(services),
            created_at: Utc::now(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| r == ADMIN_ROLE)
    }
}

/// De-duplicate a set of names, keeping the first occurrence of each.
pub fn dedup_preserving_order(values: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    values
        .into_iter()
        .filter(|v| seen.insert(v.clone()))
        .collect()
}
