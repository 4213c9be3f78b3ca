//! SessionIdentity - the verified token payload
//!
//! Immutable once issued; a user's roles and grants are only refreshed by
//! issuing a new token at the next login.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::{User, ADMIN_ROLE};

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionIdentity {
    /// User id
    #[serde(rename = "sub")]
    pub subject: Uuid,
    pub username: String,
    pub roles: Vec<String>,
    pub services: Vec<String>,
    /// Issued-at, unix seconds
    pub iat: i64,
    /// Expiry, unix seconds
    pub exp: i64,
}

impl SessionIdentity {
    /// Snapshot a user's identity into claims valid for `ttl_secs`.
    pub fn for_user(user: &User, now: i64, ttl_secs: i64) -> Self {
        Self {
            subject: user.id,
            username: user.username.clone(),
            roles: user.roles.clone(),
            services: user.services.clone(),
            iat: now,
            exp: now + ttl_secs,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| r == ADMIN_ROLE)
    }
}
