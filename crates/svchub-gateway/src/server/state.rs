//! Shared application state
//!
//! Every store is an explicitly constructed component injected into the
//! handlers through this state; nothing lives in ambient/static scope.

use std::sync::Arc;

use svchub_storage::{RegistrationStore, ServiceRegistry, UserStore};

use crate::token::TokenService;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserStore>,
    pub registrations: Arc<RegistrationStore>,
    pub registry: Arc<ServiceRegistry>,
    pub tokens: Arc<TokenService>,
    /// Shared client for upstream dispatch; connection pooling lives here
    pub http: reqwest::Client,
    pub default_proxy_target: String,
}
