//! Svchub Gateway
//!
//! Multi-tenant gateway in one process:
//! - Bearer-token authentication (signed session tokens, 8 hour TTL)
//! - Role/grant-based access evaluation per request
//! - Reverse-proxy dispatch to per-service upstreams with path rewriting
//! - Service entry pages served with session context injected

pub mod access;
pub mod auth;
pub mod config;
pub mod error;
pub mod pages;
pub mod proxy;
pub mod server;
pub mod token;

pub use access::can_access;
pub use auth::{AdminIdentity, AuthIdentity};
pub use config::GatewayConfig;
pub use error::ApiError;
pub use server::{build_router, AppState, GatewayServer};
pub use token::{TokenError, TokenService, TOKEN_TTL_SECS};
