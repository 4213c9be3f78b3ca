//! # Svchub Core Library
//!
//! Domain entities and business rules for the svchub gateway.
//!
//! ## Modules
//!
//! - `domain` - Core entities (User, RegistrationRequest, ServiceManifest, SessionIdentity)
//! - `env_subst` - `${VAR}` placeholder substitution for manifest fields
//! - `error` - Typed error taxonomy shared by the stores and the gateway

pub mod domain;
pub mod env_subst;
pub mod error;

// Re-export commonly used types
pub use domain::*;
pub use env_subst::substitute_env;
pub use error::{Error, Result};
