//! # Svchub Storage
//!
//! Durable stores backing the gateway. Each collection lives in memory,
//! is mirrored to disk as a whole-collection JSON rewrite on every
//! mutation, and serializes its mutations behind one async lock so
//! concurrent read-modify-write sequences cannot clobber each other.
//!
//! - `UserStore` - accounts (`users.json`)
//! - `RegistrationStore` - signup requests (`registration_requests.json`)
//! - `ServiceRegistry` - service manifests (one `service.config.json` per
//!   service directory)

pub mod password;
pub mod registration_store;
pub mod service_registry;
pub mod user_store;

pub use registration_store::RegistrationStore;
pub use service_registry::ServiceRegistry;
pub use user_store::UserStore;
