//! Domain entities and value objects
//!
//! - `User` - account with roles and explicit service grants
//! - `RegistrationRequest` - pending/approved/rejected signup
//! - `ServiceManifest` / `ServiceRuntime` - backend service configuration
//! - `SessionIdentity` - verified token payload

mod identity;
mod registration;
mod service;
mod user;

pub use identity::*;
pub use registration::*;
pub use service::*;
pub use user::*;
