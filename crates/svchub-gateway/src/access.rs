//! Access evaluation for (identity, service) pairs
//!
//! A pure decision, evaluated fresh on every request — roles and grants
//! can change between token issuance and manifest updates, so the result
//! is never cached. Absence of identity is handled earlier as 401; this
//! function only ever sees authenticated callers.

use svchub_core::{ServiceRuntime, SessionIdentity};

use crate::error::ApiError;

/// True iff the identity holds `admin`, carries an explicit grant for the
/// service, or shares at least one role with the service's required set.
pub fn can_access(identity: &SessionIdentity, service: &ServiceRuntime) -> bool {
    if identity.is_admin() {
        return true;
    }
    if identity.services.iter().any(|s| s == service.id()) {
        return true;
    }
    service
        .manifest
        .required_roles
        .iter()
        .any(|role| identity.roles.contains(role))
}

/// 403 unless [`can_access`] admits the caller.
pub fn ensure_access(
    identity: &SessionIdentity,
    service: &ServiceRuntime,
) -> Result<(), ApiError> {
    if can_access(identity, service) {
        Ok(())
    } else {
        Err(ApiError::forbidden("no access to this service"))
    }
}
