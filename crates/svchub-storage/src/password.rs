//! Argon2 password hashing
//!
//! Hashes are stored as PHC strings; verification parses the embedded
//! parameters and salt, so rehashing with different defaults stays
//! backward compatible.

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash, SaltString};

use svchub_core::{Error, Result};

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|_| Error::PasswordHash)?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|_| Error::PasswordHash)?;
    let phc = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| Error::PasswordHash)?
        .to_string();
    Ok(phc)
}

/// Verify a password against a stored PHC string.
pub fn verify_password(hash: &str, password: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
