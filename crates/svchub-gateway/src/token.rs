//! Signed session tokens
//!
//! Token format: `base64url(payload_json).base64url(hmac_sha256(payload_b64))`,
//! no padding. The payload is the full [`SessionIdentity`] including
//! issued/expiry timestamps, so tokens are self-contained — there is no
//! server-side session table and no revocation list; expiry is the only
//! lifecycle bound.

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

use svchub_core::{SessionIdentity, User};

type HmacSha256 = Hmac<Sha256>;

/// Fixed session lifetime: 8 hours from issuance
pub const TOKEN_TTL_SECS: i64 = 8 * 60 * 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
}

pub struct TokenService {
    secret: Vec<u8>,
}

impl TokenService {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Issue a token snapshotting the user's current roles and grants.
    pub fn issue(&self, user: &User) -> String {
        self.issue_with_ttl(user, TOKEN_TTL_SECS)
    }

    /// Issue with an explicit TTL. Negative TTLs produce already-expired
    /// tokens, which the expiry tests rely on.
    pub fn issue_with_ttl(&self, user: &User, ttl_secs: i64) -> String {
        let identity = SessionIdentity::for_user(user, Utc::now().timestamp(), ttl_secs);
        let payload = serde_json::to_string(&identity).expect("identity serializes");
        let payload_b64 = base64_url_encode(payload.as_bytes());

        let mut mac =
            HmacSha256::new_from_slice(&self.secret).expect("HMAC can take key of any size");
        mac.update(payload_b64.as_bytes());
        let signature_b64 = base64_url_encode(&mac.finalize().into_bytes());

        format!("{}.{}", payload_b64, signature_b64)
    }

    /// Verify a token and recover the identity it carries.
    pub fn verify(&self, token: &str) -> Result<SessionIdentity, TokenError> {
        let (payload_b64, signature_b64) =
            token.split_once('.').ok_or(TokenError::Malformed)?;
        if payload_b64.is_empty() || signature_b64.contains('.') {
            return Err(TokenError::Malformed);
        }

        let mut mac =
            HmacSha256::new_from_slice(&self.secret).expect("HMAC can take key of any size");
        mac.update(payload_b64.as_bytes());
        let signature = base64_url_decode(signature_b64).ok_or(TokenError::Malformed)?;
        if mac.verify_slice(&signature).is_err() {
            return Err(TokenError::InvalidSignature);
        }

        let payload = base64_url_decode(payload_b64).ok_or(TokenError::Malformed)?;
        let identity: SessionIdentity =
            serde_json::from_slice(&payload).map_err(|_| TokenError::Malformed)?;

        if Utc::now().timestamp() > identity.exp {
            return Err(TokenError::Expired);
        }
        Ok(identity)
    }
}

fn base64_url_encode(data: &[u8]) -> String {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    URL_SAFE_NO_PAD.encode(data)
}

fn base64_url_decode(s: &str) -> Option<Vec<u8>> {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    URL_SAFE_NO_PAD.decode(s).ok()
}
