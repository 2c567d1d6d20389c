//! Session tokens
//!
//! HMAC-signed tokens carrying the signed-in user's address.
//! No server-side session storage needed.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Claims carried by a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Address of the signed-in user
    pub address: String,
    /// When the token was issued
    pub issued_at: DateTime<Utc>,
    /// When the token expires
    pub expires_at: DateTime<Utc>,
}

impl SessionClaims {
    /// Claims for `address`, valid for `max_age` from now
    pub fn new(address: impl Into<String>, max_age: Duration) -> Self {
        let now = Utc::now();
        Self {
            address: address.into(),
            issued_at: now,
            expires_at: now + max_age,
        }
    }

    /// Check if session is expired
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }
}

/// Create a signed session token
///
/// Token format: base64(payload).base64(hmac_sha256(payload))
///
/// # Arguments
/// * `claims` - Claims to encode
/// * `secret` - HMAC secret key
pub fn create_session_token(claims: &SessionClaims, secret: &str) -> Result<String, AppError> {
    use base64::{Engine as _, engine::general_purpose};
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    let payload = serde_json::to_string(claims).map_err(|e| AppError::Internal(e.into()))?;
    let payload_b64 = general_purpose::URL_SAFE_NO_PAD.encode(payload.as_bytes());

    type HmacSha256 = Hmac<Sha256>;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Encryption(e.to_string()))?;
    mac.update(payload_b64.as_bytes());
    let signature = mac.finalize().into_bytes();
    let signature_b64 = general_purpose::URL_SAFE_NO_PAD.encode(signature);

    Ok(format!("{}.{}", payload_b64, signature_b64))
}

/// Verify and decode a session token
///
/// # Errors
/// Returns `AppError::Unauthorized` if the token is malformed, the
/// signature does not match, the address is empty or the token expired.
pub fn verify_session_token(token: &str, secret: &str) -> Result<SessionClaims, AppError> {
    use base64::{Engine as _, engine::general_purpose};
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    // 1. Split token into payload and signature
    let (payload_b64, signature_b64) = token.split_once('.').ok_or(AppError::Unauthorized)?;
    if signature_b64.contains('.') {
        return Err(AppError::Unauthorized);
    }

    // 2. Verify HMAC signature
    type HmacSha256 = Hmac<Sha256>;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Encryption(e.to_string()))?;
    mac.update(payload_b64.as_bytes());

    let signature = general_purpose::URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| AppError::Unauthorized)?;

    mac.verify_slice(&signature)
        .map_err(|_| AppError::Unauthorized)?;

    // 3. Decode and deserialize payload
    let payload_bytes = general_purpose::URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| AppError::Unauthorized)?;

    let claims: SessionClaims =
        serde_json::from_slice(&payload_bytes).map_err(|_| AppError::Unauthorized)?;

    // 4. Reject empty or expired sessions
    if claims.address.is_empty() || claims.is_expired() {
        return Err(AppError::Unauthorized);
    }

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-32-bytes-long!!!";

    #[test]
    fn token_verifies_with_same_secret() {
        let claims = SessionClaims::new("0xabc", Duration::hours(1));
        let token = create_session_token(&claims, SECRET).unwrap();

        let decoded = verify_session_token(&token, SECRET).unwrap();
        assert_eq!(decoded, claims);
    }

    #[test]
    fn token_rejected_with_other_secret() {
        let claims = SessionClaims::new("0xabc", Duration::hours(1));
        let token = create_session_token(&claims, SECRET).unwrap();

        assert!(matches!(
            verify_session_token(&token, "another-secret-key-32-bytes-long"),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn expired_token_rejected() {
        let claims = SessionClaims::new("0xabc", Duration::seconds(-5));
        let token = create_session_token(&claims, SECRET).unwrap();

        assert!(matches!(
            verify_session_token(&token, SECRET),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn tampered_payload_rejected() {
        use base64::{Engine as _, engine::general_purpose};

        let claims = SessionClaims::new("0xabc", Duration::hours(1));
        let token = create_session_token(&claims, SECRET).unwrap();
        let (_, signature) = token.split_once('.').unwrap();

        let forged = SessionClaims::new("0xdef", Duration::hours(1));
        let forged_payload =
            general_purpose::URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged).unwrap());

        assert!(verify_session_token(&format!("{forged_payload}.{signature}"), SECRET).is_err());
    }

    #[test]
    fn malformed_tokens_rejected() {
        for token in ["", "no-dot", "a.b.c", "!!!.???"] {
            assert!(
                verify_session_token(token, SECRET).is_err(),
                "{token:?} should not verify"
            );
        }
    }
}
