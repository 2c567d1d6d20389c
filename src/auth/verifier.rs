//! Request verification
//!
//! The two checks the handlers depend on: webhook provenance and session
//! principal resolution. Handlers only see the [`RequestVerifier`] trait;
//! [`ProviderVerifier`] is the implementation wired into the binary.

use std::fmt;

use axum::async_trait;
use axum::http::{HeaderMap, HeaderName};
use axum_extra::extract::CookieJar;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use super::session::{SessionClaims, create_session_token, verify_session_token};
use crate::config::AuthConfig;
use crate::error::AppError;

/// Authenticated identity behind a request: the user's address
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Principal(String);

impl Principal {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn address(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Verification capabilities provided by the auth provider integration
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RequestVerifier: Send + Sync {
    /// Whether the webhook request was sent by the trusted provider
    async fn verify_webhook_provenance(&self, headers: &HeaderMap, body: &[u8]) -> bool;

    /// Address of the signed-in user, or `None` when the credential is
    /// missing, malformed or expired
    async fn resolve_principal(&self, headers: &HeaderMap) -> Option<Principal>;
}

/// Verifier backed by a shared webhook API key and HMAC session tokens
pub struct ProviderVerifier {
    api_key_digest: [u8; 32],
    api_key_header: HeaderName,
    session_secret: String,
    session_header: HeaderName,
    session_cookie: String,
    session_max_age: chrono::Duration,
}

impl ProviderVerifier {
    pub fn from_config(config: &AuthConfig) -> Result<Self, AppError> {
        let parse_header = |key: &str, value: &str| {
            HeaderName::from_bytes(value.as_bytes())
                .map_err(|_| AppError::Config(format!("{key} is not a valid header name: {value}")))
        };

        Ok(Self {
            api_key_digest: digest(config.webhook_api_key.as_bytes()),
            api_key_header: parse_header("auth.api_key_header", &config.api_key_header)?,
            session_secret: config.session_secret.clone(),
            session_header: parse_header("auth.session_header", &config.session_header)?,
            session_cookie: config.session_cookie.clone(),
            session_max_age: chrono::Duration::seconds(config.session_max_age),
        })
    }

    /// Mint a session token for `address`
    pub fn issue_token(&self, address: &str) -> Result<String, AppError> {
        let claims = SessionClaims::new(address, self.session_max_age);
        create_session_token(&claims, &self.session_secret)
    }

    /// Token from `Authorization: Bearer`, the session header or the session cookie
    fn extract_token(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .or_else(|| {
                headers
                    .get(&self.session_header)
                    .and_then(|h| h.to_str().ok())
            })
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(ToOwned::to_owned)
            .or_else(|| {
                let jar = CookieJar::from_headers(headers);
                jar.get(&self.session_cookie)
                    .map(|cookie| cookie.value().to_owned())
            })
    }
}

#[async_trait]
impl RequestVerifier for ProviderVerifier {
    async fn verify_webhook_provenance(&self, headers: &HeaderMap, _body: &[u8]) -> bool {
        let Some(presented) = headers
            .get(&self.api_key_header)
            .and_then(|h| h.to_str().ok())
        else {
            tracing::debug!(header = %self.api_key_header, "Webhook API key header missing");
            return false;
        };

        digest(presented.as_bytes())[..]
            .ct_eq(&self.api_key_digest[..])
            .into()
    }

    async fn resolve_principal(&self, headers: &HeaderMap) -> Option<Principal> {
        let token = self.extract_token(headers)?;

        match verify_session_token(&token, &self.session_secret) {
            Ok(claims) => Some(Principal::new(claims.address)),
            Err(error) => {
                tracing::debug!(%error, "Session token rejected");
                None
            }
        }
    }
}

fn digest(bytes: &[u8]) -> [u8; 32] {
    Sha256::digest(bytes).into()
}
