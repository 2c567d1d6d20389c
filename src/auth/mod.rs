//! Auth provider integration
//!
//! Handles:
//! - Webhook provenance checks
//! - Session token issuing and verification
//! - The authenticated-principal extractor

mod middleware;
pub mod session;
mod verifier;

pub use middleware::CurrentPrincipal;
pub use session::{SessionClaims, create_session_token, verify_session_token};
pub use verifier::{Principal, ProviderVerifier, RequestVerifier};

#[cfg(test)]
pub use verifier::MockRequestVerifier;
