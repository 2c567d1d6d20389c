//! Authentication extractor
//!
//! Protects routes that require a signed-in user.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use super::verifier::Principal;
use crate::AppState;
use crate::error::AppError;
use crate::metrics::PRINCIPAL_RESOLUTIONS_TOTAL;

/// Extractor for the current authenticated principal
///
/// Rejects with `AppError::Unauthorized` when the verifier resolves no
/// principal.
///
/// # Usage
/// ```ignore
/// async fn handler(
///     CurrentPrincipal(principal): CurrentPrincipal,
/// ) -> impl IntoResponse {
///     format!("Hello, {}", principal.address())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentPrincipal(pub Principal);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentPrincipal
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(principal) = parts.extensions.get::<Principal>().cloned() {
            return Ok(CurrentPrincipal(principal));
        }

        let state = AppState::from_ref(state);
        let Some(principal) = state.verifier.resolve_principal(&parts.headers).await else {
            PRINCIPAL_RESOLUTIONS_TOTAL
                .with_label_values(&["rejected"])
                .inc();
            tracing::debug!(path = %parts.uri.path(), "No session principal for request");
            return Err(AppError::Unauthorized);
        };

        PRINCIPAL_RESOLUTIONS_TOTAL
            .with_label_values(&["resolved"])
            .inc();
        parts.extensions.insert(principal.clone());

        Ok(CurrentPrincipal(principal))
    }
}
