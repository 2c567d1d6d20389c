//! Login webhook
//!
//! The auth provider calls this endpoint after a user completes sign-in.
//! The `user` in the response replaces the session user handed back to the
//! client.

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, header::CONTENT_TYPE},
    response::Json,
    routing::post,
};

use super::dto::{WebhookEnvelope, WebhookResponse};
use crate::AppState;
use crate::error::AppError;
use crate::metrics::WEBHOOK_REQUESTS_TOTAL;

/// Create webhook router
///
/// Routes:
/// - POST /spec/auth/success
pub fn webhook_router() -> Router<AppState> {
    Router::new().route("/spec/auth/success", post(auth_success))
}

/// POST /spec/auth/success
///
/// # Steps
/// 1. Check the request came from the provider (401 otherwise)
/// 2. Validate the `{ user }` envelope (400 otherwise)
/// 3. Run the user through the provisioner
/// 4. Return `{ user }`
///
/// The body is taken raw so provenance is decided before any parsing.
/// Bodies not sent as JSON are read as `{}` and so fail validation.
async fn auth_success(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, AppError> {
    if !state
        .verifier
        .verify_webhook_provenance(&headers, &body)
        .await
    {
        WEBHOOK_REQUESTS_TOTAL
            .with_label_values(&["rejected_provenance"])
            .inc();
        tracing::warn!("Webhook provenance check failed");
        return Err(AppError::InvalidApiKey);
    }

    let body: &[u8] = if is_json(&headers) {
        &body
    } else {
        tracing::debug!("Webhook body ignored: content type is not JSON");
        &[]
    };

    let envelope = WebhookEnvelope::from_body(body).map_err(|error| {
        WEBHOOK_REQUESTS_TOTAL
            .with_label_values(&["rejected_payload"])
            .inc();
        tracing::warn!(%error, "Webhook payload rejected");
        AppError::from(error)
    })?;

    let address = envelope.user.id.clone();
    let user = state
        .provisioner
        .provision(envelope.user)
        .await
        .inspect_err(|error| {
            WEBHOOK_REQUESTS_TOTAL.with_label_values(&["failed"]).inc();
            tracing::error!(%error, %address, "User provisioning failed");
        })?;

    WEBHOOK_REQUESTS_TOTAL
        .with_label_values(&["accepted"])
        .inc();
    tracing::info!(%address, "Login webhook accepted");

    Ok(Json(WebhookResponse { user }))
}

/// `application/json` or any `application/*+json`, parameters ignored
fn is_json(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers.get(CONTENT_TYPE).and_then(|h| h.to_str().ok()) else {
        return false;
    };

    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    mime == "application/json"
        || (mime.starts_with("application/") && mime.ends_with("+json"))
}
