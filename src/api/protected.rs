//! Example authenticated route
//!
//! Shows how to gate a handler on the session token issued once the user
//! has signed in with the provider.

use axum::{Router, response::Json, routing::get};

use super::dto::OkResponse;
use crate::AppState;
use crate::auth::CurrentPrincipal;

/// Create protected router
///
/// Routes:
/// - GET /my-route
pub fn protected_router() -> Router<AppState> {
    Router::new().route("/my-route", get(my_route))
}

/// GET /my-route
///
/// `CurrentPrincipal` answers 401 before this runs when the request has no
/// valid session. A real handler would load the user by address here.
async fn my_route(CurrentPrincipal(principal): CurrentPrincipal) -> Json<OkResponse> {
    tracing::debug!(address = %principal, "Authorized request");
    Json(OkResponse { ok: true })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::auth::{MockRequestVerifier, Principal};
    use crate::service::ExampleProvisioner;

    fn app(principal: Option<&'static str>) -> Router {
        let mut verifier = MockRequestVerifier::new();
        verifier
            .expect_resolve_principal()
            .times(1)
            .returning(move |_| principal.map(Principal::new));
        verifier.expect_verify_webhook_provenance().never();

        let state = AppState::with_components(
            crate::config::test_config(),
            Arc::new(verifier),
            Arc::new(ExampleProvisioner),
        );
        protected_router().with_state(state)
    }

    async fn get(app: Router) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::get("/my-route").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn resolved_principal_gets_ok() {
        let (status, body) = get(app(Some("0xabc"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ok": true }));
    }

    #[tokio::test]
    async fn missing_principal_is_401() {
        let (status, body) = get(app(None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "message": "Unauthorized request" }));
    }
}
