//! authhook - example server for an auth provider integration
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      API Layer (Axum)                        │
//! │  - POST /spec/auth/success (login webhook)                  │
//! │  - GET /my-route (session-protected example)                │
//! │  - GET /health, GET /metrics                                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │              Auth + Service Layer (traits)                   │
//! │  - RequestVerifier: webhook provenance, session principal   │
//! │  - UserProvisioner: enrich the signed-in user               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing is persisted; every request stands alone.
//!
//! # Modules
//!
//! - `api`: HTTP handlers and wire types
//! - `auth`: verifier trait, session tokens, principal extractor
//! - `service`: user provisioning hook
//! - `server`: bind/start/stop lifecycle
//! - `config`: Configuration management
//! - `error`: Error types

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod metrics;
pub mod server;
pub mod service;

use std::sync::Arc;

pub use server::{Server, ServerHandle};

/// Application state shared across all handlers
///
/// Immutable after construction; cloning only bumps reference counts.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::AppConfig>,

    /// Webhook provenance and session principal checks
    pub verifier: Arc<dyn auth::RequestVerifier>,

    /// Enrichment hook for signed-in users
    pub provisioner: Arc<dyn service::UserProvisioner>,
}

impl AppState {
    /// Initialize application state with the bundled provider verifier
    /// and example provisioner
    ///
    /// # Errors
    /// Returns error if the auth configuration cannot build a verifier
    pub fn new(config: config::AppConfig) -> Result<Self, error::AppError> {
        let verifier = auth::ProviderVerifier::from_config(&config.auth)?;

        tracing::info!(
            api_key_header = %config.auth.api_key_header,
            session_header = %config.auth.session_header,
            "Application state initialized"
        );

        Ok(Self::with_components(
            config,
            Arc::new(verifier),
            Arc::new(service::ExampleProvisioner),
        ))
    }

    /// Assemble state from explicit components
    pub fn with_components(
        config: config::AppConfig,
        verifier: Arc<dyn auth::RequestVerifier>,
        provisioner: Arc<dyn service::UserProvisioner>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            verifier,
            provisioner,
        }
    }
}

/// Build the Axum router with all routes.
///
/// This is shared by the binary and integration tests to keep route
/// composition consistent across environments.
pub fn build_router(state: AppState) -> axum::Router {
    use axum::{Router, extract::DefaultBodyLimit};
    use tower_http::{compression::CompressionLayer, trace::TraceLayer};

    let cors_layer = build_cors_layer(&state.config.server);
    let body_limit = state.config.server.body_limit_bytes;

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .merge(api::webhook_router())
        .merge(api::protected_router())
        .merge(api::metrics_router())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

fn build_cors_layer(server: &config::ServerConfig) -> tower_http::cors::CorsLayer {
    use axum::http::HeaderValue;
    use tower_http::cors::{Any, CorsLayer};

    if server.cors_allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = server
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::error!(%error, %origin, "Skipping unparsable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn health_check() -> &'static str {
    "OK"
}
