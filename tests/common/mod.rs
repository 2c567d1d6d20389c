//! Common test utilities for E2E tests

use authhook::{AppState, Server, ServerHandle, config};

pub const WEBHOOK_API_KEY: &str = "test-provider-api-key";
pub const SESSION_SECRET: &str = "test-secret-key-32-bytes-long!!!";

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub client: reqwest::Client,
    handle: Option<ServerHandle>,
}

impl TestServer {
    /// Create a new test server instance
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(config: config::AppConfig) -> Self {
        let state = AppState::new(config).unwrap();

        let handle = Server::bind(state.clone()).await.unwrap().start();
        let addr = format!("http://{}", handle.local_addr());

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        Self {
            addr,
            state,
            client,
            handle: Some(handle),
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// Send a login webhook carrying the configured API key
    pub async fn post_webhook(&self, body: impl Into<reqwest::Body>) -> reqwest::Response {
        self.client
            .post(self.url("/spec/auth/success"))
            .header("spec-api-key", WEBHOOK_API_KEY)
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .unwrap()
    }

    /// Create a session token for `address`
    pub fn create_test_token(&self, address: &str) -> String {
        use chrono::Duration;
        use authhook::auth::{SessionClaims, create_session_token};

        let claims = SessionClaims::new(address, Duration::days(7));
        create_session_token(&claims, &self.state.config.auth.session_secret)
            .expect("Failed to create test token")
    }

    /// Stop the server and wait for it to drain
    pub async fn shutdown(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.stop().await.unwrap();
        }
    }
}

/// Configuration bound to an ephemeral localhost port
pub fn test_config() -> config::AppConfig {
    config::AppConfig {
        server: config::ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0, // Let OS assign port
            body_limit_bytes: 100 * 1024,
            cors_allowed_origins: Vec::new(),
        },
        auth: config::AuthConfig {
            webhook_api_key: WEBHOOK_API_KEY.to_string(),
            api_key_header: "spec-api-key".to_string(),
            session_secret: SESSION_SECRET.to_string(),
            session_header: "spec-auth-token".to_string(),
            session_cookie: "spec_session".to_string(),
            session_max_age: 604800,
        },
        logging: config::LoggingConfig {
            level: "info".to_string(),
            format: "pretty".to_string(),
        },
    }
}
