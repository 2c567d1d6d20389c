//! Prometheus metrics registry and instruments.
//!
//! This module is framework-agnostic and can be used from any layer.

use std::sync::Once;

use lazy_static::lazy_static;
use prometheus::{IntCounterVec, Opts, Registry};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // Webhook Metrics
    pub static ref WEBHOOK_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("authhook_webhook_requests_total", "Total number of login webhook requests"),
        &["outcome"]
    ).expect("metric can be created");

    // Session Metrics
    pub static ref PRINCIPAL_RESOLUTIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("authhook_principal_resolutions_total", "Total number of session principal lookups"),
        &["outcome"]
    ).expect("metric can be created");

    // Error Metrics
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("authhook_errors_total", "Total number of errors"),
        &["error_type"]
    ).expect("metric can be created");
}

static INIT: Once = Once::new();

/// Initialize metrics registry.
///
/// Safe to call more than once; only the first call registers.
pub fn init_metrics() {
    INIT.call_once(|| {
        REGISTRY
            .register(Box::new(WEBHOOK_REQUESTS_TOTAL.clone()))
            .expect("WEBHOOK_REQUESTS_TOTAL can be registered");
        REGISTRY
            .register(Box::new(PRINCIPAL_RESOLUTIONS_TOTAL.clone()))
            .expect("PRINCIPAL_RESOLUTIONS_TOTAL can be registered");
        REGISTRY
            .register(Box::new(ERRORS_TOTAL.clone()))
            .expect("ERRORS_TOTAL can be registered");

        tracing::info!("Metrics registry initialized");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_metrics_is_idempotent() {
        init_metrics();
        init_metrics();

        WEBHOOK_REQUESTS_TOTAL.with_label_values(&["accepted"]).inc();
        let names: Vec<String> = REGISTRY
            .gather()
            .iter()
            .map(|family| family.get_name().to_string())
            .collect();
        assert!(names.contains(&"authhook_webhook_requests_total".to_string()));
    }
}
