//! API layer
//!
//! HTTP handlers for:
//! - The provider's login webhook
//! - An example session-protected route
//! - Metrics (Prometheus)

mod dto;
pub mod metrics;
mod protected;
mod webhook;

pub use dto::*;

pub use metrics::metrics_router;
pub use protected::protected_router;
pub use webhook::webhook_router;
