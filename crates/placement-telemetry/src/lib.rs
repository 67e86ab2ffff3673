//! Observability for the placement services.
//!
//! - **Logging**: structured JSON (or pretty) logs via `tracing-subscriber`,
//!   with authorization audit events on their own target
//! - **Metrics**: Prometheus-format decision metrics via the `metrics` crate
//!
//! # Example
//!
//! ```rust,ignore
//! use placement_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let config = TelemetryConfig::builder()
//!     .service_name("placement-api")
//!     .environment("production")
//!     .build();
//! let registry = init_telemetry(&config)?;
//! // serve registry.map(|r| r.render()) on the service's /metrics route
//! ```
//!
//! # Metrics Endpoint
//!
//! ```text
//! # HELP placement_authz_decisions_total Authorization decisions by action and outcome
//! # TYPE placement_authz_decisions_total counter
//! placement_authz_decisions_total{action="certify",outcome="allow",service="placement-api"} 12
//! placement_authz_decisions_total{action="view",outcome="deny",service="placement-api"} 3
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;

pub use config::{TelemetryConfig, TelemetryConfigBuilder};
pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig, AUDIT_TARGET};
pub use metrics::{init_metrics, render_metrics, MetricsConfig, MetricsRegistry};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Initializes logging, then metrics.
///
/// Returns the metrics registry when metrics are enabled.
pub fn init_telemetry(config: &TelemetryConfig) -> TelemetryResult<Option<MetricsRegistry>> {
    init_logging(&config.logging)?;
    let registry = init_metrics(&config.metrics)?;
    tracing::info!(
        service = %config.service_name,
        environment = %config.environment,
        metrics = config.metrics.enabled,
        "telemetry initialized"
    );
    Ok(registry)
}
