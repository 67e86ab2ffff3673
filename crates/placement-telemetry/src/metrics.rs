//! Prometheus metrics for authorization decisions.
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `placement_authz_decisions_total` | Counter | `action`, `outcome` | Decisions evaluated |
//! | `placement_authz_evaluation_seconds` | Histogram | `action` | Evaluation latency |
//! | `placement_authz_cache_hits_total` | Counter | `action` | Decisions served from cache |
//! | `placement_authz_lookup_failures_total` | Counter | `lookup` | Failed directory lookups |
//!
//! Recording is a no-op until a recorder is installed with [`init_metrics`].
//! The exporter does not bind a listener; the enclosing service exposes
//! [`render_metrics`] on its own `/metrics` route.

use crate::error::TelemetryError;
use crate::TelemetryResult;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Duration;

/// Global metrics handle for rendering.
static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metric names.
pub mod names {
    /// Decisions evaluated, by action and outcome.
    pub const DECISIONS_TOTAL: &str = "placement_authz_decisions_total";
    /// Evaluation latency in seconds.
    pub const EVALUATION_SECONDS: &str = "placement_authz_evaluation_seconds";
    /// Decisions served from the cache.
    pub const CACHE_HITS_TOTAL: &str = "placement_authz_cache_hits_total";
    /// Failed directory lookups.
    pub const LOOKUP_FAILURES_TOTAL: &str = "placement_authz_lookup_failures_total";
}

/// Metrics configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsConfig {
    /// Whether metrics are enabled.
    pub enabled: bool,

    /// Service name, attached as a global `service` label.
    pub service_name: String,

    /// Histogram buckets for evaluation latency, in seconds.
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            service_name: "placement".to_string(),
            // Evaluations are in-process map lookups plus directory calls: 50us to 1s.
            duration_buckets: vec![
                0.000_05, 0.000_1, 0.000_25, 0.000_5, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0,
            ],
        }
    }
}

/// Handle for rendering the installed recorder's metrics.
#[derive(Debug, Clone)]
pub struct MetricsRegistry {
    handle: PrometheusHandle,
}

impl MetricsRegistry {
    /// Creates a new metrics registry with the given handle.
    #[must_use]
    pub fn new(handle: PrometheusHandle) -> Self {
        Self { handle }
    }

    /// The registry for the globally installed recorder, if any.
    #[must_use]
    pub fn global() -> Option<Self> {
        METRICS_HANDLE.get().cloned().map(Self::new)
    }

    /// Renders all metrics in Prometheus text format.
    #[must_use]
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Installs the global Prometheus recorder.
///
/// Returns `None` when metrics are disabled. Calling this again after a
/// successful install returns the existing registry.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<Option<MetricsRegistry>> {
    if !config.enabled {
        return Ok(None);
    }
    if let Some(registry) = MetricsRegistry::global() {
        return Ok(Some(registry));
    }
    if config.duration_buckets.is_empty() {
        return Err(TelemetryError::InvalidConfig(
            "metrics duration_buckets must not be empty".to_string(),
        ));
    }

    let handle = PrometheusBuilder::new()
        .add_global_label("service", config.service_name.clone())
        .set_buckets_for_metric(
            Matcher::Full(names::EVALUATION_SECONDS.to_string()),
            &config.duration_buckets,
        )
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?
        .install_recorder()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    let registry = MetricsRegistry::new(handle.clone());
    let _ = METRICS_HANDLE.set(handle);
    register_metric_descriptions();

    Ok(Some(registry))
}

/// Renders metrics in Prometheus format.
///
/// Returns `None` if metrics are not initialized.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

fn register_metric_descriptions() {
    describe_counter!(
        names::DECISIONS_TOTAL,
        "Authorization decisions by action and outcome"
    );
    describe_histogram!(
        names::EVALUATION_SECONDS,
        "Policy evaluation latency in seconds, including directory lookups"
    );
    describe_counter!(
        names::CACHE_HITS_TOTAL,
        "Authorization decisions served from the decision cache"
    );
    describe_counter!(
        names::LOOKUP_FAILURES_TOTAL,
        "Directory lookups that failed during policy evaluation"
    );
}

/// Records an evaluated decision.
///
/// Updates `placement_authz_decisions_total` and
/// `placement_authz_evaluation_seconds`.
pub fn record_decision(action: &'static str, allowed: bool, duration: Duration) {
    let outcome = if allowed { "allow" } else { "deny" };
    counter!(names::DECISIONS_TOTAL, "action" => action, "outcome" => outcome).increment(1);
    histogram!(names::EVALUATION_SECONDS, "action" => action).record(duration.as_secs_f64());
}

/// Records a decision served from the cache.
pub fn record_cache_hit(action: &'static str) {
    counter!(names::CACHE_HITS_TOTAL, "action" => action).increment(1);
}

/// Records a failed directory lookup.
pub fn record_lookup_failure(lookup: &'static str) {
    counter!(names::LOOKUP_FAILURES_TOTAL, "lookup" => lookup).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MetricsConfig::default();
        assert!(config.enabled);
        assert!(config.duration_buckets.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_disabled_metrics_skip_install() {
        let config = MetricsConfig {
            enabled: false,
            ..Default::default()
        };
        assert!(init_metrics(&config).unwrap().is_none());
    }

    #[test]
    fn test_record_functions_without_recorder() {
        record_decision("view", true, Duration::from_micros(40));
        record_decision("certify", false, Duration::from_millis(2));
        record_cache_hit("review_evidence");
        record_lookup_failure("student_affiliation");
    }

    #[test]
    fn test_metric_names() {
        assert_eq!(names::DECISIONS_TOTAL, "placement_authz_decisions_total");
        assert!(names::EVALUATION_SECONDS.starts_with("placement_authz_"));
    }
}
