//! Configuration schema types.
//!
//! This module defines the structure of all configuration sections.

use serde::{Deserialize, Serialize};

/// Service identity section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Service name used in logs and as the metrics `service` label.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Deployment environment (development, staging, production).
    #[serde(default = "default_environment")]
    pub environment: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            environment: default_environment(),
        }
    }
}

fn default_service_name() -> String {
    "placement".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

/// Decision cache settings.
///
/// # Example
///
/// ```
/// use placement_config::CacheSection;
///
/// let cache = CacheSection {
///     enabled: true,
///     max_entries: 50_000,
///     ttl_secs: 10,
///     cache_denies: false,
/// };
/// assert!(cache.enabled);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CacheSection {
    /// Cache decisions at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Maximum number of cached decisions.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Seconds a cached decision stays valid.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Cache deny decisions too.
    #[serde(default)]
    pub cache_denies: bool,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: default_max_entries(),
            ttl_secs: default_ttl_secs(),
            cache_denies: false,
        }
    }
}

fn default_max_entries() -> usize {
    10_000
}

fn default_ttl_secs() -> u64 {
    30
}

/// Authorization section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AuthorizationConfig {
    /// Emit one audit event per decision.
    #[serde(default = "default_true")]
    pub audit_decisions: bool,

    /// Record decision metrics.
    #[serde(default = "default_true")]
    pub record_metrics: bool,

    /// Decision cache settings.
    #[serde(default)]
    pub cache: CacheSection,
}

impl Default for AuthorizationConfig {
    fn default() -> Self {
        Self {
            audit_decisions: true,
            record_metrics: true,
            cache: CacheSection::default(),
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive (e.g. "info" or "info,placement_authz=debug").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,

    /// Log span open and close events.
    #[serde(default)]
    pub span_events: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            include_location: false,
            span_events: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    /// Install the Prometheus recorder.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Histogram bucket boundaries for evaluation latency, in seconds.
    #[serde(default = "default_histogram_buckets")]
    pub histogram_buckets: Vec<f64>,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            enabled: true,
            histogram_buckets: default_histogram_buckets(),
        }
    }
}

fn default_histogram_buckets() -> Vec<f64> {
    placement_telemetry::MetricsConfig::default().duration_buckets
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_section_defaults() {
        let cache: CacheSection = toml::from_str("").unwrap();
        assert_eq!(cache, CacheSection::default());
        assert_eq!(cache.ttl_secs, 30);
        assert!(!cache.cache_denies);
    }

    #[test]
    fn test_authorization_partial_toml() {
        let config: AuthorizationConfig = toml::from_str(
            r"
            audit_decisions = false
            [cache]
            ttl_secs = 5
            ",
        )
        .unwrap();
        assert!(!config.audit_decisions);
        assert!(config.record_metrics);
        assert_eq!(config.cache.ttl_secs, 5);
        assert_eq!(config.cache.max_entries, 10_000);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<CacheSection, _> = toml::from_str("ttl = 5");
        assert!(result.is_err());
    }

    #[test]
    fn test_log_format_serialization() {
        let logging: LoggingConfig = serde_json::from_str(r#"{"format":"pretty"}"#).unwrap();
        assert_eq!(logging.format, LogFormat::Pretty);
        assert_eq!(logging.level, "info");
    }
}
