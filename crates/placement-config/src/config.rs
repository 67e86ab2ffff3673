//! Main configuration types.
//!
//! This module provides the top-level [`PlacementConfig`] struct, its builder
//! and the conversions into runtime configuration for the authorizer and
//! telemetry.

use std::time::Duration;

use placement_authz::{CacheConfig, EvaluatorConfig};
use placement_telemetry::{LogConfig, MetricsConfig, TelemetryConfig};
use serde::{Deserialize, Serialize};

use crate::{
    AuthorizationConfig, ConfigError, LogFormat, LoggingConfig, MetricsSection, ServiceConfig,
};

/// Complete placement service configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load configuration from files
/// and environment variables.
///
/// # Example
///
/// ```
/// use placement_config::PlacementConfig;
///
/// let config = PlacementConfig::default();
/// assert!(config.authorization.audit_decisions);
/// assert_eq!(config.authorization.cache.ttl_secs, 30);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct PlacementConfig {
    /// Service identity.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Authorization settings.
    #[serde(default)]
    pub authorization: AuthorizationConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Metrics settings.
    #[serde(default)]
    pub metrics: MetricsSection,
}

impl PlacementConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> PlacementConfigBuilder {
        PlacementConfigBuilder::new()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service.name.trim().is_empty() {
            return Err(ConfigError::invalid_value("service.name", "must not be empty"));
        }

        let cache = &self.authorization.cache;
        if cache.enabled && cache.max_entries == 0 {
            return Err(ConfigError::invalid_value(
                "authorization.cache.max_entries",
                "must be greater than 0 when the cache is enabled",
            ));
        }
        if cache.enabled && cache.ttl_secs == 0 {
            return Err(ConfigError::invalid_value(
                "authorization.cache.ttl_secs",
                "must be greater than 0 when the cache is enabled",
            ));
        }

        if self.logging.enabled {
            placement_telemetry::logging::create_env_filter(&self.logging.level).map_err(|e| {
                ConfigError::invalid_value("logging.level", e.to_string())
            })?;
        }

        if self.metrics.enabled {
            let buckets = &self.metrics.histogram_buckets;
            if buckets.is_empty() {
                return Err(ConfigError::invalid_value(
                    "metrics.histogram_buckets",
                    "must not be empty",
                ));
            }
            if !buckets.windows(2).all(|w| w[0] < w[1]) {
                return Err(ConfigError::invalid_value(
                    "metrics.histogram_buckets",
                    "must be strictly increasing",
                ));
            }
        }

        Ok(())
    }

    /// Development preset: pretty debug logs, no metrics, short-lived cache
    /// that also holds denies.
    ///
    /// # Example
    ///
    /// ```
    /// use placement_config::PlacementConfig;
    ///
    /// let config = PlacementConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.service.environment = "development".to_string();

        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.include_location = true;
        config.logging.span_events = true;

        config.metrics.enabled = false;
        config.authorization.record_metrics = false;

        config.authorization.cache.max_entries = 1_000;
        config.authorization.cache.ttl_secs = 5;
        config.authorization.cache.cache_denies = true;

        config
    }

    /// Production preset: JSON logs, metrics on, larger cache with a short TTL.
    ///
    /// # Example
    ///
    /// ```
    /// use placement_config::{LogFormat, PlacementConfig};
    ///
    /// let config = PlacementConfig::production();
    /// assert_eq!(config.logging.format, LogFormat::Json);
    /// ```
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.service.environment = "production".to_string();

        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;

        config.authorization.cache.max_entries = 50_000;
        config.authorization.cache.ttl_secs = 10;
        config.authorization.cache.cache_denies = false;

        config
    }

    /// Authorizer settings.
    pub fn evaluator_config(&self) -> EvaluatorConfig {
        let section = &self.authorization.cache;
        let cache = if section.enabled {
            CacheConfig {
                max_entries: section.max_entries,
                ttl: Duration::from_secs(section.ttl_secs),
                cache_denies: section.cache_denies,
            }
        } else {
            CacheConfig::disabled()
        };

        EvaluatorConfig::new()
            .with_audit_decisions(self.authorization.audit_decisions)
            .with_record_metrics(self.authorization.record_metrics && self.metrics.enabled)
            .with_cache_config(cache)
    }

    /// Logging settings.
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            enabled: self.logging.enabled,
            level: self.logging.level.clone(),
            json_format: self.logging.format == LogFormat::Json,
            span_events: self.logging.span_events,
            file_line_info: self.logging.include_location,
            service_name: self.service.name.clone(),
            ..LogConfig::default()
        }
    }

    /// Metrics recorder settings.
    pub fn metrics_config(&self) -> MetricsConfig {
        MetricsConfig {
            enabled: self.metrics.enabled,
            service_name: self.service.name.clone(),
            duration_buckets: self.metrics.histogram_buckets.clone(),
        }
    }

    /// Combined telemetry settings for `placement_telemetry::init_telemetry`.
    pub fn telemetry_config(&self) -> TelemetryConfig {
        TelemetryConfig::builder()
            .service_name(&self.service.name)
            .environment(&self.service.environment)
            .logging(self.log_config())
            .metrics(self.metrics_config())
            .build()
    }
}

/// Builder for [`PlacementConfig`].
#[derive(Debug, Default)]
pub struct PlacementConfigBuilder {
    service: Option<ServiceConfig>,
    authorization: Option<AuthorizationConfig>,
    logging: Option<LoggingConfig>,
    metrics: Option<MetricsSection>,
}

impl PlacementConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the service section.
    #[must_use]
    pub fn service(mut self, service: ServiceConfig) -> Self {
        self.service = Some(service);
        self
    }

    /// Set the authorization section.
    #[must_use]
    pub fn authorization(mut self, authorization: AuthorizationConfig) -> Self {
        self.authorization = Some(authorization);
        self
    }

    /// Set the logging section.
    #[must_use]
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Set the metrics section.
    #[must_use]
    pub fn metrics(mut self, metrics: MetricsSection) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Build the configuration. Unset sections use their defaults.
    #[must_use]
    pub fn build(self) -> PlacementConfig {
        PlacementConfig {
            service: self.service.unwrap_or_default(),
            authorization: self.authorization.unwrap_or_default(),
            logging: self.logging.unwrap_or_default(),
            metrics: self.metrics.unwrap_or_default(),
        }
    }

    /// Build and validate the configuration.
    pub fn build_validated(self) -> Result<PlacementConfig, ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}
