//! Configuration for the authorization system.

use crate::cache::CacheConfig;

/// Configuration for the [`Authorizer`](crate::Authorizer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluatorConfig {
    /// Emit one audit event per decision.
    pub audit_decisions: bool,
    /// Record decision counters and evaluation latency.
    pub record_metrics: bool,
    /// Cache configuration.
    pub cache_config: CacheConfig,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            audit_decisions: true,
            record_metrics: true,
            cache_config: CacheConfig::default(),
        }
    }
}

impl EvaluatorConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable audit events.
    pub fn with_audit_decisions(mut self, audit: bool) -> Self {
        self.audit_decisions = audit;
        self
    }

    /// Enable or disable metrics.
    pub fn with_record_metrics(mut self, record: bool) -> Self {
        self.record_metrics = record;
        self
    }

    /// Set the cache configuration.
    pub fn with_cache_config(mut self, config: CacheConfig) -> Self {
        self.cache_config = config;
        self
    }

    /// Create a production configuration.
    pub fn production() -> Self {
        Self {
            audit_decisions: true,
            record_metrics: true,
            cache_config: CacheConfig::production(),
        }
    }

    /// Create a development configuration.
    pub fn development() -> Self {
        Self {
            audit_decisions: true,
            record_metrics: false,
            cache_config: CacheConfig::development(),
        }
    }

    /// Create a configuration for tests: no cache, no metrics, no audit.
    pub fn testing() -> Self {
        Self {
            audit_decisions: false,
            record_metrics: false,
            cache_config: CacheConfig::disabled(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EvaluatorConfig::default();
        assert!(config.audit_decisions);
        assert!(config.record_metrics);
        assert!(config.cache_config.is_enabled());
    }

    #[test]
    fn test_builder_pattern() {
        let config = EvaluatorConfig::new()
            .with_audit_decisions(false)
            .with_cache_config(CacheConfig::disabled());

        assert!(!config.audit_decisions);
        assert!(!config.cache_config.is_enabled());
    }

    #[test]
    fn test_production_config() {
        let config = EvaluatorConfig::production();
        assert!(!config.cache_config.cache_denies);
        assert_eq!(config.cache_config.max_entries, 50_000);
    }

    #[test]
    fn test_testing_config() {
        let config = EvaluatorConfig::testing();
        assert!(!config.cache_config.is_enabled());
        assert!(!config.record_metrics);
    }
}
