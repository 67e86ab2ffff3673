//! Configuration loader with layered approach.
//!
//! This module provides the [`ConfigLoader`] for loading configuration from
//! multiple sources: defaults, files, and environment variables.

use std::env;
use std::fs;
use std::path::Path;

use crate::{ConfigError, LogFormat, PlacementConfig};

/// Configuration loader with layered approach.
///
/// The loader applies configuration in layers, with later layers overriding
/// earlier ones:
/// 1. Default values or a preset
/// 2. Configuration file (TOML or JSON)
/// 3. Environment variables
///
/// A file replaces the whole configuration; sections and fields it omits take
/// their defaults, not the values of an earlier preset.
///
/// # Example
///
/// ```no_run
/// use placement_config::ConfigLoader;
///
/// # fn main() -> Result<(), placement_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_defaults()
///     .with_optional_file("placement.toml")?
///     .with_env_prefix("PLACEMENT")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: PlacementConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader starting from defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: PlacementConfig::default(),
            env_prefix: None,
        }
    }

    /// Start with default configuration values.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = PlacementConfig::default();
        self
    }

    /// Start with the development preset.
    ///
    /// # Example
    ///
    /// ```
    /// use placement_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new().with_development().load().unwrap();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = PlacementConfig::development();
        self
    }

    /// Start with the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = PlacementConfig::production();
        self
    }

    /// Load configuration from a file.
    ///
    /// The format is chosen by extension: `.toml` or `.json`. Unknown fields
    /// are rejected.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        self.config = Self::parse_file(&content, path)?;
        Ok(self)
    }

    /// Load configuration from a file if it exists.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string in the given format ("toml" or "json").
    ///
    /// # Example
    ///
    /// ```
    /// use placement_config::ConfigLoader;
    ///
    /// let toml = r#"
    ///     [authorization.cache]
    ///     ttl_secs = 5
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(toml, "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.authorization.cache.ttl_secs, 5);
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            _ => return Err(ConfigError::UnsupportedFormat(format.to_string())),
        };
        Ok(self)
    }

    /// Set environment variable prefix for overrides.
    ///
    /// Environment variables use the format `PREFIX__SECTION__KEY`, e.g.
    /// `PLACEMENT__AUTHORIZATION__CACHE__TTL_SECS=5`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load `.env` from the current directory or its parents, if present.
    ///
    /// Variables already set in the process environment win.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if e.not_found() => Ok(self),
            Err(e) => Err(e.into()),
        }
    }

    /// Load a specific dotenv file into the process environment.
    pub fn with_dotenv_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }
        dotenvy::from_path(path)?;
        Ok(self)
    }

    /// Apply environment overrides, validate, and return the configuration.
    pub fn load(mut self) -> Result<PlacementConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }

        self.config.validate()?;

        Ok(self.config)
    }

    /// Return the configuration without environment overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> PlacementConfig {
        self.config
    }

    fn parse_file(content: &str, path: &Path) -> Result<PlacementConfig, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("toml") => Ok(toml::from_str(content)?),
            Some("json") => Ok(serde_json::from_str(content)?),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let marker = format!("{prefix}__");
        let mut vars: Vec<(String, String)> =
            env::vars().filter(|(k, _)| k.starts_with(&marker)).collect();
        // Sorted so the first failing variable is stable across runs.
        vars.sort();

        for (key, value) in vars {
            self.apply_env_var(&key, &value, prefix)?;
        }

        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let key_without_prefix = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::env_parse_error(key, "invalid key format"))?;

        let parts: Vec<&str> = key_without_prefix.split("__").collect();
        let config = &mut self.config;

        match parts.as_slice() {
            ["SERVICE", "NAME"] => config.service.name = value.to_string(),
            ["SERVICE", "ENVIRONMENT"] => config.service.environment = value.to_string(),

            ["AUTHORIZATION", "AUDIT_DECISIONS"] => {
                config.authorization.audit_decisions = bool_var(key, value)?;
            }
            ["AUTHORIZATION", "RECORD_METRICS"] => {
                config.authorization.record_metrics = bool_var(key, value)?;
            }
            ["AUTHORIZATION", "CACHE", "ENABLED"] => {
                config.authorization.cache.enabled = bool_var(key, value)?;
            }
            ["AUTHORIZATION", "CACHE", "MAX_ENTRIES"] => {
                config.authorization.cache.max_entries = value
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))?;
            }
            ["AUTHORIZATION", "CACHE", "TTL_SECS"] => {
                config.authorization.cache.ttl_secs = value
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))?;
            }
            ["AUTHORIZATION", "CACHE", "CACHE_DENIES"] => {
                config.authorization.cache.cache_denies = bool_var(key, value)?;
            }

            ["LOGGING", "ENABLED"] => config.logging.enabled = bool_var(key, value)?,
            ["LOGGING", "LEVEL"] => config.logging.level = value.to_string(),
            ["LOGGING", "FORMAT"] => {
                config.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'json' or 'pretty'",
                        ))
                    }
                };
            }
            ["LOGGING", "INCLUDE_LOCATION"] => {
                config.logging.include_location = bool_var(key, value)?;
            }
            ["LOGGING", "SPAN_EVENTS"] => config.logging.span_events = bool_var(key, value)?,

            ["METRICS", "ENABLED"] => config.metrics.enabled = bool_var(key, value)?,
            ["METRICS", "HISTOGRAM_BUCKETS"] => {
                config.metrics.histogram_buckets = value
                    .split(',')
                    .map(|b| b.trim().parse::<f64>())
                    .collect::<Result<_, _>>()
                    .map_err(|_| {
                        ConfigError::env_parse_error(key, "expected comma-separated numbers")
                    })?;
            }

            _ => return Err(ConfigError::env_parse_error(key, "unknown configuration key")),
        }

        Ok(())
    }
}

fn bool_var(key: &str, value: &str) -> Result<bool, ConfigError> {
    parse_bool(value).ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))
}

/// Parse a boolean from a string.
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_loader_new() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config, PlacementConfig::default());
    }

    #[test]
    fn test_loader_with_production() {
        let config = ConfigLoader::new().with_production().load().unwrap();
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.service.environment, "production");
    }

    #[test]
    fn test_loader_with_string_json() {
        let json = r#"{"authorization": {"audit_decisions": false}}"#;
        let config = ConfigLoader::new()
            .with_string(json, "json")
            .unwrap()
            .load()
            .unwrap();
        assert!(!config.authorization.audit_decisions);
    }

    #[test]
    fn test_loader_with_string_unsupported_format() {
        let result = ConfigLoader::new().with_string("name: x", "yaml");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_loader_rejects_unknown_fields() {
        let toml = r"
            [authorization]
            mode = 'rbac'
        ";
        assert!(ConfigLoader::new().with_string(toml, "toml").is_err());
    }

    #[test]
    fn test_loader_with_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
            [service]
            name = "placement-api"
            environment = "staging"

            [authorization.cache]
            max_entries = 2000
            cache_denies = true

            [logging]
            format = "pretty"
            "#
        )
        .unwrap();

        let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();
        assert_eq!(config.service.name, "placement-api");
        assert_eq!(config.authorization.cache.max_entries, 2000);
        assert!(config.authorization.cache.cache_denies);
        assert_eq!(config.authorization.cache.ttl_secs, 30);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_loader_with_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"metrics": {{"enabled": false}}}}"#).unwrap();

        let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();
        assert!(!config.metrics.enabled);
        assert!(!config.evaluator_config().record_metrics);
    }

    #[test]
    fn test_loader_rejects_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        let result = ConfigLoader::new().with_file(file.path());
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_loader_file_validation_failure() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[authorization.cache]\nmax_entries = 0").unwrap();

        let err = ConfigLoader::new()
            .with_file(file.path())
            .unwrap()
            .load()
            .unwrap_err();
        assert!(err.to_string().contains("max_entries"));
    }

    #[test]
    fn test_loader_with_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("placement.toml");

        assert!(matches!(
            ConfigLoader::new().with_file(&missing),
            Err(ConfigError::FileNotFound { .. })
        ));
        let config = ConfigLoader::new()
            .with_optional_file(&missing)
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(config, PlacementConfig::default());
    }

    #[test]
    fn test_loader_with_dotenv_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "PLACEMENT_DOTENV_TEST__AUTHORIZATION__CACHE__TTL_SECS=7").unwrap();
        writeln!(file, "PLACEMENT_DOTENV_TEST__LOGGING__FORMAT=pretty").unwrap();

        let config = ConfigLoader::new()
            .with_dotenv_file(file.path())
            .unwrap()
            .with_env_prefix("PLACEMENT_DOTENV_TEST")
            .load()
            .unwrap();
        assert_eq!(config.authorization.cache.ttl_secs, 7);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_loader_load_unvalidated() {
        let mut config = ConfigLoader::new().with_development().load_unvalidated();
        config.authorization.cache.ttl_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_bool() {
        for truthy in ["true", "True", "1", "yes", "on"] {
            assert_eq!(parse_bool(truthy), Some(true));
        }
        for falsy in ["false", "FALSE", "0", "no", "off"] {
            assert_eq!(parse_bool(falsy), Some(false));
        }
        assert_eq!(parse_bool("maybe"), None);
        assert_eq!(parse_bool(""), None);
    }

    #[test]
    fn test_apply_env_var_cache() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("TEST__AUTHORIZATION__CACHE__TTL_SECS", "3", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__AUTHORIZATION__CACHE__CACHE_DENIES", "yes", "TEST")
            .unwrap();
        assert_eq!(loader.config.authorization.cache.ttl_secs, 3);
        assert!(loader.config.authorization.cache.cache_denies);
    }

    #[test]
    fn test_apply_env_var_logging_and_service() {
        let mut loader = ConfigLoader::new();
        loader.apply_env_var("TEST__SERVICE__NAME", "placement-worker", "TEST").unwrap();
        loader.apply_env_var("TEST__LOGGING__LEVEL", "warn", "TEST").unwrap();
        loader.apply_env_var("TEST__LOGGING__FORMAT", "PRETTY", "TEST").unwrap();
        assert_eq!(loader.config.service.name, "placement-worker");
        assert_eq!(loader.config.logging.level, "warn");
        assert_eq!(loader.config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_apply_env_var_histogram_buckets() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("TEST__METRICS__HISTOGRAM_BUCKETS", "0.001, 0.01,0.1", "TEST")
            .unwrap();
        assert_eq!(loader.config.metrics.histogram_buckets, vec![0.001, 0.01, 0.1]);

        let result = loader.apply_env_var("TEST__METRICS__HISTOGRAM_BUCKETS", "fast,slow", "TEST");
        assert!(result.is_err());
    }

    #[test]
    fn test_apply_env_var_errors() {
        let mut loader = ConfigLoader::new();
        assert!(loader
            .apply_env_var("TEST__AUTHORIZATION__CACHE__MAX_ENTRIES", "lots", "TEST")
            .is_err());
        assert!(loader
            .apply_env_var("TEST__METRICS__ENABLED", "maybe", "TEST")
            .is_err());
        let err = loader
            .apply_env_var("TEST__AUTHORIZATION__MODE", "rbac", "TEST")
            .unwrap_err();
        assert!(err.to_string().contains("unknown configuration key"));
    }
}
