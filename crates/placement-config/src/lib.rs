//! Typed configuration for the placement authorization service.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides, optionally from a `.env` file
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults or preset → file → env)
//!
//! The root type is [`PlacementConfig`]:
//!
//! - [`ServiceConfig`] - service name and environment
//! - [`AuthorizationConfig`] - audit, metrics and decision cache settings
//! - [`LoggingConfig`] - log level and format
//! - [`MetricsSection`] - Prometheus recorder settings
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use placement_authz::{Authorizer, InMemoryDirectory};
//! use placement_config::ConfigLoader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::new()
//!     .with_production()
//!     .with_optional_file("placement.toml")?
//!     .with_env_prefix("PLACEMENT")
//!     .load()?;
//!
//! let _metrics = placement_telemetry::init_telemetry(&config.telemetry_config())?;
//! let authorizer = Authorizer::with_config(
//!     Arc::new(InMemoryDirectory::new()),
//!     config.evaluator_config(),
//! );
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [service]
//! name = "placement-api"
//! environment = "production"
//!
//! [authorization]
//! audit_decisions = true
//! record_metrics = true
//!
//! [authorization.cache]
//! enabled = true
//! max_entries = 50000
//! ttl_secs = 10
//! cache_denies = false
//!
//! [logging]
//! level = "info,placement::audit=info"
//! format = "json"
//!
//! [metrics]
//! enabled = true
//! ```
//!
//! # Environment Variable Overrides
//!
//! Values can be overridden with `PREFIX__SECTION__KEY` variables:
//!
//! - `PLACEMENT__SERVICE__NAME=placement-api`
//! - `PLACEMENT__AUTHORIZATION__CACHE__TTL_SECS=5`
//! - `PLACEMENT__LOGGING__FORMAT=pretty`
//! - `PLACEMENT__METRICS__ENABLED=false`

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::*;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
