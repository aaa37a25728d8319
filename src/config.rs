//! Resolver Configuration Module
//!
//! Config is stored in `svcbind.toml` (or the file named by `$SVCBIND_CONFIG`).
//!
//! ## Priority Order (highest to lowest)
//!
//! 1. Environment variables (`SVCBIND_CATALOG_VAR`)
//! 2. Config file
//! 3. Defaults (`VCAP_SERVICES`, first-match selection, built-in schemas)
//!
//! ```toml
//! catalog_var = "VCAP_SERVICES"
//! selection = "exactly-one"
//!
//! [schemas.my-redis]
//! required = ["host", "port", "password"]
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BindingError, Result};
use crate::resolve::Selection;
use crate::schema::{ServiceKind, ServiceSchema};

/// Env var that holds the binding catalog on the platform
pub const DEFAULT_CATALOG_VAR: &str = "VCAP_SERVICES";

/// Env var overriding `catalog_var`
pub const CATALOG_VAR_ENV: &str = "SVCBIND_CATALOG_VAR";

/// Env var naming the config file
pub const CONFIG_PATH_ENV: &str = "SVCBIND_CONFIG";

/// Config file used when `$SVCBIND_CONFIG` is unset
pub const DEFAULT_CONFIG_FILE: &str = "svcbind.toml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ResolverConfig {
    /// Env var holding the catalog document
    #[serde(default = "default_catalog_var")]
    pub catalog_var: String,

    /// Default selection policy
    #[serde(default)]
    pub selection: Selection,

    /// Extra (or overriding) schemas, keyed by service label
    #[serde(default)]
    pub schemas: BTreeMap<String, CustomSchema>,
}

/// Schema declared in the config file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CustomSchema {
    pub required: Vec<String>,
}

fn default_catalog_var() -> String {
    DEFAULT_CATALOG_VAR.to_string()
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            catalog_var: default_catalog_var(),
            selection: Selection::default(),
            schemas: BTreeMap::new(),
        }
    }
}

impl ResolverConfig {
    /// Config file path: `$SVCBIND_CONFIG` or `./svcbind.toml`
    pub fn config_path() -> PathBuf {
        std::env::var_os(CONFIG_PATH_ENV)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from file
    ///
    /// Returns default config if file doesn't exist.
    /// Returns error if file exists but is malformed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| BindingError::ConfigError {
            reason: format!("Failed to read {}: {}", path.display(), e),
        })?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| BindingError::ConfigError {
            reason: format!("Failed to parse config: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.catalog_var.trim().is_empty() {
            return Err(BindingError::ConfigError {
                reason: "catalog_var must not be empty".to_string(),
            });
        }
        for (label, schema) in &self.schemas {
            if schema.required.iter().any(|field| field.is_empty()) {
                return Err(BindingError::ConfigError {
                    reason: format!("schema '{}' declares an empty field name", label),
                });
            }
        }
        Ok(())
    }

    /// Merge with environment variables
    ///
    /// Environment variables take precedence over config file values.
    pub fn with_env(mut self) -> Self {
        if let Ok(var) = std::env::var(CATALOG_VAR_ENV) {
            if !var.is_empty() {
                self.catalog_var = var;
            }
        }

        self
    }

    /// Schema for `label`: configured schema first, then built-in
    pub fn schema_for(&self, label: &str) -> Result<ServiceSchema> {
        if let Some(custom) = self.schemas.get(label) {
            return Ok(ServiceSchema::new(label, custom.required.iter().cloned()));
        }
        label.parse::<ServiceKind>().map(ServiceKind::schema)
    }

    /// Every known schema, configured ones overriding built-ins, sorted by label
    pub fn all_schemas(&self) -> Vec<ServiceSchema> {
        let mut schemas: BTreeMap<String, ServiceSchema> = ServiceKind::ALL
            .into_iter()
            .map(|kind| (kind.label().to_string(), kind.schema()))
            .collect();

        for (label, custom) in &self.schemas {
            schemas.insert(
                label.clone(),
                ServiceSchema::new(label.as_str(), custom.required.iter().cloned()),
            );
        }

        schemas.into_values().collect()
    }
}
