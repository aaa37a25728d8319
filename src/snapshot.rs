//! Catalog snapshot - parse the platform catalog once, share it immutably
//!
//! The platform injects the catalog before the process starts, so it is
//! read a single time and handed around as an `Arc`. A process-wide slot
//! can be filled once during startup; after that it is read-only and needs
//! no locking.

use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::catalog::BindingCatalog;
use crate::error::{BindingError, Result};

static GLOBAL: OnceCell<CatalogSnapshot> = OnceCell::new();

/// Immutable, cheaply cloneable handle to a parsed catalog
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    catalog: Arc<BindingCatalog>,
}

impl CatalogSnapshot {
    pub fn new(catalog: BindingCatalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }

    /// Parse catalog text (absent/blank → empty snapshot)
    pub fn from_source(source: Option<&str>) -> Result<Self> {
        BindingCatalog::parse(source).map(Self::new)
    }

    /// Read the catalog from environment variable `var`
    ///
    /// An unset variable means "no bindings configured". A variable that
    /// is set but not valid unicode is a malformed catalog.
    pub fn from_env(var: &str) -> Result<Self> {
        let source = match std::env::var(var) {
            Ok(text) => Some(text),
            Err(std::env::VarError::NotPresent) => None,
            Err(std::env::VarError::NotUnicode(_)) => {
                return Err(BindingError::MalformedCatalog {
                    details: format!("${} is not valid UTF-8", var),
                });
            }
        };

        let snapshot = Self::from_source(source.as_deref())?;
        debug!(
            var,
            present = source.is_some(),
            labels = snapshot.catalog.labels().count(),
            "Loaded binding catalog"
        );
        Ok(snapshot)
    }

    /// Read the catalog from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let snapshot = Self::from_source(Some(text.as_str()))?;
        debug!(
            path = %path.display(),
            labels = snapshot.catalog.labels().count(),
            "Loaded binding catalog"
        );
        Ok(snapshot)
    }

    pub fn catalog(&self) -> &BindingCatalog {
        &self.catalog
    }
}

impl Deref for CatalogSnapshot {
    type Target = BindingCatalog;

    fn deref(&self) -> &Self::Target {
        &self.catalog
    }
}

/// Install the process-wide snapshot
///
/// Must be called at most once, before concurrent readers start.
pub fn install(snapshot: CatalogSnapshot) -> Result<()> {
    GLOBAL
        .set(snapshot)
        .map_err(|_| BindingError::ConfigError {
            reason: "binding catalog snapshot already installed".to_string(),
        })
}

/// The process-wide snapshot, if installed
pub fn global() -> Option<&'static CatalogSnapshot> {
    GLOBAL.get()
}

/// The process-wide snapshot, reading `var` on first use
pub fn global_or_init(var: &str) -> Result<&'static CatalogSnapshot> {
    GLOBAL.get_or_try_init(|| CatalogSnapshot::from_env(var))
}
