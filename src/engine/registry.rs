//! Driver Registry
//!
//! Maps driver names to drivers and database families to dialect factories.
//! Registration is idempotent: the first entry under a key wins and later
//! registrations under the same key are silently ignored.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::engine::bootstrap;
use crate::engine::traits::{DialectFactory, Driver};
use crate::engine::types::DbFamily;

static GLOBAL: Lazy<Arc<Registry>> = Lazy::new(|| Arc::new(Registry::with_defaults()));

/// Registry that holds all available drivers and dialects
pub struct Registry {
    drivers: RwLock<HashMap<String, Arc<dyn Driver>>>,
    dialects: RwLock<HashMap<DbFamily, DialectFactory>>,
}

impl Registry {
    /// Creates a new empty registry
    pub fn new() -> Self {
        Self {
            drivers: RwLock::new(HashMap::new()),
            dialects: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a registry seeded with the built-in bundle table
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        bootstrap::bootstrap(&registry);
        registry
    }

    /// Process-wide registry, seeded on first access
    pub fn global() -> Arc<Registry> {
        Arc::clone(&GLOBAL)
    }

    /// Registers a driver under `name`
    ///
    /// Returns `false` and leaves the existing entry untouched when the name
    /// is already taken.
    pub fn register_driver(&self, name: impl Into<String>, driver: Arc<dyn Driver>) -> bool {
        let mut drivers = self.drivers.write();
        let name = name.into();
        if drivers.contains_key(&name) {
            return false;
        }
        tracing::debug!(driver = %name, "registered driver");
        drivers.insert(name, driver);
        true
    }

    /// Registers a dialect factory for `family`, with the same idempotent
    /// contract as `register_driver`
    pub fn register_dialect(&self, family: DbFamily, factory: DialectFactory) -> bool {
        let mut dialects = self.dialects.write();
        if dialects.contains_key(&family) {
            return false;
        }
        tracing::debug!(family = %family, "registered dialect");
        dialects.insert(family, factory);
        true
    }

    /// Gets a driver by name
    pub fn query_driver(&self, name: &str) -> Option<Arc<dyn Driver>> {
        self.drivers.read().get(name).cloned()
    }

    /// Gets the dialect factory for a family
    pub fn query_dialect(&self, family: DbFamily) -> Option<DialectFactory> {
        self.dialects.read().get(&family).cloned()
    }

    /// Lists all registered driver names, sorted
    pub fn driver_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.drivers.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Lists all families with a registered dialect
    pub fn families(&self) -> Vec<DbFamily> {
        self.dialects.read().keys().copied().collect()
    }

    /// Returns the number of registered drivers
    pub fn len(&self) -> usize {
        self.drivers.read().len()
    }

    /// Returns true if no drivers are registered
    pub fn is_empty(&self) -> bool {
        self.drivers.read().is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
