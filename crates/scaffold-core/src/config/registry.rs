//! Registry of constructible configuration schema versions.
//!
//! Populated explicitly at startup; there is no process-wide registration.

use std::collections::BTreeMap;

use super::{ProjectConfig, V3AlphaConfig, Version, v3alpha};
use crate::error::{ConfigError, Result};

/// Constructor of an empty configuration for one schema version.
pub type ConfigConstructor = fn() -> Box<dyn ProjectConfig>;

/// Maps schema versions to configuration constructors.
#[derive(Debug, Clone)]
pub struct ConfigRegistry {
    constructors: BTreeMap<Version, ConfigConstructor>,
}

impl Default for ConfigRegistry {
    fn default() -> Self {
        Self::with_default_versions()
    }
}

impl ConfigRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            constructors: BTreeMap::new(),
        }
    }

    /// Create a registry with every built-in schema version.
    pub fn with_default_versions() -> Self {
        let mut registry = Self::new();
        registry.register(v3alpha::VERSION, V3AlphaConfig::boxed);
        registry
    }

    /// Register a constructor, replacing any previous one for the version.
    pub fn register(&mut self, version: Version, constructor: ConfigConstructor) {
        self.constructors.insert(version, constructor);
    }

    /// Whether a constructor is registered for the version.
    pub fn is_registered(&self, version: &Version) -> bool {
        self.constructors.contains_key(version)
    }

    /// Registered versions, oldest first.
    pub fn versions(&self) -> Vec<Version> {
        self.constructors.keys().copied().collect()
    }

    /// Build an empty configuration of the given version.
    pub fn new_config(&self, version: &Version) -> Result<Box<dyn ProjectConfig>> {
        self.constructors
            .get(version)
            .map(|constructor| constructor())
            .ok_or(ConfigError::UnsupportedVersion(*version))
    }
}
