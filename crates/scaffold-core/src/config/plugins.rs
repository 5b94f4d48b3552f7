//! Opaque per-plugin configuration storage.
//!
//! Plugin blobs are kept as generic TOML tables so they survive a
//! marshal/unmarshal cycle without this crate knowing the plugin's types.
//! Typed access goes through a codec round-trip into the caller's type.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, PluginCodecError, Result};

/// Serialization-neutral configuration of one plugin.
pub type PluginConfig = toml::Table;

/// Plugin configurations keyed by plugin key (e.g. `go.kubebuilder.io/v3`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginConfigs(BTreeMap<String, PluginConfig>);

impl PluginConfigs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&PluginConfig> {
        self.0.get(key)
    }

    /// Store a blob under `key`, replacing any previous one.
    pub fn insert(&mut self, key: impl Into<String>, config: PluginConfig) {
        self.0.insert(key.into(), config);
    }

    /// Plugin keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Decode a stored blob into `T` by encoding it to text and parsing it back.
pub(crate) fn decode<T: DeserializeOwned>(key: &str, config: &PluginConfig) -> Result<T> {
    let wrap = |source: PluginCodecError| ConfigError::PluginDecode {
        key: key.to_string(),
        type_name: std::any::type_name::<T>(),
        source,
    };

    let content = toml::to_string(config).map_err(|e| wrap(e.into()))?;
    toml::from_str(&content).map_err(|e| wrap(e.into()))
}

/// Convert `value` into a generic table, dropping its type identity.
pub(crate) fn encode<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<PluginConfig> {
    let wrap = |source: PluginCodecError| ConfigError::PluginEncode {
        key: key.to_string(),
        type_name: std::any::type_name::<T>(),
        source,
    };

    let content = toml::to_string(value).map_err(|e| wrap(e.into()))?;
    toml::from_str(&content).map_err(|e| wrap(e.into()))
}
