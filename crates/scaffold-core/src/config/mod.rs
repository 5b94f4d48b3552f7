//! Project configuration (the `PROJECT` file)
//!
//! The configuration contract is the [`ProjectConfig`] trait. Each schema
//! version implements it with its own on-disk shape and field policy, and is
//! made constructible through a [`ConfigRegistry`]:
//! - `3-alpha`: [`V3AlphaConfig`]

pub mod plugins;
pub mod registry;
pub mod store;
pub mod v3alpha;
pub mod version;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::model::{Gvk, Resource};

pub use plugins::{PluginConfig, PluginConfigs};
pub use registry::ConfigRegistry;
pub use store::ConfigStore;
pub use v3alpha::{V3AlphaConfig, VersionKind};
pub use version::{Stage, Version};

/// Read/write contract of a project configuration.
///
/// Resources are copied in and out; nothing returned borrows into the
/// tracked resource list.
pub trait ProjectConfig: std::fmt::Debug {
    /// Schema version of this configuration
    fn version(&self) -> Version;

    fn domain(&self) -> &str;
    fn set_domain(&mut self, domain: &str);

    fn repository(&self) -> &str;
    fn set_repository(&mut self, repository: &str);

    fn project_name(&self) -> &str;
    fn set_project_name(&mut self, name: &str);

    fn layout(&self) -> &str;
    fn set_layout(&mut self, layout: &str);

    fn is_multigroup(&self) -> bool;
    fn set_multigroup(&mut self);
    fn clear_multigroup(&mut self);

    fn is_component_config(&self) -> bool;
    fn set_component_config(&mut self);
    fn clear_component_config(&mut self);

    /// Number of tracked resources
    fn resources_len(&self) -> usize;

    /// Whether a resource with this identifier is tracked
    fn has_resource(&self, gvk: &Gvk) -> bool;

    /// Copy of the tracked resource, or [`ConfigError::UnknownResource`](crate::error::ConfigError::UnknownResource)
    fn get_resource(&self, gvk: &Gvk) -> Result<Resource>;

    /// Copies of all tracked resources in insertion order
    fn get_resources(&self) -> Vec<Resource>;

    /// Track a resource unless one with the same identifier already exists.
    fn add_resource(&mut self, resource: Resource);

    /// Merge into the tracked resource with the same identifier, or track it.
    fn update_resource(&mut self, resource: Resource) -> Result<()>;

    /// Whether any tracked resource belongs to `group` (case-insensitive)
    fn has_group(&self, group: &str) -> bool;

    /// Whether every resource with a CRD version uses `crd_version`
    fn is_crd_version_compatible(&self, crd_version: &str) -> bool;

    /// Whether every resource with a webhook version uses `webhook_version`
    fn is_webhook_version_compatible(&self, webhook_version: &str) -> bool;

    /// Stored configuration blob of a plugin
    fn plugin_config(&self, key: &str) -> Option<&PluginConfig>;

    /// Store a configuration blob for a plugin, replacing any previous one.
    fn set_plugin_config(&mut self, key: &str, config: PluginConfig);

    /// Keys of all plugins with stored configuration
    fn plugin_keys(&self) -> Vec<String>;

    /// Encode the configuration to its persisted text form.
    fn marshal(&self) -> Result<String>;

    /// Replace this configuration with the one decoded from `content`.
    fn unmarshal(&mut self, content: &str) -> Result<()>;
}

/// Typed access to plugin configuration blobs.
pub trait PluginConfigExt {
    /// Decode the blob stored under `key` into `T`.
    ///
    /// Returns `Ok(None)` when nothing is stored under `key`.
    fn decode_plugin_config<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>>;

    /// Store `value` under `key` as a generic blob.
    fn encode_plugin_config<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<()>;
}

impl<C: ProjectConfig + ?Sized> PluginConfigExt for C {
    fn decode_plugin_config<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.plugin_config(key)
            .map(|config| plugins::decode(key, config))
            .transpose()
    }

    fn encode_plugin_config<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<()> {
        let config = plugins::encode(key, value)?;
        self.set_plugin_config(key, config);
        Ok(())
    }
}
