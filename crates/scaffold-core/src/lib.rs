//! Scaffold Core Library
//!
//! Provides the persisted project descriptor of the scaffolding tool: the
//! registry of scaffolded API resources, global project settings and opaque
//! per-plugin configuration, behind a versioned configuration contract.

pub mod config;
pub mod error;
pub mod model;

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{
        ConfigRegistry, ConfigStore, PluginConfigExt, PluginConfigs, ProjectConfig, Stage,
        V3AlphaConfig, Version, VersionKind,
    };

    // Errors
    pub use crate::error::{ConfigError, PluginCodecError};

    // Model
    pub use crate::model::{Api, Gvk, Resource, Webhooks};
}
