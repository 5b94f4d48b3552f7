//! Error types for project configuration.

use thiserror::Error;

use crate::config::Version;
use crate::model::Gvk;

/// Errors returned by the project configuration contract.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No tracked resource matches the requested identifier.
    #[error("resource {gvk} could not be found")]
    UnknownResource { gvk: Gvk },

    /// A decoded configuration tracks the same identifier more than once.
    #[error("resource {gvk} is tracked more than once")]
    DuplicateResource { gvk: Gvk },

    /// Two resources with different identifiers were asked to merge.
    #[error("unable to update resource {expected} with non-matching resource {found}")]
    GvkMismatch { expected: Gvk, found: Gvk },

    /// The configuration could not be encoded.
    #[error("error marshalling project configuration: {0}")]
    Marshal(#[source] toml::ser::Error),

    /// The configuration could not be decoded, including unknown fields.
    #[error("error unmarshalling project configuration: {0}")]
    Unmarshal(#[source] toml::de::Error),

    /// A plugin blob could not be decoded into the requested type.
    #[error("unable to decode plugin configuration {key:?} into {type_name}: {source}")]
    PluginDecode {
        key: String,
        type_name: &'static str,
        #[source]
        source: PluginCodecError,
    },

    /// A typed value could not be stored as a plugin blob.
    #[error("unable to encode {type_name} as plugin configuration {key:?}: {source}")]
    PluginEncode {
        key: String,
        type_name: &'static str,
        #[source]
        source: PluginCodecError,
    },

    /// Version marker text is malformed.
    #[error("invalid project version {0:?}")]
    InvalidVersion(String),

    /// No configuration constructor is registered for the version.
    #[error("unsupported project version {0}")]
    UnsupportedVersion(Version),
}

/// Codec step that failed while converting a plugin blob.
#[derive(Debug, Error)]
pub enum PluginCodecError {
    #[error("failed to convert object to bytes: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("failed to convert bytes to object: {0}")]
    Deserialize(#[from] toml::de::Error),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
