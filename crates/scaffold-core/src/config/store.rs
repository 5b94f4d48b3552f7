//! Config store for loading and saving the PROJECT file.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use super::{ConfigRegistry, ProjectConfig, Version};

/// Default file name of the project configuration.
pub const PROJECT_FILE: &str = "PROJECT";

/// Only the version marker, read before picking a schema.
#[derive(Deserialize)]
struct VersionMarker {
    version: Version,
}

#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store for the PROJECT file inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(PROJECT_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the file, dispatching on its `version` to a registered schema.
    pub fn load(&self, registry: &ConfigRegistry) -> anyhow::Result<Box<dyn ProjectConfig>> {
        let content = std::fs::read_to_string(&self.path).with_context(|| {
            format!("Failed to read project file: {}", self.path.display())
        })?;

        let marker: VersionMarker = toml::from_str(&content).with_context(|| {
            format!(
                "Failed to determine project version: {}",
                self.path.display()
            )
        })?;
        tracing::debug!(
            path = %self.path.display(),
            version = %marker.version,
            "loading project file"
        );

        let mut config = registry.new_config(&marker.version)?;
        config.unmarshal(&content).with_context(|| {
            format!("Failed to parse project file: {}", self.path.display())
        })?;

        Ok(config)
    }

    pub fn save(&self, config: &dyn ProjectConfig) -> anyhow::Result<()> {
        let content = config
            .marshal()
            .context("Failed to serialize project configuration")?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create project directory: {}", parent.display())
            })?;
        }
        std::fs::write(&self.path, content).with_context(|| {
            format!("Failed to write project file: {}", self.path.display())
        })?;

        tracing::info!(
            path = %self.path.display(),
            resources = config.resources_len(),
            "saved project file"
        );
        Ok(())
    }
}
