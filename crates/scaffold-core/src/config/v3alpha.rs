//! Project configuration schema version `3-alpha`.
//!
//! This version does not persist per-resource domain, plural, path,
//! namespaced flag, controller flag or webhook flags. Those fields are
//! cleared whenever a resource enters the configuration, so callers may fill
//! them transiently without them ever reaching the file.

use serde::{Deserialize, Deserializer, Serialize};

use super::plugins::{PluginConfig, PluginConfigs};
use super::version::{Stage, Version};
use super::ProjectConfig;
use crate::error::{ConfigError, Result};
use crate::model::{Gvk, Resource, is_false};

/// Version marker of this schema
pub const VERSION: Version = Version::new(3, Stage::Alpha);

/// Which per-resource version a compatibility check looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionKind {
    /// `api.crdVersion`
    Crd,
    /// `webhooks.webhookVersion`
    Webhook,
}

/// Project configuration, version `3-alpha`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct V3AlphaConfig {
    #[serde(deserialize_with = "deserialize_version")]
    version: Version,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    domain: String,
    #[serde(rename = "repo", default, skip_serializing_if = "String::is_empty")]
    repository: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    project_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    layout: String,

    #[serde(default, skip_serializing_if = "is_false")]
    multigroup: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    component_config: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    resources: Vec<Resource>,

    #[serde(default, skip_serializing_if = "PluginConfigs::is_empty")]
    plugins: PluginConfigs,
}

fn deserialize_version<'de, D>(deserializer: D) -> std::result::Result<Version, D::Error>
where
    D: Deserializer<'de>,
{
    let version = Version::deserialize(deserializer)?;
    if version != VERSION {
        return Err(serde::de::Error::custom(format!(
            "expected project version {VERSION}, found {version}"
        )));
    }
    Ok(version)
}

/// Clear every field this schema version does not persist.
pub fn redact(resource: &mut Resource) {
    resource.gvk.domain.clear();
    resource.plural.clear();
    resource.path.clear();
    if let Some(api) = resource.api.as_mut() {
        api.namespaced = false;
    }
    resource.controller = false;
    if let Some(webhooks) = resource.webhooks.as_mut() {
        webhooks.defaulting = false;
        webhooks.validation = false;
        webhooks.conversion = false;
    }
}

impl Default for V3AlphaConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl V3AlphaConfig {
    /// Create an empty configuration carrying only the version marker.
    pub fn new() -> Self {
        Self {
            version: VERSION,
            domain: String::new(),
            repository: String::new(),
            project_name: String::new(),
            layout: String::new(),
            multigroup: false,
            component_config: false,
            resources: Vec::new(),
            plugins: PluginConfigs::new(),
        }
    }

    /// Boxed constructor for the version registry.
    pub fn boxed() -> Box<dyn ProjectConfig> {
        Box::new(Self::new())
    }

    /// True unless a resource sets the selected version to something other
    /// than `version`. Resources that leave it unset are skipped.
    pub fn resources_share_version(&self, kind: VersionKind, version: &str) -> bool {
        self.resources.iter().all(|res| {
            let current = match kind {
                VersionKind::Crd => res.crd_version(),
                VersionKind::Webhook => res.webhook_version(),
            };
            current.is_empty() || current == version
        })
    }

    fn find(&self, gvk: &Gvk) -> Option<&Resource> {
        self.resources
            .iter()
            .find(|res| res.gvk.is_equal_ignoring_domain(gvk))
    }
}

impl ProjectConfig for V3AlphaConfig {
    fn version(&self) -> Version {
        self.version
    }

    fn domain(&self) -> &str {
        &self.domain
    }

    fn set_domain(&mut self, domain: &str) {
        self.domain = domain.to_string();
    }

    fn repository(&self) -> &str {
        &self.repository
    }

    fn set_repository(&mut self, repository: &str) {
        self.repository = repository.to_string();
    }

    fn project_name(&self) -> &str {
        &self.project_name
    }

    fn set_project_name(&mut self, name: &str) {
        self.project_name = name.to_string();
    }

    fn layout(&self) -> &str {
        &self.layout
    }

    fn set_layout(&mut self, layout: &str) {
        self.layout = layout.to_string();
    }

    fn is_multigroup(&self) -> bool {
        self.multigroup
    }

    fn set_multigroup(&mut self) {
        self.multigroup = true;
    }

    fn clear_multigroup(&mut self) {
        self.multigroup = false;
    }

    fn is_component_config(&self) -> bool {
        self.component_config
    }

    fn set_component_config(&mut self) {
        self.component_config = true;
    }

    fn clear_component_config(&mut self) {
        self.component_config = false;
    }

    fn resources_len(&self) -> usize {
        self.resources.len()
    }

    fn has_resource(&self, gvk: &Gvk) -> bool {
        self.find(gvk).is_some()
    }

    fn get_resource(&self, gvk: &Gvk) -> Result<Resource> {
        self.find(gvk)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownResource {
                gvk: Gvk {
                    domain: String::new(),
                    ..gvk.clone()
                },
            })
    }

    fn get_resources(&self) -> Vec<Resource> {
        self.resources.clone()
    }

    fn add_resource(&mut self, mut resource: Resource) {
        redact(&mut resource);

        if !self.has_resource(&resource.gvk) {
            self.resources.push(resource);
        }
    }

    fn update_resource(&mut self, mut resource: Resource) -> Result<()> {
        redact(&mut resource);

        match self
            .resources
            .iter()
            .position(|res| res.gvk.is_equal_ignoring_domain(&resource.gvk))
        {
            Some(index) => self.resources[index].update(&resource),
            None => {
                self.resources.push(resource);
                Ok(())
            }
        }
    }

    fn has_group(&self, group: &str) -> bool {
        self.resources
            .iter()
            .any(|res| res.gvk.group.eq_ignore_ascii_case(group))
    }

    fn is_crd_version_compatible(&self, crd_version: &str) -> bool {
        self.resources_share_version(VersionKind::Crd, crd_version)
    }

    fn is_webhook_version_compatible(&self, webhook_version: &str) -> bool {
        self.resources_share_version(VersionKind::Webhook, webhook_version)
    }

    fn plugin_config(&self, key: &str) -> Option<&PluginConfig> {
        self.plugins.get(key)
    }

    fn set_plugin_config(&mut self, key: &str, config: PluginConfig) {
        self.plugins.insert(key, config);
    }

    fn plugin_keys(&self) -> Vec<String> {
        self.plugins.keys().map(str::to_string).collect()
    }

    fn marshal(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(ConfigError::Marshal)
    }

    fn unmarshal(&mut self, content: &str) -> Result<()> {
        let mut decoded: V3AlphaConfig = toml::from_str(content).map_err(ConfigError::Unmarshal)?;

        // Files written by hand may carry fields this version drops.
        for resource in decoded.resources.iter_mut() {
            redact(resource);
        }
        for (index, resource) in decoded.resources.iter().enumerate() {
            if decoded.resources[..index]
                .iter()
                .any(|earlier| earlier.gvk.is_equal_ignoring_domain(&resource.gvk))
            {
                return Err(ConfigError::DuplicateResource {
                    gvk: resource.gvk.clone(),
                });
            }
        }

        *self = decoded;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PluginConfigExt;
    use crate::model::{Api, Webhooks};

    fn gvk(group: &str, version: &str, kind: &str) -> Gvk {
        Gvk::new(group, version, kind)
    }

    fn resource_with_versions(kind: &str, crd: &str, webhook: &str) -> Resource {
        Resource::new(gvk("cache", "v1", kind))
            .with_api(Api {
                crd_version: crd.to_string(),
                namespaced: true,
            })
            .with_webhooks(Webhooks {
                webhook_version: webhook.to_string(),
                ..Default::default()
            })
    }

    fn full_resource() -> Resource {
        Resource {
            gvk: gvk("cache", "v1alpha1", "Memcached").with_domain("my.domain"),
            plural: "memcacheds".to_string(),
            path: "example.com/api/v1alpha1".to_string(),
            api: Some(Api {
                crd_version: "v1".to_string(),
                namespaced: true,
            }),
            controller: true,
            webhooks: Some(Webhooks {
                webhook_version: "v1".to_string(),
                defaulting: true,
                validation: true,
                conversion: true,
            }),
        }
    }

    #[test]
    fn test_new_config() {
        let config = V3AlphaConfig::new();
        assert_eq!(config.version(), VERSION);
        assert_eq!(config.domain(), "");
        assert_eq!(config.resources_len(), 0);
        assert!(config.get_resources().is_empty());
        assert!(!config.is_multigroup());
        assert!(!config.is_component_config());
    }

    #[test]
    fn test_settings_accessors() {
        let mut config = V3AlphaConfig::new();
        config.set_domain("my.domain");
        config.set_repository("example.com/memcached-operator");
        config.set_project_name("memcached-operator");
        config.set_layout("go.kubebuilder.io/v3");
        config.set_multigroup();
        config.set_component_config();

        assert_eq!(config.domain(), "my.domain");
        assert_eq!(config.repository(), "example.com/memcached-operator");
        assert_eq!(config.project_name(), "memcached-operator");
        assert_eq!(config.layout(), "go.kubebuilder.io/v3");
        assert!(config.is_multigroup());
        assert!(config.is_component_config());

        config.clear_multigroup();
        config.clear_component_config();
        assert!(!config.is_multigroup());
        assert!(!config.is_component_config());
    }

    #[test]
    fn test_redact_is_idempotent() {
        let mut once = full_resource();
        redact(&mut once);
        let mut twice = once.clone();
        redact(&mut twice);

        assert_eq!(once, twice);
        assert_eq!(once.gvk.domain, "");
        assert_eq!(once.plural, "");
        assert_eq!(once.path, "");
        assert!(!once.controller);
        assert_eq!(once.crd_version(), "v1");
        assert!(!once.api.as_ref().unwrap().namespaced);
        let webhooks = once.webhooks.as_ref().unwrap();
        assert_eq!(webhooks.webhook_version, "v1");
        assert!(!webhooks.defaulting && !webhooks.validation && !webhooks.conversion);
    }

    #[test]
    fn test_add_resource_redacts_and_copies() {
        let mut config = V3AlphaConfig::new();
        let mut input = full_resource();
        config.add_resource(input.clone());

        input.api.as_mut().unwrap().crd_version = "v1beta1".to_string();

        let stored = config
            .get_resource(&gvk("cache", "v1alpha1", "Memcached"))
            .unwrap();
        assert_eq!(stored.crd_version(), "v1");
        assert_eq!(stored.gvk.domain, "");
        assert_eq!(stored.plural, "");
        assert!(!stored.controller);
    }

    #[test]
    fn test_add_resource_first_wins() {
        let mut config = V3AlphaConfig::new();
        config.add_resource(resource_with_versions("Memcached", "v1", ""));
        config.add_resource(resource_with_versions("Memcached", "v1beta1", "v1"));

        assert_eq!(config.resources_len(), 1);
        let stored = config.get_resource(&gvk("cache", "v1", "Memcached")).unwrap();
        assert_eq!(stored.crd_version(), "v1");
        assert_eq!(stored.webhook_version(), "");
    }

    #[test]
    fn test_lookup_ignores_domain() {
        let mut config = V3AlphaConfig::new();
        config.add_resource(full_resource());

        let query = gvk("cache", "v1alpha1", "Memcached").with_domain("other.io");
        assert!(config.has_resource(&query));
        assert!(config.get_resource(&query).is_ok());
        assert!(!config.has_resource(&gvk("cache", "v1alpha1", "memcached")));
    }

    #[test]
    fn test_get_resource_unknown() {
        let config = V3AlphaConfig::new();
        let query = gvk("cache", "v1", "Memcached");

        match config.get_resource(&query) {
            Err(ConfigError::UnknownResource { gvk }) => assert_eq!(gvk, query),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_returned_resource_does_not_alias() {
        let mut config = V3AlphaConfig::new();
        config.add_resource(resource_with_versions("Memcached", "v1", "v1"));

        let mut copy = config.get_resource(&gvk("cache", "v1", "Memcached")).unwrap();
        copy.api.as_mut().unwrap().crd_version = "v1beta1".to_string();
        let mut all = config.get_resources();
        all[0].webhooks = None;

        let stored = config.get_resource(&gvk("cache", "v1", "Memcached")).unwrap();
        assert_eq!(stored.crd_version(), "v1");
        assert_eq!(stored.webhook_version(), "v1");
    }

    #[test]
    fn test_update_resource_upserts() {
        let mut upserted = V3AlphaConfig::new();
        upserted
            .update_resource(resource_with_versions("Memcached", "v1", ""))
            .unwrap();

        let mut added = V3AlphaConfig::new();
        added.add_resource(resource_with_versions("Memcached", "v1", ""));

        assert_eq!(upserted, added);
    }

    #[test]
    fn test_update_resource_merges_in_place() {
        let mut config = V3AlphaConfig::new();
        config.add_resource(Resource::new(gvk("cache", "v1", "First")));
        config.add_resource(resource_with_versions("Memcached", "v1", ""));
        config.add_resource(Resource::new(gvk("cache", "v1", "Last")));

        let mut update = resource_with_versions("Memcached", "", "v1");
        update.gvk.domain = "my.domain".to_string();
        config.update_resource(update).unwrap();

        assert_eq!(config.resources_len(), 3);
        let resources = config.get_resources();
        assert_eq!(resources[1].gvk.kind, "Memcached");
        assert_eq!(resources[1].crd_version(), "v1");
        assert_eq!(resources[1].webhook_version(), "v1");
        assert_eq!(resources[2].gvk.kind, "Last");
    }

    #[test]
    fn test_update_resource_keeps_redaction() {
        let mut config = V3AlphaConfig::new();
        config.add_resource(Resource::new(gvk("cache", "v1alpha1", "Memcached")));
        config.update_resource(full_resource()).unwrap();

        let stored = config
            .get_resource(&gvk("cache", "v1alpha1", "Memcached"))
            .unwrap();
        assert!(!stored.controller);
        assert_eq!(stored.plural, "");
        assert!(!stored.webhooks.unwrap().defaulting);
    }

    #[test]
    fn test_has_group_case_insensitive() {
        let mut config = V3AlphaConfig::new();
        config.add_resource(Resource::new(gvk("foo", "v1", "Bar")));

        assert!(config.has_group("Foo"));
        assert!(config.has_group("foo"));
        assert!(config.has_group("FOO"));
        assert!(!config.has_group("fo"));
        assert!(!config.has_group("baz"));
    }

    #[test]
    fn test_crd_version_compatibility() {
        let mut config = V3AlphaConfig::new();
        assert!(config.is_crd_version_compatible("v1beta1"));

        config.add_resource(resource_with_versions("A", "v1", ""));
        config.add_resource(resource_with_versions("B", "v1", ""));
        assert!(config.is_crd_version_compatible("v1"));
        assert!(!config.is_crd_version_compatible("v1beta1"));
    }

    #[test]
    fn test_compatibility_skips_unset() {
        let mut config = V3AlphaConfig::new();
        config.add_resource(resource_with_versions("A", "v1", "v1beta1"));
        config.add_resource(resource_with_versions("B", "", ""));
        config.add_resource(Resource::new(gvk("cache", "v1", "C")));

        assert!(config.is_crd_version_compatible("v1"));
        assert!(config.is_webhook_version_compatible("v1beta1"));
        assert!(!config.is_webhook_version_compatible("v1"));
        assert!(config.resources_share_version(VersionKind::Crd, "v1"));
    }

    #[test]
    fn test_plugin_config_roundtrip() {
        #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
        struct Sample {
            #[serde(default)]
            name: String,
            #[serde(default)]
            replicas: i64,
        }

        let mut config = V3AlphaConfig::new();
        assert_eq!(config.decode_plugin_config::<Sample>("sample").unwrap(), None);

        let sample = Sample {
            name: "memcached".to_string(),
            replicas: 3,
        };
        config.encode_plugin_config("sample/v1", &sample).unwrap();

        assert_eq!(config.plugin_keys(), vec!["sample/v1".to_string()]);
        assert_eq!(config.decode_plugin_config::<Sample>("other").unwrap(), None);
        assert_eq!(
            config.decode_plugin_config::<Sample>("sample/v1").unwrap(),
            Some(sample)
        );
    }

    #[test]
    fn test_marshal_layout() {
        let mut config = V3AlphaConfig::new();
        config.set_domain("my.domain");
        config.set_repository("example.com/memcached-operator");
        config.set_project_name("memcached-operator");
        config.add_resource(Resource::new(gvk("cache", "v1alpha1", "Memcached")).with_api(
            Api {
                crd_version: String::new(),
                namespaced: true,
            },
        ));

        let content = config.marshal().unwrap();
        assert!(content.starts_with("version = \"3-alpha\""));
        assert!(content.contains("repo = \"example.com/memcached-operator\""));
        assert!(content.contains("projectName = \"memcached-operator\""));
        assert!(content.contains("[[resources]]"));
        assert!(!content.contains("layout"));
        assert!(!content.contains("multigroup"));
        assert!(!content.contains("plugins"));
        // namespaced was redacted, leaving an empty api table behind
        assert!(!content.contains("api"));

        // tracked state keeps the (empty) sub-structure
        let stored = config
            .get_resource(&gvk("cache", "v1alpha1", "Memcached"))
            .unwrap();
        assert_eq!(stored.api, Some(Api::default()));
    }

    #[test]
    fn test_marshal_unmarshal_roundtrip() {
        let mut config = V3AlphaConfig::new();
        config.set_domain("my.domain");
        config.set_layout("go.kubebuilder.io/v3");
        config.set_multigroup();
        config.add_resource(resource_with_versions("Memcached", "v1", "v1"));
        config.add_resource(Resource::new(gvk("ship", "v1beta1", "Frigate")));
        config
            .encode_plugin_config("declarative.go.kubebuilder.io/v1", &toml::toml! {
                resources = ["cache/v1/Memcached"]
            })
            .unwrap();

        let content = config.marshal().unwrap();
        let mut decoded = V3AlphaConfig::new();
        decoded.unmarshal(&content).unwrap();

        assert_eq!(decoded, config);
        assert_eq!(decoded.get_resources(), config.get_resources());
    }

    #[test]
    fn test_unmarshal_rejects_unknown_fields() {
        let mut config = V3AlphaConfig::new();

        let top_level = "version = \"3-alpha\"\nfoo = \"bar\"\n";
        assert!(matches!(
            config.unmarshal(top_level),
            Err(ConfigError::Unmarshal(_))
        ));

        let nested = r#"
version = "3-alpha"

[[resources]]
group = "cache"
version = "v1"
kind = "Memcached"

[resources.api]
crdVersion = "v1"
scope = "Cluster"
"#;
        assert!(config.unmarshal(nested).is_err());
    }

    #[test]
    fn test_unmarshal_rejects_other_version() {
        let mut config = V3AlphaConfig::new();
        let err = config.unmarshal("version = \"2\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Unmarshal(_)));
        assert!(config.unmarshal("domain = \"my.domain\"\n").is_err());
    }

    #[test]
    fn test_unmarshal_redacts_loaded_resources() {
        let content = r#"
version = "3-alpha"
domain = "my.domain"

[[resources]]
group = "cache"
domain = "my.domain"
version = "v1"
kind = "Memcached"
plural = "memcacheds"
controller = true

[resources.api]
crdVersion = "v1"
namespaced = true
"#;
        let mut config = V3AlphaConfig::new();
        config.unmarshal(content).unwrap();

        assert_eq!(config.domain(), "my.domain");
        assert_eq!(config.resources_len(), 1);
        let stored = config.get_resource(&gvk("cache", "v1", "Memcached")).unwrap();
        assert_eq!(stored.gvk.domain, "");
        assert_eq!(stored.plural, "");
        assert!(!stored.controller);
        assert_eq!(stored.crd_version(), "v1");
        assert!(!stored.api.unwrap().namespaced);
    }

    #[test]
    fn test_unmarshal_rejects_duplicate_resources() {
        let content = r#"
version = "3-alpha"

[[resources]]
group = "cache"
domain = "my.domain"
version = "v1"
kind = "Memcached"

[resources.api]
crdVersion = "v1"

[[resources]]
group = "cache"
version = "v1"
kind = "Memcached"

[resources.api]
crdVersion = "v1beta1"
"#;
        let mut config = V3AlphaConfig::new();
        config.set_domain("kept.domain");

        match config.unmarshal(content) {
            Err(ConfigError::DuplicateResource { gvk: duplicate }) => {
                assert_eq!(duplicate, gvk("cache", "v1", "Memcached"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(config.domain(), "kept.domain");
        assert_eq!(config.resources_len(), 0);
    }

    #[test]
    fn test_failed_unmarshal_leaves_config_untouched() {
        let mut config = V3AlphaConfig::new();
        config.set_domain("my.domain");

        assert!(config.unmarshal("not toml at all [").is_err());
        assert_eq!(config.domain(), "my.domain");
    }
}
