//! Scaffolding state tracked for a single API resource.

use serde::{Deserialize, Serialize};

use super::{Gvk, is_false};
use crate::error::{ConfigError, Result};

/// A scaffolded API resource.
///
/// Cloning yields a fully independent copy; the configuration registry hands
/// out and stores clones only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ResourceDocument", into = "ResourceDocument")]
pub struct Resource {
    /// Resource identifier
    pub gvk: Gvk,
    /// Plural form of the kind
    pub plural: String,
    /// Go import path of the API package
    pub path: String,
    /// API scaffolding details, if an API was created
    pub api: Option<Api>,
    /// Whether a controller was scaffolded
    pub controller: bool,
    /// Webhook scaffolding details, if webhooks were created
    pub webhooks: Option<Webhooks>,
}

/// API (CRD) scaffolding details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct Api {
    /// CustomResourceDefinition API version (e.g., "v1")
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub crd_version: String,
    /// Whether the resource is namespace-scoped
    #[serde(default, skip_serializing_if = "is_false")]
    pub namespaced: bool,
}

/// Webhook scaffolding details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct Webhooks {
    /// Admission webhook API version (e.g., "v1")
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub webhook_version: String,
    /// Whether a defaulting (mutating) webhook was scaffolded
    #[serde(default, skip_serializing_if = "is_false")]
    pub defaulting: bool,
    /// Whether a validating webhook was scaffolded
    #[serde(default, skip_serializing_if = "is_false")]
    pub validation: bool,
    /// Whether a conversion webhook was scaffolded
    #[serde(default, skip_serializing_if = "is_false")]
    pub conversion: bool,
}

impl Api {
    /// True when every field holds its default value.
    pub fn is_empty(&self) -> bool {
        self.crd_version.is_empty() && !self.namespaced
    }

    /// Merge `other` into `self`: a non-empty version overwrites, flags are OR-ed.
    pub fn update(&mut self, other: &Api) {
        if !other.crd_version.is_empty() {
            self.crd_version.clone_from(&other.crd_version);
        }
        self.namespaced |= other.namespaced;
    }
}

impl Webhooks {
    /// True when every field holds its default value.
    pub fn is_empty(&self) -> bool {
        self.webhook_version.is_empty() && !self.defaulting && !self.validation && !self.conversion
    }

    /// Merge `other` into `self`: a non-empty version overwrites, flags are OR-ed.
    pub fn update(&mut self, other: &Webhooks) {
        if !other.webhook_version.is_empty() {
            self.webhook_version.clone_from(&other.webhook_version);
        }
        self.defaulting |= other.defaulting;
        self.validation |= other.validation;
        self.conversion |= other.conversion;
    }
}

impl Resource {
    /// Create a resource with nothing scaffolded yet.
    pub fn new(gvk: Gvk) -> Self {
        Self {
            gvk,
            ..Default::default()
        }
    }

    /// Set the API details.
    pub fn with_api(mut self, api: Api) -> Self {
        self.api = Some(api);
        self
    }

    /// Set the webhook details.
    pub fn with_webhooks(mut self, webhooks: Webhooks) -> Self {
        self.webhooks = Some(webhooks);
        self
    }

    /// CRD version of the API, or an empty string when unset.
    pub fn crd_version(&self) -> &str {
        self.api.as_ref().map_or("", |api| api.crd_version.as_str())
    }

    /// Webhook version, or an empty string when unset.
    pub fn webhook_version(&self) -> &str {
        self.webhooks
            .as_ref()
            .map_or("", |webhooks| webhooks.webhook_version.as_str())
    }

    /// Merge another description of the same resource into this one.
    ///
    /// Non-empty strings in `other` overwrite, empty ones leave the current
    /// value. Flags only ever turn on. Sub-structures are created when `other`
    /// carries one and `self` does not.
    pub fn update(&mut self, other: &Resource) -> Result<()> {
        if self.gvk != other.gvk {
            return Err(ConfigError::GvkMismatch {
                expected: self.gvk.clone(),
                found: other.gvk.clone(),
            });
        }

        if !other.plural.is_empty() {
            self.plural.clone_from(&other.plural);
        }
        if !other.path.is_empty() {
            self.path.clone_from(&other.path);
        }

        if let Some(other_api) = &other.api {
            self.api.get_or_insert_with(Api::default).update(other_api);
        }

        self.controller |= other.controller;

        if let Some(other_webhooks) = &other.webhooks {
            self.webhooks
                .get_or_insert_with(Webhooks::default)
                .update(other_webhooks);
        }

        Ok(())
    }
}

/// On-disk shape of a resource.
///
/// The identifier fields are flat in the document. `#[serde(flatten)]` would
/// disable `deny_unknown_fields`, so the conversion happens here instead.
/// Empty `api`/`webhooks` sub-structures are dropped on every conversion so
/// they never reach the output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct ResourceDocument {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    group: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    domain: String,
    version: String,
    kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    plural: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    path: String,
    #[serde(default, skip_serializing_if = "is_false")]
    controller: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    api: Option<Api>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    webhooks: Option<Webhooks>,
}

impl From<ResourceDocument> for Resource {
    fn from(doc: ResourceDocument) -> Self {
        Resource {
            gvk: Gvk {
                group: doc.group,
                domain: doc.domain,
                version: doc.version,
                kind: doc.kind,
            },
            plural: doc.plural,
            path: doc.path,
            api: doc.api,
            controller: doc.controller,
            webhooks: doc.webhooks,
        }
    }
}

impl From<Resource> for ResourceDocument {
    fn from(res: Resource) -> Self {
        ResourceDocument {
            group: res.gvk.group,
            domain: res.gvk.domain,
            version: res.gvk.version,
            kind: res.gvk.kind,
            plural: res.plural,
            path: res.path,
            controller: res.controller,
            api: res.api.filter(|api| !api.is_empty()),
            webhooks: res.webhooks.filter(|webhooks| !webhooks.is_empty()),
        }
    }
}
