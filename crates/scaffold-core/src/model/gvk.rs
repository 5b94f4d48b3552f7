//! Group/Version/Kind identifier of an API resource.

use std::fmt;

/// Identifies a resource kind within a project.
///
/// Structural equality (`==`) compares every field, domain included. Schema
/// versions that do not track a per-resource domain compare with
/// [`Gvk::is_equal_ignoring_domain`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Gvk {
    /// API group, without the domain suffix (may be empty for the core group)
    pub group: String,
    /// Domain the group belongs to
    pub domain: String,
    /// API version (e.g., "v1alpha1")
    pub version: String,
    /// Kind name (e.g., "Memcached")
    pub kind: String,
}

impl Gvk {
    /// Create an identifier without a domain.
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            domain: String::new(),
            version: version.into(),
            kind: kind.into(),
        }
    }

    /// Set the domain.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// True iff group, version and kind match exactly. Domain is not compared.
    pub fn is_equal_ignoring_domain(&self, other: &Gvk) -> bool {
        self.group == other.group && self.version == other.version && self.kind == other.kind
    }

    /// Group joined with the domain, e.g. `cache.my.domain`.
    pub fn qualified_group(&self) -> String {
        match (self.group.is_empty(), self.domain.is_empty()) {
            (_, true) => self.group.clone(),
            (true, false) => self.domain.clone(),
            (false, false) => format!("{}.{}", self.group, self.domain),
        }
    }
}

impl fmt::Display for Gvk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let group = self.qualified_group();
        if group.is_empty() {
            write!(f, "{}, Kind={}", self.version, self.kind)
        } else {
            write!(f, "{}/{}, Kind={}", group, self.version, self.kind)
        }
    }
}
