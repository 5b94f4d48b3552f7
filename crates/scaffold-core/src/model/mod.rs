//! Resource model shared by every configuration schema version.

mod gvk;
mod resource;

pub use gvk::Gvk;
pub use resource::{Api, Resource, Webhooks};

pub(crate) fn is_false(value: &bool) -> bool {
    !*value
}
