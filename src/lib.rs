use k8s_openapi::apimachinery::pkg::apis::meta::v1 as meta;

pub mod address;
pub mod allowlist;
pub mod controller;
pub mod crd;
pub mod credential;
pub mod error;
pub mod firewall;
pub mod kubeconfig;
pub mod probe;
pub mod provider;
pub mod reconcile;
pub mod remap;
pub mod source;
pub mod store;

pub use error::{Error, Result};

#[cfg(test)]
mod test;

/// Namespaced name of a Kubernetes object.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct ObjectKey {
    pub namespace: String,
    pub name: String,
}
impl ObjectKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}
impl TryFrom<&meta::ObjectMeta> for ObjectKey {
    type Error = &'static str;
    fn try_from(metadata: &meta::ObjectMeta) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            namespace: metadata.namespace.clone().ok_or("no namespace")?,
            name: metadata.name.clone().ok_or("no name")?,
        })
    }
}
impl std::fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}
