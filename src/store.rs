use std::collections::BTreeMap as Map;
use std::future::Future;

use crate::ObjectKey;
use crate::error::Result;

pub mod kube;
#[cfg(test)]
pub mod memory;

pub type SecretData = Map<String, Vec<u8>>;

/// Where namespaces and secrets are published.
pub trait ObjectStore {
    fn list_namespaces(&self) -> impl Future<Output = Result<Vec<String>>> + Send;

    fn create_namespace(&self, name: &str) -> impl Future<Output = Result<()>> + Send;

    fn list_secrets(&self) -> impl Future<Output = Result<Vec<ObjectKey>>> + Send;

    fn create_secret(
        &self,
        key: &ObjectKey,
        data: SecretData,
    ) -> impl Future<Output = Result<()>> + Send;

    /// `None` if the secret does not exist.
    fn get_secret(&self, key: &ObjectKey) -> impl Future<Output = Result<Option<SecretData>>> + Send;
}
