use k8s_openapi::ByteString;
use k8s_openapi::api::core::v1 as core;
use k8s_openapi::apimachinery::pkg::apis::meta::v1 as meta;
use kube::{
    Client,
    api::{Api, ListParams, PostParams},
};
use log::debug;

use super::{ObjectStore, SecretData};
use crate::ObjectKey;
use crate::error::{Error, Result};

pub const MANAGED_BY: &str = "kubeconfig-operator";

/// Object store backed by the API server of the cluster the operator runs in.
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
}

impl KubeStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn labels() -> Option<std::collections::BTreeMap<String, String>> {
        Some(
            [(
                "app.kubernetes.io/managed-by".to_string(),
                MANAGED_BY.to_string(),
            )]
            .into(),
        )
    }
}

impl ObjectStore for KubeStore {
    async fn list_namespaces(&self) -> Result<Vec<String>> {
        let api = Api::<core::Namespace>::all(self.client.clone());
        let list = (api.list(&ListParams::default()).await).map_err(Error::store("list namespaces"))?;
        Ok(list.items.into_iter().filter_map(|ns| ns.metadata.name).collect())
    }

    async fn create_namespace(&self, name: &str) -> Result<()> {
        let api = Api::<core::Namespace>::all(self.client.clone());
        let ns = core::Namespace {
            metadata: meta::ObjectMeta {
                name: Some(name.to_string()),
                labels: Self::labels(),
                ..Default::default()
            },
            ..Default::default()
        };
        api.create(&PostParams::default(), &ns).await?;
        debug!("created namespace {name}");
        Ok(())
    }

    async fn list_secrets(&self) -> Result<Vec<ObjectKey>> {
        let api = Api::<core::Secret>::all(self.client.clone());
        let list = (api.list_metadata(&ListParams::default()).await).map_err(Error::store("list secrets"))?;
        Ok((list.items.iter())
            .filter_map(|s| ObjectKey::try_from(&s.metadata).ok())
            .collect())
    }

    async fn create_secret(&self, key: &ObjectKey, data: SecretData) -> Result<()> {
        let api = Api::<core::Secret>::namespaced(self.client.clone(), &key.namespace);
        let secret = core::Secret {
            metadata: meta::ObjectMeta {
                name: Some(key.name.clone()),
                namespace: Some(key.namespace.clone()),
                labels: Self::labels(),
                ..Default::default()
            },
            data: Some(data.into_iter().map(|(k, v)| (k, ByteString(v))).collect()),
            ..Default::default()
        };
        api.create(&PostParams::default(), &secret).await?;
        debug!("created secret {key}");
        Ok(())
    }

    async fn get_secret(&self, key: &ObjectKey) -> Result<Option<SecretData>> {
        let api = Api::<core::Secret>::namespaced(self.client.clone(), &key.namespace);
        let Some(secret) = api.get_opt(&key.name).await? else {
            return Ok(None);
        };
        Ok(Some(
            (secret.data.into_iter().flatten())
                .map(|(k, v)| (k, v.0))
                .collect(),
        ))
    }
}
