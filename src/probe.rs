use k8s_openapi::api::core::v1 as core;
use kube::{
    Client,
    api::{Api, ListParams},
    config::KubeConfigOptions,
};
use std::future::Future;
use std::time::Duration;

use crate::error::Result;

/// Checks a published kubeconfig actually grants access to its cluster.
pub trait Probe {
    fn probe(&self, kubeconfig: &str) -> impl Future<Output = Result<()>> + Send;
}

/// Lists namespaces through a client built from the kubeconfig.
#[derive(Clone)]
pub struct KubeProbe {
    pub timeout: Duration,
}

impl KubeProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Probe for KubeProbe {
    async fn probe(&self, kubeconfig: &str) -> Result<()> {
        let kubeconfig = kube::config::Kubeconfig::from_yaml(kubeconfig)?;
        let mut config =
            kube::Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default()).await?;
        config.connect_timeout = Some(self.timeout);
        config.read_timeout = Some(self.timeout);

        let client = Client::try_from(config)?;
        let namespaces = Api::<core::Namespace>::all(client);
        namespaces.list_metadata(&ListParams::default().limit(1)).await?;
        Ok(())
    }
}
