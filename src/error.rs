use std::path::PathBuf;

use crate::provider::ProviderKind;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("malformed address {address:?}: {reason}")]
    MalformedAddress {
        address: String,
        reason: &'static str,
    },

    #[error("context {0:?} not found")]
    ContextNotFound(String),

    #[error("cluster {0:?} not found")]
    ClusterNotFound(String),

    #[error("auth info {0:?} not found")]
    AuthInfoNotFound(String),

    #[error("context name {0:?} has no character usable in an object name")]
    InvalidName(String),

    #[error("context {context:?} maps to {name:?}, already used by context {claimed_by:?}")]
    NameCollision {
        context: String,
        name: String,
        claimed_by: String,
    },

    #[error("provider {0} is not supported")]
    UnsupportedProvider(ProviderKind),

    #[error("auth info {0:?} has no client certificate and key data")]
    MissingClientCertificate(String),

    #[error("failed to mint token: {0}")]
    TokenMint(String),

    #[error("failed to {op}: {source}")]
    ObjectStore {
        op: &'static str,
        #[source]
        source: kube::Error,
    },

    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid kubeconfig: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid client config: {0}")]
    ClientConfig(#[from] kube::config::KubeconfigError),

    #[error(transparent)]
    Kube(#[from] kube::Error),
}

impl Error {
    pub(crate) fn malformed(address: &str, reason: &'static str) -> Self {
        Self::MalformedAddress {
            address: address.to_string(),
            reason,
        }
    }

    pub(crate) fn store(op: &'static str) -> impl FnOnce(kube::Error) -> Self {
        move |source| Self::ObjectStore { op, source }
    }
}
