use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::kubeconfig::{AuthInfo, Cluster, Kubeconfig};
use crate::provider::ProviderKind;

pub mod eks;

#[cfg(test)]
mod test;

pub const EXEC_CREDENTIAL_API_VERSION: &str = "client.authentication.k8s.io/v1beta1";
pub const EXEC_CREDENTIAL_KIND: &str = "ExecCredential";

/// Everything known about a context once its server has been remapped.
#[derive(Debug, Clone, Default)]
pub struct Connection {
    /// cluster reference in the source kubeconfig; an ARN for EKS clusters
    pub cluster: String,
    /// effective server address
    pub server: String,
    pub ca_data: Option<String>,
    pub ca_file: Option<String>,
    pub insecure: Option<bool>,
    pub username: String,
    pub client_cert_data: Option<String>,
    pub client_key_data: Option<String>,
}

/// Short-lived token source for clusters that authenticate with a cloud identity.
pub trait TokenMinter {
    fn mint(&self, cluster: &str, host: &str) -> Result<ExecCredential>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecCredential {
    pub api_version: String,
    pub kind: String,
    pub status: ExecCredentialStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecCredentialStatus {
    pub expiration_timestamp: DateTime<Utc>,
    pub token: String,
}

impl ExecCredential {
    pub fn new(token: String, expiration_timestamp: DateTime<Utc>) -> Self {
        Self {
            api_version: EXEC_CREDENTIAL_API_VERSION.to_string(),
            kind: EXEC_CREDENTIAL_KIND.to_string(),
            status: ExecCredentialStatus {
                expiration_timestamp,
                token,
            },
        }
    }
}

/// Build the kubeconfig published for `context`.
pub fn materialize(
    kind: ProviderKind,
    context: &str,
    conn: &Connection,
    minter: &impl TokenMinter,
) -> Result<Kubeconfig> {
    let auth_info = match kind {
        ProviderKind::Aws => {
            let credential = minter.mint(&conn.cluster, &conn.server)?;
            AuthInfo {
                token: Some(credential.status.token),
                ..Default::default()
            }
        }
        ProviderKind::ClientCert => {
            let (Some(cert), Some(key)) = (&conn.client_cert_data, &conn.client_key_data) else {
                return Err(Error::MissingClientCertificate(conn.username.clone()));
            };
            AuthInfo {
                client_certificate_data: Some(cert.clone()),
                client_key_data: Some(key.clone()),
                ..Default::default()
            }
        }
        ProviderKind::Azure | ProviderKind::Gcp | ProviderKind::Oidc | ProviderKind::Unknown => {
            return Err(Error::UnsupportedProvider(kind));
        }
    };

    let cluster = Cluster {
        server: Some(conn.server.clone()),
        certificate_authority: conn.ca_file.clone(),
        certificate_authority_data: conn.ca_data.clone(),
        insecure_skip_tls_verify: conn.insecure,
    };

    Ok(Kubeconfig::single(context, &conn.username, cluster, auth_info))
}
