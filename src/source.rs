use base64::{Engine, engine::general_purpose::STANDARD};
use log::warn;
use std::collections::BTreeMap as Map;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::kubeconfig::Kubeconfig;


/// A context as listed from the kubeconfig source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextRef {
    pub name: String,
    pub cluster: String,
    pub user: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterInfo {
    pub server: String,
    /// base64 encoded PEM
    pub ca_data: Option<String>,
    pub ca_file: Option<String>,
    pub insecure: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthInfoRef {
    pub exec_command: Option<String>,
    /// base64 encoded PEM
    pub client_cert_data: Option<String>,
    /// base64 encoded PEM
    pub client_key_data: Option<String>,
    pub username: Option<String>,
}

/// Kubeconfig file the published contexts are discovered from.
///
/// File references are resolved relative to the file's directory and inlined, so
/// what comes out of here can be published to another cluster as-is. Referenced
/// files are loaded by [`Source::read`]; a source built from text has none.
pub struct Source {
    config: Kubeconfig,
    base_dir: Option<PathBuf>,
    files: Map<String, io::Result<Vec<u8>>>,
}

impl Source {
    pub async fn read(path: &Path) -> Result<Self> {
        let text = (tokio::fs::read_to_string(path).await).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut source = Self::from_yaml(&text)?;
        source.base_dir = path.parent().map(Path::to_path_buf);
        source.load_files().await;
        Ok(source)
    }

    async fn load_files(&mut self) {
        let clusters = (self.config.clusters.iter())
            .filter(|c| c.cluster.certificate_authority_data.is_none())
            .filter_map(|c| c.cluster.certificate_authority.clone());
        let users = self.config.auth_infos.iter().flat_map(|a| {
            let user = &a.user;
            [
                (user.client_certificate_data.is_none())
                    .then(|| user.client_certificate.clone())
                    .flatten(),
                (user.client_key_data.is_none())
                    .then(|| user.client_key.clone())
                    .flatten(),
            ]
            .into_iter()
            .flatten()
        });
        let refs: Vec<String> = clusters.chain(users).collect();

        for file in refs {
            if self.files.contains_key(&file) {
                continue;
            }
            let data = tokio::fs::read(self.resolve(&file)).await;
            self.files.insert(file, data);
        }
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(Self::new(Kubeconfig::from_yaml(text)?))
    }

    pub fn new(config: Kubeconfig) -> Self {
        Self {
            config,
            base_dir: None,
            files: Map::new(),
        }
    }

    pub fn contexts(&self) -> Vec<ContextRef> {
        (self.config.contexts.iter())
            .map(|c| ContextRef {
                name: c.name.clone(),
                cluster: c.context.cluster.clone(),
                user: c.context.user.clone(),
            })
            .collect()
    }

    #[cfg(test)]
    pub fn context(&self, name: &str) -> Result<ContextRef> {
        let ctx = (self.config.context(name)).ok_or_else(|| Error::ContextNotFound(name.to_string()))?;
        Ok(ContextRef {
            name: name.to_string(),
            cluster: ctx.cluster.clone(),
            user: ctx.user.clone(),
        })
    }

    pub fn cluster(&self, name: &str) -> Result<ClusterInfo> {
        let cluster = (self.config.cluster(name)).ok_or_else(|| Error::ClusterNotFound(name.to_string()))?;

        let mut info = ClusterInfo {
            server: cluster.server.clone().unwrap_or_default(),
            ca_data: cluster.certificate_authority_data.clone(),
            ca_file: None,
            insecure: cluster.insecure_skip_tls_verify,
        };

        if info.ca_data.is_none() {
            if let Some(file) = cluster.certificate_authority.as_ref() {
                match self.file_b64(file) {
                    Ok(data) => info.ca_data = Some(data),
                    Err(e) => {
                        warn!("cluster {name}: not inlining certificate authority: {e}");
                        info.ca_file = Some(file.clone());
                    }
                }
            }
        }

        Ok(info)
    }

    pub fn auth_info(&self, name: &str) -> Result<AuthInfoRef> {
        let auth = (self.config.auth_info(name)).ok_or_else(|| Error::AuthInfoNotFound(name.to_string()))?;

        let client_cert_data = match (&auth.client_certificate_data, &auth.client_certificate) {
            (Some(data), _) => Some(data.clone()),
            (None, Some(file)) => Some(self.file_b64(file)?),
            (None, None) => None,
        };
        let client_key_data = match (&auth.client_key_data, &auth.client_key) {
            (Some(data), _) => Some(data.clone()),
            (None, Some(file)) => Some(self.file_b64(file)?),
            (None, None) => None,
        };

        Ok(AuthInfoRef {
            exec_command: auth.exec.as_ref().map(|e| e.command.clone()),
            client_cert_data,
            client_key_data,
            username: auth.username.clone().filter(|u| !u.is_empty()),
        })
    }

    fn resolve(&self, file: &str) -> PathBuf {
        match &self.base_dir {
            Some(dir) => dir.join(file),
            None => PathBuf::from(file),
        }
    }

    fn file_b64(&self, file: &str) -> Result<String> {
        let source = match self.files.get(file) {
            Some(Ok(data)) => return Ok(STANDARD.encode(data)),
            Some(Err(e)) => io::Error::new(e.kind(), e.to_string()),
            None => io::Error::new(io::ErrorKind::NotFound, "file not loaded"),
        };
        Err(Error::Read {
            path: self.resolve(file),
            source,
        })
    }
}
