use std::collections::{BTreeMap as Map, BTreeSet as Set};
use std::sync::Mutex;

use super::{ObjectStore, SecretData};
use crate::ObjectKey;
use crate::error::{Error, Result};

/// In-memory store recording every create call.
#[derive(Default)]
pub struct MemoryStore {
    pub state: Mutex<State>,
}

#[derive(Default)]
pub struct State {
    pub namespaces: Set<String>,
    pub secrets: Map<ObjectKey, SecretData>,
    pub creates: Vec<String>,
    pub fail_list: bool,
}

impl MemoryStore {
    pub fn creates(&self) -> Vec<String> {
        self.state.lock().unwrap().creates.clone()
    }

    pub fn secret(&self, namespace: &str, name: &str) -> Option<SecretData> {
        let key = ObjectKey {
            namespace: namespace.to_string(),
            name: name.to_string(),
        };
        self.state.lock().unwrap().secrets.get(&key).cloned()
    }

    fn check_list(&self, op: &'static str) -> Result<()> {
        if !self.state.lock().unwrap().fail_list {
            return Ok(());
        }
        Err(Error::ObjectStore {
            op,
            source: kube::Error::Api(kube::error::ErrorResponse {
                status: "Failure".to_string(),
                message: "etcdserver: request timed out".to_string(),
                reason: "InternalError".to_string(),
                code: 500,
            }),
        })
    }
}

impl ObjectStore for MemoryStore {
    async fn list_namespaces(&self) -> Result<Vec<String>> {
        self.check_list("list namespaces")?;
        Ok(self.state.lock().unwrap().namespaces.iter().cloned().collect())
    }

    async fn create_namespace(&self, name: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.namespaces.insert(name.to_string());
        state.creates.push(format!("namespace/{name}"));
        Ok(())
    }

    async fn list_secrets(&self) -> Result<Vec<ObjectKey>> {
        self.check_list("list secrets")?;
        Ok(self.state.lock().unwrap().secrets.keys().cloned().collect())
    }

    async fn create_secret(&self, key: &ObjectKey, data: SecretData) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.secrets.insert(key.clone(), data);
        state.creates.push(format!("secret/{key}"));
        Ok(())
    }

    async fn get_secret(&self, key: &ObjectKey) -> Result<Option<SecretData>> {
        Ok(self.state.lock().unwrap().secrets.get(key).cloned())
    }
}
