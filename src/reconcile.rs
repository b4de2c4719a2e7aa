use k8s_openapi::apimachinery::pkg::apis::meta::v1 as meta;
use log::{debug, error, info, trace, warn};
use std::collections::{BTreeMap as Map, BTreeSet as Set};
use std::net::IpAddr;

use crate::ObjectKey;
use crate::allowlist::Allowlist;
use crate::credential::{self, Connection, TokenMinter};
use crate::crd::{ClusterSpec, ClusterStatus, ClusterStatusEntry};
use crate::error::{Error, Result};
use crate::firewall::Dialect;
use crate::probe::Probe;
use crate::provider::ProviderKind;
use crate::remap::{Remapped, remap};
use crate::source::{ClusterInfo, ContextRef, Source};
use crate::store::{ObjectStore, SecretData};

/// Data key of the kubeconfig in published secrets.
pub const SECRET_KEY: &str = "value";
pub const SECRET_SUFFIX: &str = "-kubeconfig";


/// Inputs of a pass, taken from the `Cluster` spec.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub remap_to: String,
    pub namespace_prefix: String,
    pub additional_domains: Vec<String>,
    pub firewall: Dialect,
}

impl From<&ClusterSpec> for Options {
    fn from(spec: &ClusterSpec) -> Self {
        Self {
            remap_to: spec.remap_to_ip.clone().unwrap_or_default(),
            namespace_prefix: spec.namespace_prefix.clone(),
            additional_domains: spec.additional_domains.clone(),
            firewall: spec.firewall_format,
        }
    }
}

pub struct Engine<'t, S, P, T> {
    pub store: &'t S,
    pub probe: &'t P,
    pub minter: &'t T,
    pub options: Options,
}

/// Objects known to exist during a pass.
struct Snapshot {
    namespaces: Set<String>,
    secrets: Set<ObjectKey>,
    /// sanitized name => context publishing under it
    claimed: Map<String, String>,
}

impl<'t, S, P, T> Engine<'t, S, P, T>
where
    S: ObjectStore + Sync,
    P: Probe + Sync,
    T: TokenMinter + Sync,
{
    /// Publish every allowed context of `source` and compute the resulting status.
    ///
    /// Failures of a single context are logged and the context is left out of the
    /// status. Failing to list existing objects aborts the pass.
    pub async fn reconcile(&self, source: &Source) -> Result<ClusterStatus> {
        let allowlist = Allowlist::new(&self.options.additional_domains);
        let contexts = self.allowed_contexts(source, &allowlist);
        debug!("{} allowed contexts", contexts.len());

        let mut snapshot = Snapshot {
            namespaces: self.store.list_namespaces().await?.into_iter().collect(),
            secrets: self.store.list_secrets().await?.into_iter().collect(),
            claimed: Map::new(),
        };

        let mut status = ClusterStatus::default();

        for (ctx, cluster) in contexts {
            let res = (self.reconcile_context(source, &ctx, cluster, &mut snapshot, &mut status)).await;
            if let Err(e) = res {
                error!("context {}: {e}", ctx.name);
            }
        }

        info!(
            "{} clusters published, {} firewall rules",
            status.clusters.len(),
            status.firewall_rules.len()
        );
        Ok(status)
    }

    fn allowed_contexts(&self, source: &Source, allowlist: &Allowlist) -> Vec<(ContextRef, ClusterInfo)> {
        (source.contexts().into_iter())
            .filter_map(|ctx| match source.cluster(&ctx.cluster) {
                Ok(cluster) if allowlist.contains(&cluster.server) => Some((ctx, cluster)),
                Ok(cluster) => {
                    trace!("context {}: server {} not allowed", ctx.name, cluster.server);
                    None
                }
                Err(e) => {
                    warn!("context {}: {e}", ctx.name);
                    None
                }
            })
            .collect()
    }

    async fn reconcile_context(
        &self,
        source: &Source,
        ctx: &ContextRef,
        cluster: ClusterInfo,
        snapshot: &mut Snapshot,
        status: &mut ClusterStatus,
    ) -> Result<()> {
        let name = sanitize(&ctx.name);
        if name.is_empty() {
            return Err(Error::InvalidName(ctx.name.clone()));
        }
        if let Some(claimed_by) = snapshot.claimed.get(&name) {
            return Err(Error::NameCollision {
                context: ctx.name.clone(),
                name,
                claimed_by: claimed_by.clone(),
            });
        }
        snapshot.claimed.insert(name.clone(), ctx.name.clone());

        let auth = source.auth_info(&ctx.user)?;

        let provider = ProviderKind::classify(auth.exec_command.as_deref());
        let remapped = remap(&cluster.server, &self.options.remap_to)?;
        debug!(
            "context {}: provider {provider}, server {}",
            ctx.name, remapped.server
        );

        let conn = Connection {
            cluster: ctx.cluster.clone(),
            server: remapped.server.clone(),
            ca_data: cluster.ca_data,
            ca_file: cluster.ca_file,
            insecure: cluster.insecure,
            username: auth.username.unwrap_or_else(|| ctx.user.clone()),
            client_cert_data: auth.client_cert_data,
            client_key_data: auth.client_key_data,
        };
        let doc = credential::materialize(provider, &ctx.name, &conn, self.minter)?;

        let namespace = namespace_name(&self.options.namespace_prefix, &name);
        let secret = ObjectKey {
            namespace: namespace.clone(),
            name: format!("{name}{SECRET_SUFFIX}"),
        };

        if !snapshot.namespaces.contains(&namespace) {
            self.store.create_namespace(&namespace).await?;
            info!("context {}: created namespace {namespace}", ctx.name);
            snapshot.namespaces.insert(namespace.clone());
        }

        if !snapshot.secrets.contains(&secret) {
            let yaml = doc.to_yaml()?;
            let data = SecretData::from([(SECRET_KEY.to_string(), yaml.into_bytes())]);
            self.store.create_secret(&secret, data).await?;
            info!("context {}: created secret {secret}", ctx.name);
            snapshot.secrets.insert(secret.clone());
        }

        let ready = self.is_ready(&secret).await;

        status.clusters.insert(
            ctx.name.clone(),
            ClusterStatusEntry {
                ready,
                endpoint: remapped.server.clone(),
                kube_config: secret.name.clone(),
                last_update_time: meta::Time(chrono::Utc::now()),
            },
        );

        self.firewall_rules(&remapped, ready, status);

        Ok(())
    }

    /// Dial the cluster with the kubeconfig as it is stored.
    async fn is_ready(&self, secret: &ObjectKey) -> bool {
        let data = match self.store.get_secret(secret).await {
            Ok(Some(data)) => data,
            Ok(None) => {
                warn!("secret {secret} not found");
                return false;
            }
            Err(e) => {
                warn!("failed to get secret {secret}: {e}");
                return false;
            }
        };

        let Some(kubeconfig) = data.get(SECRET_KEY) else {
            warn!("secret {secret} has no {SECRET_KEY:?} key");
            return false;
        };
        let kubeconfig = String::from_utf8_lossy(kubeconfig);

        match self.probe.probe(&kubeconfig).await {
            Ok(()) => true,
            Err(e) => {
                warn!("cluster of {secret} not reachable: {e}");
                false
            }
        }
    }

    fn firewall_rules(&self, remapped: &Remapped, ready: bool, status: &mut ClusterStatus) {
        if remapped.original_host.parse::<IpAddr>().is_err() || !remapped.is_remapped() {
            return;
        }

        let (local, public, port) = (&remapped.original_host, &remapped.host, remapped.port);
        let dialect = self.options.firewall;

        if !ready {
            status.firewall_rules.push(dialect.add_rule(local, public, port));
        }
        status.deletion_rules.push(dialect.delete_rule(local, public, port));
    }
}

/// Replace runs of characters outside `[a-zA-Z0-9]` with a single `-`.
///
/// The result is lowercased and trimmed of `-` to be usable as an object name.
pub fn sanitize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}

pub fn namespace_name(prefix: &str, name: &str) -> String {
    match prefix.trim_end_matches('-') {
        "" => name.to_string(),
        prefix => format!("{prefix}-{name}"),
    }
}
