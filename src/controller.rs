use futures::StreamExt;
use itertools::Itertools;
use kube::{
    Client, ResourceExt,
    api::{Api, Patch, PatchParams},
    runtime::{Controller, controller::Action, watcher},
};
use log::{debug, error, info, log_enabled, warn};
use std::collections::BTreeMap as Map;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::{sync::watch, time::Duration};

use crate::ObjectKey;
use crate::crd::{Cluster, ClusterSpec, ClusterStatus, DEFAULT_RECONCILE_INTERVAL};
use crate::credential::eks::EksTokenMinter;
use crate::error::{Error, Result};
use crate::probe::KubeProbe;
use crate::reconcile::{Engine, Options};
use crate::source::Source;
use crate::store::kube::KubeStore;


/// Last published status of each `Cluster`, keyed by `namespace/name`.
pub type Statuses = Map<String, ClusterStatus>;
pub type StatusesReceiver = watch::Receiver<Arc<Statuses>>;

pub struct Context {
    pub client: Client,
    pub probe: KubeProbe,
    pub minter: EksTokenMinter,
    /// Kubeconfig read when a `Cluster` does not set its own path.
    pub kubeconfig_path: PathBuf,
    pub retry_delay: Duration,
    statuses: watch::Sender<Arc<Statuses>>,
}

impl Context {
    pub fn new(
        client: Client,
        probe: KubeProbe,
        minter: EksTokenMinter,
        kubeconfig_path: PathBuf,
        retry_delay: Duration,
    ) -> Self {
        let (statuses, _) = watch::channel(Arc::new(Statuses::new()));
        Self {
            client,
            probe,
            minter,
            kubeconfig_path,
            retry_delay,
            statuses,
        }
    }

    pub fn subscribe(&self) -> StatusesReceiver {
        self.statuses.subscribe()
    }

    fn publish(&self, key: &ObjectKey, status: Option<ClusterStatus>) {
        let key = key.to_string();
        self.statuses.send_modify(|statuses| {
            let statuses = Arc::make_mut(statuses);
            match status {
                Some(status) => statuses.insert(key, status),
                None => statuses.remove(&key),
            };
        });
    }
}

/// Watch `Cluster` resources until a shutdown signal is received.
pub async fn run(ctx: Arc<Context>, namespace: Option<String>) {
    let clusters = match &namespace {
        Some(ns) => Api::<Cluster>::namespaced(ctx.client.clone(), ns),
        None => Api::<Cluster>::all(ctx.client.clone()),
    };

    Controller::new(clusters, watcher::Config::default())
        .shutdown_on_signal()
        .run(reconcile, error_policy, ctx)
        .for_each(|res| async move {
            match res {
                Ok((obj, _)) => debug!("reconciled {obj}"),
                Err(e) => warn!("reconcile failed: {e}"),
            }
        })
        .await;
}

fn key_of(cluster: &Cluster) -> ObjectKey {
    ObjectKey::new(cluster.namespace().unwrap_or_default(), cluster.name_any())
}

async fn reconcile(cluster: Arc<Cluster>, ctx: Arc<Context>) -> Result<Action> {
    let key = key_of(&cluster);

    if cluster.metadata.deletion_timestamp.is_some() {
        debug!("{key}: deleted");
        ctx.publish(&key, None);
        return Ok(Action::await_change());
    }

    if cluster.spec.suspend {
        info!("{key}: suspended");
        return Ok(Action::await_change());
    }

    let path = source_path(&cluster.spec, &ctx.kubeconfig_path);
    let source = Source::read(&path).await?;

    let store = KubeStore::new(ctx.client.clone());
    let engine = Engine {
        store: &store,
        probe: &ctx.probe,
        minter: &ctx.minter,
        options: Options::from(&cluster.spec),
    };
    let status = engine.reconcile(&source).await?;

    if log_enabled!(log::Level::Debug) {
        let clusters = (status.clusters.iter())
            .map(|(name, entry)| format!("{name} => {} (ready: {})", entry.endpoint, entry.ready))
            .join(", ");
        debug!("{key}: clusters: {clusters}");
        for rule in &status.firewall_rules {
            debug!("{key}: firewall rule: {rule}");
        }
    }

    let api = Api::<Cluster>::namespaced(ctx.client.clone(), &key.namespace);
    let patch = Patch::Merge(serde_json::json!({ "status": status }));
    (api.patch_status(&key.name, &PatchParams::default(), &patch).await)
        .map_err(Error::store("patch status"))?;

    ctx.publish(&key, Some(status));

    Ok(Action::requeue(requeue_interval(&key, &cluster.spec)))
}

/// The cluster's own kubeconfig path, or `default` when it is unset or empty.
fn source_path(spec: &ClusterSpec, default: &Path) -> PathBuf {
    (spec.kube_config_path.as_deref())
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| default.to_path_buf())
}

fn requeue_interval(key: &ObjectKey, spec: &ClusterSpec) -> Duration {
    match spec.reconcile_interval() {
        Some(interval) if !interval.is_zero() => interval,
        _ => {
            warn!(
                "{key}: invalid reconcile interval {:?}, using {DEFAULT_RECONCILE_INTERVAL:?}",
                spec.reconcile_interval
            );
            DEFAULT_RECONCILE_INTERVAL
        }
    }
}

fn error_policy(cluster: Arc<Cluster>, error: &Error, ctx: Arc<Context>) -> Action {
    error!("{}: reconcile failed: {error}", key_of(&cluster));
    Action::requeue(ctx.retry_delay)
}
