use k8s_openapi::apimachinery::pkg::apis::meta::v1 as meta;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap as Map;
use std::time::Duration;

use crate::firewall::Dialect;

pub const DEFAULT_NAMESPACE_PREFIX: &str = "cluster";
pub const DEFAULT_RECONCILE_INTERVAL: Duration = Duration::from_secs(30);


/// Publishes the clusters of a kubeconfig file as kubeconfig secrets.
#[derive(CustomResource, Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "kubeconfig.choclab.net",
    version = "v1alpha1",
    kind = "Cluster",
    plural = "clusters",
    namespaced,
    status = "ClusterStatus",
    printcolumn = r#"{"name":"Suspended","type":"boolean","jsonPath":".spec.suspend"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSpec {
    /// Domains accepted on top of localhost, 127.0.0.1, localhost.localdomain,
    /// localhost.localstack.cloud and cluster.local.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_domains: Vec<String>,

    /// Format of the generated firewall rules.
    #[serde(default)]
    pub firewall_format: Dialect,

    /// Path of the kubeconfig file mounted in the controller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kube_config_path: Option<String>,

    /// Prefix of the namespace created for each cluster.
    #[serde(default = "default_namespace_prefix")]
    #[schemars(regex(pattern = r"^[a-z0-9-]+$"))]
    pub namespace_prefix: String,

    /// Interval between reconciliations, as a duration like `30s` or `1m30s`.
    #[serde(default = "default_reconcile_interval")]
    pub reconcile_interval: String,

    /// Address loopback cluster servers are remapped to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remap_to_ip: Option<String>,

    #[serde(default)]
    pub suspend: bool,
}

fn default_namespace_prefix() -> String {
    DEFAULT_NAMESPACE_PREFIX.to_string()
}

fn default_reconcile_interval() -> String {
    "30s".to_string()
}

impl ClusterSpec {
    /// The reconcile interval, or `None` if it does not parse.
    pub fn reconcile_interval(&self) -> Option<Duration> {
        parse_duration(&self.reconcile_interval)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterStatus {
    /// Per-context status, keyed by context name.
    #[serde(default)]
    pub clusters: Map<String, ClusterStatusEntry>,

    /// Rules that may be required to reach the remapped clusters.
    #[serde(default)]
    pub firewall_rules: Vec<String>,

    /// Rules removing the ones in `firewallRules`.
    #[serde(default)]
    pub deletion_rules: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterStatusEntry {
    pub ready: bool,
    pub endpoint: String,
    /// Name of the kubeconfig secret.
    pub kube_config: String,
    pub last_update_time: meta::Time,
}

/// Parse a Go style duration (`300ms`, `1.5h`, `2h45m`).
pub fn parse_duration(s: &str) -> Option<Duration> {
    if s == "0" {
        return Some(Duration::ZERO);
    }
    if s.is_empty() {
        return None;
    }

    let mut nanos = 0f64;
    let mut rest = s;
    while !rest.is_empty() {
        let num_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (num, tail) = rest.split_at(num_len);
        let value: f64 = num.parse().ok()?;

        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);
        let scale = match unit {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            _ => return None,
        };

        nanos += value * scale;
        rest = tail;
    }

    Some(Duration::from_nanos(nanos.round() as u64))
}
