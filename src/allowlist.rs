use crate::address::Address;

/// Hosts trusted without any configuration.
pub const DEFAULT_DOMAINS: &[&str] = &[
    "cluster.local",
    "localhost",
    "127.0.0.1",
    "localhost.localdomain",
    "localhost.localstack.cloud",
];

/// Hosts considered equivalent to the local loopback.
pub const LOOPBACK_DOMAINS: &[&str] = &["localhost", "127.0.0.1", "localhost.localdomain"];

#[cfg(test)]
mod test;

/// Domains a kubeconfig cluster server must resolve to for its context to be published.
///
/// Entries are compared verbatim; only the probed value is normalized.
#[derive(Debug, Clone)]
pub struct Allowlist {
    domains: Vec<String>,
}

impl Allowlist {
    pub fn new(additional: &[String]) -> Self {
        let mut domains = Vec::with_capacity(DEFAULT_DOMAINS.len() + additional.len());
        domains.extend(DEFAULT_DOMAINS.iter().map(|d| d.to_string()));
        domains.extend(additional.iter().cloned());
        Self { domains }
    }

    pub fn loopback() -> Self {
        Self {
            domains: LOOPBACK_DOMAINS.iter().map(|d| d.to_string()).collect(),
        }
    }

    /// Accepts either a bare host or a full address.
    pub fn contains(&self, candidate: &str) -> bool {
        if self.domains.iter().any(|d| d == candidate) {
            return true;
        }
        let Some(host) = Address::host_of(candidate) else {
            return false;
        };
        self.domains.iter().any(|d| *d == host)
    }
}
