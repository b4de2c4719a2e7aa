use crate::address::Address;
use crate::allowlist::Allowlist;
use crate::error::Result;

#[cfg(test)]
mod test;

/// The address a cluster is dialed on, and the local endpoint it really serves on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remapped {
    /// server address to put in the published kubeconfig
    pub server: String,
    pub host: String,
    pub original_host: String,
    pub port: u16,
}

impl Remapped {
    pub fn is_remapped(&self) -> bool {
        self.host != self.original_host
    }
}

/// Rewrite a loopback server address onto `target`.
///
/// `localhost` and `localhost.localdomain` are reported as `127.0.0.1` so the
/// original host can be used in firewall rules. Non-loopback servers, or an
/// empty target, leave the address untouched.
pub fn remap(server: &str, target: &str) -> Result<Remapped> {
    let address = Address::parse(server)?;

    if !target.is_empty() && Allowlist::loopback().contains(&address.host) {
        let original_host = match address.host.as_str() {
            "localhost" | "localhost.localdomain" => "127.0.0.1".to_string(),
            host => host.to_string(),
        };
        return Ok(Remapped {
            server: format!("{}://{target}:{}", address.scheme, address.port),
            host: target.to_string(),
            original_host,
            port: address.port,
        });
    }

    Ok(Remapped {
        server: server.to_string(),
        host: address.host.clone(),
        original_host: address.host,
        port: address.port,
    })
}
