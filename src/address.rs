use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

pub const DEFAULT_SCHEME: &str = "https";
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 6443;

#[cfg(test)]
mod test;

/// A cluster server address split into its parts.
///
/// Missing parts take the API server defaults: `https`, `localhost` and `6443`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub scheme: String,
    pub host: String,
    pub port: u16,
}

impl Address {
    pub fn parse(address: &str) -> Result<Self> {
        if address.is_empty() {
            return Err(Error::malformed(address, "empty address"));
        }
        if address.chars().any(char::is_whitespace) {
            return Err(Error::malformed(address, "contains whitespace"));
        }

        let (scheme, rest) = match address.split_once("://") {
            Some((scheme, rest)) => {
                let valid = scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                    && scheme
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
                if !valid {
                    return Err(Error::malformed(address, "invalid scheme"));
                }
                (scheme, rest)
            }
            None => (DEFAULT_SCHEME, address),
        };

        // authority ends at the path, query or fragment
        let authority = match rest.find(['/', '?', '#']) {
            Some(end) => &rest[..end],
            None => rest,
        };
        let authority = match authority.rsplit_once('@') {
            Some((_userinfo, hostport)) => hostport,
            None => authority,
        };

        let (host, port) = if let Some(bracketed) = authority.strip_prefix('[') {
            let Some((host, after)) = bracketed.split_once(']') else {
                return Err(Error::malformed(address, "missing ']' in host"));
            };
            let port = match after {
                "" => None,
                _ => match after.strip_prefix(':') {
                    Some(port) => Some(port),
                    None => return Err(Error::malformed(address, "unexpected text after host")),
                },
            };
            (host, port)
        } else {
            match authority.matches(':').count() {
                0 => (authority, None),
                1 => {
                    let (host, port) = authority.split_once(':').unwrap_or((authority, ""));
                    (host, Some(port))
                }
                _ => return Err(Error::malformed(address, "too many colons in address")),
            }
        };

        let port = match port {
            None | Some("") => DEFAULT_PORT,
            Some(port) => port
                .parse()
                .map_err(|_| Error::malformed(address, "invalid port"))?,
        };

        let host = match host {
            "" => DEFAULT_HOST,
            host => host,
        };

        Ok(Self {
            scheme: scheme.to_string(),
            host: host.to_string(),
            port,
        })
    }

    /// The host part, if the address parses.
    pub fn host_of(address: &str) -> Option<String> {
        Self::parse(address).ok().map(|a| a.host)
    }
}

impl FromStr for Address {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        if self.host.contains(':') {
            write!(f, "{}://[{}]:{}", self.scheme, self.host, self.port)
        } else {
            write!(f, "{}://{}:{}", self.scheme, self.host, self.port)
        }
    }
}
