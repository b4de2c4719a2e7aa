//! EKS bearer tokens.
//!
//! A token is a presigned STS `GetCallerIdentity` URL bound to the cluster name
//! through the `x-k8s-aws-id` header. Signing is local (SigV4), nothing is sent to AWS.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use log::debug;
use openssl::{hash::MessageDigest, pkey::PKey, sign::Signer};
use std::collections::BTreeMap as Map;
use std::str::FromStr;

use super::{ExecCredential, TokenMinter};
use crate::address::Address;
use crate::error::{Error, Result};

pub const DEFAULT_REGION: &str = "us-east-1";
pub const LOCALSTACK_ENDPOINT: &str = "http://localhost.localstack.cloud:4566";
pub const LOCALSTACK_ACCESS_KEY: &str = "test";
pub const LOCALSTACK_SECRET_KEY: &str = "test";

const TOKEN_PREFIX: &str = "k8s-aws-v1.";
const CLUSTER_ID_HEADER: &str = "x-k8s-aws-id";
const SIGNED_HEADERS: &str = "host;x-k8s-aws-id";
const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SERVICE: &str = "sts";
const PRESIGN_EXPIRES_SECS: u32 = 60;
/// tokens are accepted for 15 minutes, announce one less
const TOKEN_LIFETIME_MINS: i64 = 14;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arn {
    pub partition: String,
    pub service: String,
    pub region: String,
    pub account_id: String,
    pub resource: String,
    pub resource_name: String,
}

impl FromStr for Arn {
    type Err = Error;

    fn from_str(arn: &str) -> Result<Self> {
        let parts: Vec<_> = arn.splitn(6, ':').collect();
        let &[prefix, partition, service, region, account_id, resource] = parts.as_slice() else {
            return Err(Error::TokenMint(format!("invalid ARN {arn:?}")));
        };
        if prefix != "arn" {
            return Err(Error::TokenMint(format!("invalid ARN {arn:?}")));
        }

        let (resource, resource_name) = resource.split_once('/').unwrap_or((resource, ""));

        Ok(Self {
            partition: partition.to_string(),
            service: service.to_string(),
            region: region.to_string(),
            account_id: account_id.to_string(),
            resource: resource.to_string(),
            resource_name: resource_name.to_string(),
        })
    }
}

/// Mints EKS tokens from static credentials.
///
/// Credentials and the endpoint override normally come from the environment
/// (see [`EksTokenMinter::from_env`]). Clusters served by the localstack host get
/// localstack's test credentials and endpoint when none are configured.
#[derive(Debug, Clone, Default)]
pub struct EksTokenMinter {
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub session_token: Option<String>,
    pub endpoint: Option<String>,
    pub localstack_host: Option<String>,
}

struct Credentials<'t> {
    access_key_id: &'t str,
    secret_access_key: &'t str,
    session_token: Option<&'t str>,
    endpoint: Option<&'t str>,
}

impl EksTokenMinter {
    pub fn from_env() -> Self {
        let var = |k: &str| std::env::var(k).ok().filter(|v| !v.is_empty());
        Self {
            access_key_id: var("AWS_ACCESS_KEY_ID"),
            secret_access_key: var("AWS_SECRET_ACCESS_KEY"),
            session_token: var("AWS_SESSION_TOKEN"),
            endpoint: var("AWS_ENDPOINT"),
            localstack_host: var("LOCALSTACK_HOST"),
        }
    }

    fn credentials(&self, host: &str) -> Result<Credentials<'_>> {
        let localstack_host = self.localstack_host.as_deref().unwrap_or(LOCALSTACK_ENDPOINT);
        let localstack_host = Address::parse(localstack_host)?.host;
        let host = Address::parse(host)?.host;

        let mut creds = Credentials {
            access_key_id: self.access_key_id.as_deref().unwrap_or_default(),
            secret_access_key: self.secret_access_key.as_deref().unwrap_or_default(),
            session_token: self.session_token.as_deref(),
            endpoint: self.endpoint.as_deref(),
        };

        if host == localstack_host {
            debug!("{host} is served by localstack");
            if creds.endpoint.is_none() {
                creds.endpoint = Some(LOCALSTACK_ENDPOINT);
            }
            if creds.access_key_id.is_empty() {
                creds.access_key_id = LOCALSTACK_ACCESS_KEY;
            }
            if creds.secret_access_key.is_empty() {
                creds.secret_access_key = LOCALSTACK_SECRET_KEY;
            }
        }

        if creds.access_key_id.is_empty() || creds.secret_access_key.is_empty() {
            return Err(Error::TokenMint("no AWS credentials configured".to_string()));
        }

        Ok(creds)
    }

    /// Presigned `GetCallerIdentity` URL for the cluster at `host`.
    pub fn presign(&self, arn: &Arn, host: &str, now: DateTime<Utc>) -> Result<String> {
        if arn.resource_name.is_empty() {
            return Err(Error::TokenMint(format!(
                "ARN resource {:?} has no cluster name",
                arn.resource
            )));
        }

        let creds = self.credentials(host)?;

        let region = match arn.region.as_str() {
            "" => DEFAULT_REGION,
            region => region,
        };
        let endpoint = match creds.endpoint {
            Some(endpoint) => endpoint.to_string(),
            None => default_endpoint(&arn.partition, region),
        };
        let (scheme, authority) = split_endpoint(&endpoint);

        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();
        let scope = format!("{date}/{region}/{SERVICE}/aws4_request");

        let mut query = Map::new();
        query.insert("Action", "GetCallerIdentity".to_string());
        query.insert("Version", "2011-06-15".to_string());
        query.insert("X-Amz-Algorithm", ALGORITHM.to_string());
        query.insert("X-Amz-Credential", format!("{}/{scope}", creds.access_key_id));
        query.insert("X-Amz-Date", amz_date.clone());
        query.insert("X-Amz-Expires", PRESIGN_EXPIRES_SECS.to_string());
        query.insert("X-Amz-SignedHeaders", SIGNED_HEADERS.to_string());
        if let Some(token) = creds.session_token {
            query.insert("X-Amz-Security-Token", token.to_string());
        }

        let canonical_query = (query.iter())
            .map(|(k, v)| format!("{}={}", uri_encode(k), uri_encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        let canonical_request = format!(
            "GET\n/\n{canonical_query}\nhost:{authority}\n{CLUSTER_ID_HEADER}:{}\n\n{SIGNED_HEADERS}\n{}",
            arn.resource_name,
            hex::encode(openssl::sha::sha256(b"")),
        );

        let string_to_sign = format!(
            "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
            hex::encode(openssl::sha::sha256(canonical_request.as_bytes()))
        );

        let key = signing_key(creds.secret_access_key, &date, region, SERVICE)?;
        let signature = hex::encode(hmac(&key, string_to_sign.as_bytes())?);

        Ok(format!(
            "{scheme}://{authority}/?{canonical_query}&X-Amz-Signature={signature}"
        ))
    }
}

impl TokenMinter for EksTokenMinter {
    fn mint(&self, cluster: &str, host: &str) -> Result<ExecCredential> {
        let arn: Arn = cluster.parse()?;
        let now = Utc::now();

        let url = self.presign(&arn, host, now)?;
        let token = format!("{TOKEN_PREFIX}{}", URL_SAFE_NO_PAD.encode(url));

        Ok(ExecCredential::new(
            token,
            now + Duration::minutes(TOKEN_LIFETIME_MINS),
        ))
    }
}

fn default_endpoint(partition: &str, region: &str) -> String {
    match partition {
        "aws-cn" => format!("https://sts.{region}.amazonaws.com.cn"),
        _ => format!("https://sts.{region}.amazonaws.com"),
    }
}

/// `(scheme, host[:port])` of an endpoint URL.
fn split_endpoint(endpoint: &str) -> (&str, &str) {
    let (scheme, rest) = endpoint.split_once("://").unwrap_or(("https", endpoint));
    let authority = rest.split(['/', '?']).next().unwrap_or(rest);
    (scheme, authority)
}

fn uri_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => out.push(b as char),
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

fn hmac(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let sign = || -> Result<Vec<u8>, openssl::error::ErrorStack> {
        let pkey = PKey::hmac(key)?;
        let mut signer = Signer::new(MessageDigest::sha256(), &pkey)?;
        signer.update(data)?;
        signer.sign_to_vec()
    };
    sign().map_err(|e| Error::TokenMint(format!("signing failed: {e}")))
}

fn signing_key(secret: &str, date: &str, region: &str, service: &str) -> Result<Vec<u8>> {
    let k_date = hmac(format!("AWS4{secret}").as_bytes(), date.as_bytes())?;
    let k_region = hmac(&k_date, region.as_bytes())?;
    let k_service = hmac(&k_region, service.as_bytes())?;
    hmac(&k_service, b"aws4_request")
}
