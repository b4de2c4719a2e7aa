use super::*;
use chrono::Utc;

struct FixedToken;
impl TokenMinter for FixedToken {
    fn mint(&self, cluster: &str, host: &str) -> Result<ExecCredential> {
        Ok(ExecCredential::new(format!("token-for-{cluster}@{host}"), Utc::now()))
    }
}

struct NoToken;
impl TokenMinter for NoToken {
    fn mint(&self, _cluster: &str, _host: &str) -> Result<ExecCredential> {
        Err(Error::TokenMint("no credentials".into()))
    }
}

fn connection() -> Connection {
    Connection {
        cluster: "arn:aws:eks:us-east-1:1:cluster/dev".into(),
        server: "https://10.0.0.5:6443".into(),
        ca_data: Some("Q0EK".into()),
        username: "admin".into(),
        client_cert_data: Some("Q0VSVAo=".into()),
        client_key_data: Some("S0VZCg==".into()),
        ..Default::default()
    }
}

#[test]
fn test_client_cert() {
    let doc = materialize(ProviderKind::ClientCert, "kind-dev", &connection(), &NoToken).unwrap();

    assert_eq!(Some("kind-dev".to_string()), doc.current_context);
    assert_eq!(1, doc.clusters.len());
    assert_eq!(1, doc.auth_infos.len());
    assert_eq!(1, doc.contexts.len());

    let cluster = doc.cluster("kind-dev").unwrap();
    assert_eq!(Some("https://10.0.0.5:6443".to_string()), cluster.server);
    assert_eq!(Some("Q0EK".to_string()), cluster.certificate_authority_data);

    let ctx = doc.context("kind-dev").unwrap();
    assert_eq!("kind-dev", ctx.cluster);
    assert_eq!("admin", ctx.user);

    let user = doc.auth_info("admin").unwrap();
    assert_eq!(Some("Q0VSVAo=".to_string()), user.client_certificate_data);
    assert_eq!(Some("S0VZCg==".to_string()), user.client_key_data);
    assert_eq!(None, user.token);
}

#[test]
fn test_client_cert_missing() {
    let conn = Connection {
        client_key_data: None,
        ..connection()
    };
    let err = materialize(ProviderKind::ClientCert, "kind-dev", &conn, &NoToken).unwrap_err();
    assert!(matches!(err, Error::MissingClientCertificate(user) if user == "admin"));
}

#[test]
fn test_aws() {
    let doc = materialize(ProviderKind::Aws, "dev", &connection(), &FixedToken).unwrap();

    let user = doc.auth_info("admin").unwrap();
    assert_eq!(
        Some("token-for-arn:aws:eks:us-east-1:1:cluster/dev@https://10.0.0.5:6443".to_string()),
        user.token
    );
    assert_eq!(None, user.client_certificate_data);
    assert_eq!(None, user.client_key_data);

    let err = materialize(ProviderKind::Aws, "dev", &connection(), &NoToken).unwrap_err();
    assert!(matches!(err, Error::TokenMint(_)));
}

#[test]
fn test_unsupported() {
    for kind in [
        ProviderKind::Azure,
        ProviderKind::Gcp,
        ProviderKind::Oidc,
        ProviderKind::Unknown,
    ] {
        let err = materialize(kind, "dev", &connection(), &FixedToken).unwrap_err();
        assert!(matches!(err, Error::UnsupportedProvider(k) if k == kind));
    }
}

#[test]
fn test_yaml_document() {
    let doc = materialize(ProviderKind::ClientCert, "kind-dev", &connection(), &NoToken).unwrap();
    let yaml = doc.to_yaml().unwrap();

    assert!(yaml.contains("current-context: kind-dev"), "{yaml}");
    assert!(yaml.contains("client-certificate-data: Q0VSVAo="), "{yaml}");
    assert!(yaml.contains("certificate-authority-data: Q0EK"), "{yaml}");
    assert!(yaml.contains("users:"), "{yaml}");
    assert!(!yaml.contains("token"), "{yaml}");

    // readable by the kube client
    let parsed = kube::config::Kubeconfig::from_yaml(&yaml).unwrap();
    assert_eq!(Some("kind-dev".to_string()), parsed.current_context);
    assert_eq!(doc, Kubeconfig::from_yaml(&yaml).unwrap());
}
