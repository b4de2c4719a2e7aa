use super::*;

#[test]
fn test_builtins_match_any_form() {
    let allowlist = Allowlist::new(&[]);
    for domain in DEFAULT_DOMAINS {
        assert!(allowlist.contains(domain), "{domain}");
        assert!(allowlist.contains(&format!("https://{domain}:6443")), "{domain}");
        assert!(allowlist.contains(&format!("{domain}:8443")), "{domain}");
    }
}

#[test]
fn test_exact_host_only() {
    let allowlist = Allowlist::new(&[]);
    assert!(!allowlist.contains("https://api.example.com:6443"));
    assert!(!allowlist.contains("https://svc.cluster.local:6443"));
    assert!(!allowlist.contains("https://localhost.evil.com"));
    assert!(!allowlist.contains("https://localhost:notaport"));
}

#[test]
fn test_additional_domains() {
    let allowlist = Allowlist::new(&["api.example.com".to_string(), "https://raw:1".to_string()]);
    assert!(allowlist.contains("localhost"));
    assert!(allowlist.contains("https://api.example.com:6443"));
    assert!(allowlist.contains("api.example.com"));
    // entries are not normalized
    assert!(allowlist.contains("https://raw:1"));
    assert!(!allowlist.contains("raw"));
}

#[test]
fn test_loopback() {
    let loopback = Allowlist::loopback();
    assert!(loopback.contains("localhost"));
    assert!(loopback.contains("127.0.0.1"));
    assert!(loopback.contains("localhost.localdomain"));
    assert!(!loopback.contains("localhost.localstack.cloud"));
    assert!(!loopback.contains("cluster.local"));
}
