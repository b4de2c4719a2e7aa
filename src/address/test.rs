use super::*;

fn parts(address: &str) -> (String, String, u16) {
    let a = Address::parse(address).unwrap();
    (a.scheme, a.host, a.port)
}

#[test]
fn test_full_address() {
    assert_eq!(
        ("https".into(), "api.example.com".into(), 443),
        parts("https://api.example.com:443")
    );
    assert_eq!(
        ("http".into(), "10.0.0.1".into(), 8080),
        parts("http://10.0.0.1:8080/some/path?q=1")
    );
}

#[test]
fn test_defaults() {
    assert_eq!(("https".into(), "localhost".into(), 6443), parts("localhost"));
    assert_eq!(("https".into(), "localhost".into(), 8443), parts("localhost:8443"));
    assert_eq!(("https".into(), "example.org".into(), 6443), parts("https://example.org"));
    assert_eq!(("https".into(), "localhost".into(), 6443), parts("https://:6443"));
    assert_eq!(("https".into(), "localhost".into(), 6443), parts("https://"));
    assert_eq!(("https".into(), "cluster.local".into(), 6443), parts("cluster.local:"));
}

#[test]
fn test_ipv6_and_userinfo() {
    assert_eq!(("https".into(), "::1".into(), 6443), parts("https://[::1]:6443"));
    assert_eq!(("https".into(), "::1".into(), 6443), parts("[::1]"));
    assert_eq!(("https".into(), "host".into(), 1234), parts("https://user:pw@host:1234"));

    let a = Address::parse("[::1]:7443").unwrap();
    assert_eq!("https://[::1]:7443", a.to_string());
}

#[test]
fn test_malformed() {
    for address in [
        "",
        "https://local host:6443",
        "://localhost",
        "1http://localhost",
        "https://localhost:port",
        "https://localhost:70000",
        "https://[::1",
        "https://[::1]x",
        "::1:6443",
    ] {
        let err = Address::parse(address).expect_err(address);
        assert!(matches!(err, Error::MalformedAddress { .. }), "{address}: {err}");
    }
}

#[test]
fn test_display() {
    let a: Address = "localhost".parse().unwrap();
    assert_eq!("https://localhost:6443", a.to_string());
    assert_eq!(Some("127.0.0.1".to_string()), Address::host_of("http://127.0.0.1:80"));
    assert_eq!(None, Address::host_of("https://x:y"));
}
