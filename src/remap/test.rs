use super::*;
use crate::error::Error;

#[test]
fn test_remap_localhost() {
    let r = remap("https://localhost:6443", "10.0.0.5").unwrap();
    assert_eq!("https://10.0.0.5:6443", r.server);
    assert_eq!("10.0.0.5", r.host);
    assert_eq!("127.0.0.1", r.original_host);
    assert_eq!(6443, r.port);
    assert!(r.is_remapped());

    let r = remap("https://localhost.localdomain:7443", "10.0.0.5").unwrap();
    assert_eq!("https://10.0.0.5:7443", r.server);
    assert_eq!("127.0.0.1", r.original_host);

    let r = remap("http://127.0.0.1", "192.168.1.2").unwrap();
    assert_eq!("http://192.168.1.2:6443", r.server);
    assert_eq!("127.0.0.1", r.original_host);
}

#[test]
fn test_remap_noop() {
    let r = remap("https://api.example.com:6443", "10.0.0.5").unwrap();
    assert_eq!("https://api.example.com:6443", r.server);
    assert_eq!("api.example.com", r.original_host);
    assert_eq!(r.host, r.original_host);
    assert!(!r.is_remapped());

    let r = remap("https://localhost:6443", "").unwrap();
    assert_eq!("https://localhost:6443", r.server);
    assert_eq!("localhost", r.original_host);
    assert!(!r.is_remapped());

    let r = remap("https://localhost.localstack.cloud:4510", "10.0.0.5").unwrap();
    assert_eq!("https://localhost.localstack.cloud:4510", r.server);
}

#[test]
fn test_remap_malformed() {
    let err = remap("https://localhost:nope", "10.0.0.5").unwrap_err();
    assert!(matches!(err, Error::MalformedAddress { .. }));
}
