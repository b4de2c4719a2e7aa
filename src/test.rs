use super::*;

#[test]
fn test_object_key() {
    let mut metadata = meta::ObjectMeta {
        name: Some("kind-dev-kubeconfig".into()),
        ..Default::default()
    };
    assert_eq!(Err("no namespace"), ObjectKey::try_from(&metadata));

    metadata.namespace = Some("cluster-kind-dev".into());
    let key = ObjectKey::try_from(&metadata).unwrap();
    assert_eq!(ObjectKey::new("cluster-kind-dev", "kind-dev-kubeconfig"), key);
    assert_eq!("cluster-kind-dev/kind-dev-kubeconfig", key.to_string());
}
