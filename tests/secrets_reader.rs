mod common;

use common::{MemoryObjectClient, pull_secret, refs, service_account};
use k8s_openapi::api::core::v1::PodSpec;
use kube_pull_secrets::PullSecretError;
use kube_pull_secrets::secrets::{ObjectSecretsReader, SecretsReader};

const NS: &str = "shop";

fn secret_names(secrets: &[k8s_openapi::api::core::v1::Secret]) -> Vec<String> {
    secrets
        .iter()
        .map(|secret| secret.metadata.name.clone().unwrap_or_default())
        .collect()
}

#[tokio::test]
async fn test_list_by_local_object_references_keeps_order() {
    let client = MemoryObjectClient::new()
        .with(pull_secret(NS, "quay", "quay.io", "robot", "t0ken"))
        .with(pull_secret(NS, "ghcr", "ghcr.io", "octocat", "pat"));
    let reader = ObjectSecretsReader::new(client);

    let secrets = reader
        .list_by_local_object_references(&refs(&["ghcr", "quay"]), NS)
        .await
        .unwrap();
    assert_eq!(secret_names(&secrets), vec!["ghcr", "quay"]);
}

#[tokio::test]
async fn test_missing_secret_aborts_listing() {
    let client = MemoryObjectClient::new().with(pull_secret(NS, "quay", "quay.io", "robot", "t0ken"));
    let reader = ObjectSecretsReader::new(client);

    let err = reader
        .list_by_local_object_references(&refs(&["quay", "missing", "quay"]), NS)
        .await
        .unwrap_err();

    assert!(matches!(&err, PullSecretError::GetSecret { namespace, name, .. } if namespace == NS && name == "missing"));
    assert!(err.is_not_found());
    assert!(err.to_string().starts_with("getting secret by name: shop/missing"));
    // Nothing is fetched after the first failure.
    assert_eq!(
        reader.client().requests(),
        vec!["Secret shop/quay", "Secret shop/missing"]
    );
}

#[tokio::test]
async fn test_list_by_service_account() {
    let client = MemoryObjectClient::new()
        .with(service_account(NS, "builder", &["quay"]))
        .with(pull_secret(NS, "quay", "quay.io", "robot", "t0ken"));
    let reader = ObjectSecretsReader::new(client);

    let secrets = reader.list_by_service_account("builder", NS).await.unwrap();
    assert_eq!(secret_names(&secrets), vec!["quay"]);
}

#[tokio::test]
async fn test_missing_service_account_is_named_in_error() {
    let reader = ObjectSecretsReader::new(MemoryObjectClient::new());

    let err = reader.list_by_service_account("builder", NS).await.unwrap_err();
    assert!(matches!(&err, PullSecretError::GetServiceAccount { name, .. } if name == "builder"));
    assert!(err.to_string().starts_with("getting service account by name: shop/builder"));
}

#[tokio::test]
async fn test_service_account_without_pull_secrets() {
    let client = MemoryObjectClient::new().with(service_account(NS, "default", &[]));
    let reader = ObjectSecretsReader::new(client);

    let secrets = reader.list_by_service_account("default", NS).await.unwrap();
    assert!(secrets.is_empty());
}

#[tokio::test]
async fn test_pod_spec_defaults_to_default_service_account() {
    for service_account_name in [None, Some(String::new())] {
        let client = MemoryObjectClient::new()
            .with(service_account(NS, "default", &["quay"]))
            .with(pull_secret(NS, "quay", "quay.io", "robot", "t0ken"));
        let reader = ObjectSecretsReader::new(client);
        let spec = PodSpec {
            service_account_name,
            ..Default::default()
        };

        let secrets = reader
            .list_image_pull_secrets_by_pod_spec(&spec, NS)
            .await
            .unwrap();
        assert_eq!(secret_names(&secrets), vec!["quay"]);
        assert_eq!(
            reader.client().requests(),
            vec!["ServiceAccount shop/default", "Secret shop/quay"]
        );
    }
}

#[tokio::test]
async fn test_pod_spec_combines_own_and_service_account_secrets() {
    let client = MemoryObjectClient::new()
        .with(service_account(NS, "web", &["quay", "ghcr"]))
        .with(pull_secret(NS, "quay", "quay.io", "robot", "t0ken"))
        .with(pull_secret(NS, "ghcr", "ghcr.io", "octocat", "pat"))
        .with(pull_secret(NS, "private", "registry.example.com", "u", "p"));
    let reader = ObjectSecretsReader::new(client);
    let spec = PodSpec {
        service_account_name: Some("web".to_string()),
        image_pull_secrets: Some(refs(&["private", "quay"])),
        ..Default::default()
    };

    let secrets = reader
        .list_image_pull_secrets_by_pod_spec(&spec, NS)
        .await
        .unwrap();

    // own refs first, duplicates kept
    assert_eq!(secrets.len(), 4);
    assert_eq!(secret_names(&secrets), vec!["private", "quay", "quay", "ghcr"]);
}

#[tokio::test]
async fn test_pod_spec_fails_when_own_secret_is_missing() {
    let client = MemoryObjectClient::new().with(service_account(NS, "default", &[]));
    let reader = ObjectSecretsReader::new(client);
    let spec = PodSpec {
        image_pull_secrets: Some(refs(&["gone"])),
        ..Default::default()
    };

    let err = reader
        .list_image_pull_secrets_by_pod_spec(&spec, NS)
        .await
        .unwrap_err();
    assert!(matches!(err, PullSecretError::GetSecret { .. }));
    // The ServiceAccount is never looked up.
    assert_eq!(reader.client().requests(), vec!["Secret shop/gone"]);
}

#[tokio::test]
async fn test_reader_as_trait_object() {
    let client = MemoryObjectClient::new()
        .with(service_account(NS, "default", &["quay"]))
        .with(pull_secret(NS, "quay", "quay.io", "robot", "t0ken"));
    let reader: Box<dyn SecretsReader> = Box::new(ObjectSecretsReader::new(client));

    let secrets = reader
        .list_image_pull_secrets_by_pod_spec(&PodSpec::default(), NS)
        .await
        .unwrap();
    assert_eq!(secrets.len(), 1);
}
