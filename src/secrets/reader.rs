//! Reading image pull Secrets from the Kubernetes API
//!
//! [`SecretsReader`] is implemented by two adapters that differ only in how objects are
//! fetched: [`ApiSecretsReader`] goes through typed `kube::Api` handles while
//! [`ObjectSecretsReader`] goes through any [`ObjectClient`]. The listing operations are
//! provided by the trait and shared by both.

use crate::error::{PullSecretError, Result};
use async_trait::async_trait;
use k8s_openapi::NamespaceResourceScope;
use k8s_openapi::api::core::v1::{LocalObjectReference, PodSpec, Secret, ServiceAccount};
use kube::{Api, Client, Resource};
use serde::de::DeserializeOwned;
use std::fmt::{self, Debug};
use tracing::debug;

/// ServiceAccount used by Pods that do not name one
pub const SERVICE_ACCOUNT_DEFAULT: &str = "default";

/// Read access to Secrets and the ServiceAccounts that reference them
#[async_trait]
pub trait SecretsReader: Send + Sync {
    async fn get_secret(&self, name: &str, namespace: &str) -> kube::Result<Secret>;

    async fn get_service_account(&self, name: &str, namespace: &str) -> kube::Result<ServiceAccount>;

    /// Fetch every referenced Secret, in order. The first failure aborts the listing.
    async fn list_by_local_object_references(
        &self,
        refs: &[LocalObjectReference],
        namespace: &str,
    ) -> Result<Vec<Secret>> {
        let mut secrets = Vec::with_capacity(refs.len());

        for secret_ref in refs {
            debug!(namespace, name = %secret_ref.name, "getting secret");
            let secret = self
                .get_secret(&secret_ref.name, namespace)
                .await
                .map_err(|source| PullSecretError::GetSecret {
                    namespace: namespace.to_string(),
                    name: secret_ref.name.clone(),
                    source,
                })?;
            secrets.push(secret);
        }

        Ok(secrets)
    }

    /// Fetch the image pull Secrets of a ServiceAccount.
    async fn list_by_service_account(&self, name: &str, namespace: &str) -> Result<Vec<Secret>> {
        debug!(namespace, name, "getting service account");
        let service_account = self
            .get_service_account(name, namespace)
            .await
            .map_err(|source| PullSecretError::GetServiceAccount {
                namespace: namespace.to_string(),
                name: name.to_string(),
                source,
            })?;

        let refs = service_account.image_pull_secrets.unwrap_or_default();
        self.list_by_local_object_references(&refs, namespace).await
    }

    /// The Pod's own image pull Secrets followed by those of its ServiceAccount.
    ///
    /// A Secret referenced from both places is returned twice.
    async fn list_image_pull_secrets_by_pod_spec(
        &self,
        spec: &PodSpec,
        namespace: &str,
    ) -> Result<Vec<Secret>> {
        let own_refs = spec.image_pull_secrets.as_deref().unwrap_or_default();
        let mut secrets = self.list_by_local_object_references(own_refs, namespace).await?;

        let service_account_name = spec
            .service_account_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(SERVICE_ACCOUNT_DEFAULT);

        let service_account_secrets = self
            .list_by_service_account(service_account_name, namespace)
            .await?;
        secrets.extend(service_account_secrets);

        Ok(secrets)
    }
}

/// [`SecretsReader`] backed by typed `kube::Api` handles
#[derive(Clone)]
pub struct ApiSecretsReader {
    client: Client,
}

impl ApiSecretsReader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Debug for ApiSecretsReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiSecretsReader").finish_non_exhaustive()
    }
}

#[async_trait]
impl SecretsReader for ApiSecretsReader {
    async fn get_secret(&self, name: &str, namespace: &str) -> kube::Result<Secret> {
        Api::<Secret>::namespaced(self.client.clone(), namespace).get(name).await
    }

    async fn get_service_account(&self, name: &str, namespace: &str) -> kube::Result<ServiceAccount> {
        Api::<ServiceAccount>::namespaced(self.client.clone(), namespace)
            .get(name)
            .await
    }
}

/// Identity of a namespaced object
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey {
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Generic read access to namespaced objects of any kind
#[async_trait]
pub trait ObjectClient: Send + Sync {
    async fn get<K>(&self, key: &ObjectKey) -> kube::Result<K>
    where
        K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>
            + Clone
            + DeserializeOwned
            + Debug
            + Send
            + 'static;
}

#[async_trait]
impl ObjectClient for Client {
    async fn get<K>(&self, key: &ObjectKey) -> kube::Result<K>
    where
        K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>
            + Clone
            + DeserializeOwned
            + Debug
            + Send
            + 'static,
    {
        Api::<K>::namespaced(self.clone(), &key.namespace)
            .get(&key.name)
            .await
    }
}

/// [`SecretsReader`] backed by a generic [`ObjectClient`]
#[derive(Debug, Clone)]
pub struct ObjectSecretsReader<C> {
    client: C,
}

impl<C: ObjectClient> ObjectSecretsReader<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}

#[async_trait]
impl<C: ObjectClient> SecretsReader for ObjectSecretsReader<C> {
    async fn get_secret(&self, name: &str, namespace: &str) -> kube::Result<Secret> {
        self.client.get(&ObjectKey::new(namespace, name)).await
    }

    async fn get_service_account(&self, name: &str, namespace: &str) -> kube::Result<ServiceAccount> {
        self.client.get(&ObjectKey::new(namespace, name)).await
    }
}
