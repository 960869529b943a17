#![allow(dead_code)]

use async_trait::async_trait;
use k8s_openapi::NamespaceResourceScope;
use k8s_openapi::api::core::v1::{LocalObjectReference, Secret, ServiceAccount};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::Resource;
use kube::core::ErrorResponse;
use kube_pull_secrets::secrets::{self, ObjectClient, ObjectKey};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Mutex;

/// In-memory object store standing in for the API server
#[derive(Default)]
pub struct MemoryObjectClient {
    objects: HashMap<(String, ObjectKey), serde_json::Value>,
    requests: Mutex<Vec<(String, ObjectKey)>>,
}

impl MemoryObjectClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<K>(mut self, object: K) -> Self
    where
        K: Resource<DynamicType = ()> + Serialize,
    {
        let meta = object.meta();
        let key = ObjectKey::new(
            meta.namespace.clone().unwrap_or_default(),
            meta.name.clone().unwrap_or_default(),
        );
        let value = serde_json::to_value(&object).expect("serializable object");
        self.objects.insert((K::kind(&()).to_string(), key), value);
        self
    }

    /// Every `kind namespace/name` requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(kind, key)| format!("{} {}", kind, key))
            .collect()
    }
}

#[async_trait]
impl ObjectClient for MemoryObjectClient {
    async fn get<K>(&self, key: &ObjectKey) -> kube::Result<K>
    where
        K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>
            + Clone
            + DeserializeOwned
            + Debug
            + Send
            + 'static,
    {
        let kind = K::kind(&()).to_string();
        self.requests.lock().unwrap().push((kind.clone(), key.clone()));

        match self.objects.get(&(kind.clone(), key.clone())) {
            Some(value) => serde_json::from_value(value.clone()).map_err(kube::Error::SerdeError),
            None => Err(kube::Error::Api(ErrorResponse {
                status: "Failure".to_string(),
                message: format!("{}s \"{}\" not found", kind.to_lowercase(), key.name),
                reason: "NotFound".to_string(),
                code: 404,
            })),
        }
    }
}

pub fn meta(namespace: &str, name: &str) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: Some(namespace.to_string()),
        ..Default::default()
    }
}

pub fn refs(names: &[&str]) -> Vec<LocalObjectReference> {
    names
        .iter()
        .map(|name| LocalObjectReference {
            name: name.to_string(),
        })
        .collect()
}

pub fn pull_secret(namespace: &str, name: &str, server: &str, username: &str, password: &str) -> Secret {
    secrets::new_image_pull_secret(meta(namespace, name), server, username, password)
        .expect("valid image pull secret")
}

pub fn service_account(namespace: &str, name: &str, secret_names: &[&str]) -> ServiceAccount {
    ServiceAccount {
        metadata: meta(namespace, name),
        image_pull_secrets: Some(refs(secret_names)),
        ..Default::default()
    }
}
