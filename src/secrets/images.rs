//! Container name to image reference mapping

use crate::error::{PullSecretError, Result};
use k8s_openapi::api::core::v1::PodSpec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map;

/// Images of a workload keyed by container name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerImages(BTreeMap<String, String>);

impl ContainerImages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the images of a Pod spec.
    ///
    /// Init containers are included since the kubelet pulls them with the same Secrets.
    /// Containers without an image are skipped.
    pub fn from_pod_spec(spec: &PodSpec) -> Self {
        let init_containers = spec.init_containers.iter().flatten();
        spec.containers
            .iter()
            .chain(init_containers)
            .filter_map(|container| {
                container
                    .image
                    .as_ref()
                    .filter(|image| !image.is_empty())
                    .map(|image| (container.name.clone(), image.clone()))
            })
            .collect()
    }

    /// Insert an image, returning the previous image of that container if any
    pub fn insert(&mut self, container: impl Into<String>, image: impl Into<String>) -> Option<String> {
        self.0.insert(container.into(), image.into())
    }

    pub fn get(&self, container: &str) -> Option<&str> {
        self.0.get(container).map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Serialize as a JSON object, e.g. for an annotation value
    pub fn as_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| PullSecretError::Serialization(e.to_string()))
    }

    pub fn from_json(value: &str) -> Result<Self> {
        serde_json::from_str(value).map_err(|e| PullSecretError::Serialization(e.to_string()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ContainerImages {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<'a> IntoIterator for &'a ContainerImages {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
