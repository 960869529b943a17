//! Error handling for image pull Secret resolution
//!
//! Every failure is terminal for the call that produced it. Errors that come from
//! the Kubernetes API keep the namespace and name of the object that was being read.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PullSecretError {
    /// A referenced Secret could not be read
    #[error("getting secret by name: {namespace}/{name}: {source}")]
    GetSecret {
        namespace: String,
        name: String,
        #[source]
        source: kube::Error,
    },
    /// The ServiceAccount could not be read
    #[error("getting service account by name: {namespace}/{name}: {source}")]
    GetServiceAccount {
        namespace: String,
        name: String,
        #[source]
        source: kube::Error,
    },
    /// The Pod could not be read
    #[error("getting pod by name: {namespace}/{name}: {source}")]
    GetPod {
        namespace: String,
        name: String,
        #[source]
        source: kube::Error,
    },
    /// The Secret has no `.dockerconfigjson` entry
    #[error("secret {namespace}/{name} has no .dockerconfigjson data")]
    MissingDockerConfig { namespace: String, name: String },
    /// The Docker config document is not valid JSON for the expected shape
    #[error("malformed docker config: {0}")]
    MalformedConfig(#[source] serde_json::Error),
    /// The `auth` field of a Docker config entry cannot be decoded
    #[error("invalid basic auth: {0}")]
    InvalidBasicAuth(String),
    /// A registry server cannot be reduced to a host
    #[error("invalid registry server {server:?}: {reason}")]
    InvalidServer { server: String, reason: String },
    /// An image reference has no parseable registry host
    #[error("invalid image reference {reference:?}: {reason}")]
    InvalidReference { reference: String, reason: String },
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// The Kubernetes client could not be created
    #[error("Kubernetes client error: {0}")]
    Client(#[from] kube::Error),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PullSecretError {
    /// Returns `true` when the API server answered 404 for the object being read.
    pub fn is_not_found(&self) -> bool {
        match self {
            PullSecretError::GetSecret { source, .. }
            | PullSecretError::GetServiceAccount { source, .. }
            | PullSecretError::GetPod { source, .. } => is_not_found(source),
            _ => false,
        }
    }
}

pub(crate) fn is_not_found(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(response) if response.code == 404)
}

impl From<serde_yaml::Error> for PullSecretError {
    fn from(err: serde_yaml::Error) -> Self {
        PullSecretError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PullSecretError>;
