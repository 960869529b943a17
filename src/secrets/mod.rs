//! Image pull Secrets
//!
//! Builds image pull Secrets from basic auth credentials and resolves the credentials
//! that apply to each container of a workload from the Secrets it can pull with.

pub mod images;
pub mod reader;

pub use images::ContainerImages;
pub use reader::{
    ApiSecretsReader, ObjectClient, ObjectKey, ObjectSecretsReader, SERVICE_ACCOUNT_DEFAULT,
    SecretsReader,
};

use crate::docker::{self, Auth};
use crate::error::{PullSecretError, Result};
use k8s_openapi::ByteString;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Secret type of image pull Secrets
pub const SECRET_TYPE_DOCKER_CONFIG_JSON: &str = "kubernetes.io/dockerconfigjson";

/// Data key holding the Docker config document
pub const DOCKER_CONFIG_JSON_KEY: &str = ".dockerconfigjson";

/// Construct an image pull Secret for `server` with basic auth credentials.
///
/// The server is stored as given and must resolve to a registry host.
pub fn new_image_pull_secret(
    meta: ObjectMeta,
    server: &str,
    username: &str,
    password: &str,
) -> Result<Secret> {
    docker::get_host_from_server(server)?;
    let docker_config = docker::Config::with_basic_auth(server, username, password).write()?;

    Ok(Secret {
        metadata: meta,
        type_: Some(SECRET_TYPE_DOCKER_CONFIG_JSON.to_string()),
        data: Some(BTreeMap::from([(
            DOCKER_CONFIG_JSON_KEY.to_string(),
            ByteString(docker_config),
        )])),
        ..Default::default()
    })
}

/// Map each container to the credentials of the registry its image is pulled from.
///
/// Containers whose registry has no credentials in `secrets` are left out.
pub fn map_container_names_to_docker_auths(
    images: &ContainerImages,
    secrets: &[Secret],
) -> Result<HashMap<String, Auth>> {
    let auths = map_docker_registry_servers_to_auths(secrets)?;

    let mut mapping = HashMap::new();
    for (container_name, image_ref) in images {
        let server = docker::get_server_from_image_ref(image_ref)?;
        match auths.get(&server) {
            Some(auth) => {
                mapping.insert(container_name.clone(), auth.clone());
            }
            None => debug!(container = %container_name, %server, "no credentials for registry"),
        }
    }

    Ok(mapping)
}

/// Map each registry host to its credentials across `image_pull_secrets`.
///
/// When two entries resolve to the same host the later one wins.
pub fn map_docker_registry_servers_to_auths(
    image_pull_secrets: &[Secret],
) -> Result<HashMap<String, Auth>> {
    let mut auths: HashMap<String, Auth> = HashMap::new();
    let mut origins: HashMap<String, String> = HashMap::new();

    for secret in image_pull_secrets {
        let origin = secret_key(secret);
        let contents = secret
            .data
            .as_ref()
            .and_then(|data| data.get(DOCKER_CONFIG_JSON_KEY))
            .ok_or_else(|| PullSecretError::MissingDockerConfig {
                namespace: secret.metadata.namespace.clone().unwrap_or_default(),
                name: secret.metadata.name.clone().unwrap_or_default(),
            })?;

        let docker_config = docker::Config::read(&contents.0)?;
        for (server, auth) in docker_config.auths {
            let host = docker::get_host_from_server(&server)?;
            if let Some(previous) = auths.get(&host) {
                if *previous != auth {
                    warn!(
                        %host,
                        previous = %origins.get(&host).map(String::as_str).unwrap_or_default(),
                        secret = %origin,
                        "registry credentials overwritten by a later image pull secret"
                    );
                }
            }
            origins.insert(host.clone(), origin.clone());
            auths.insert(host, auth);
        }
    }

    Ok(auths)
}

/// Flatten per-container credentials into Secret data with
/// `<container>.username` and `<container>.password` keys.
pub fn aggregate_image_pull_secrets_data(
    images: &ContainerImages,
    credentials: &HashMap<String, Auth>,
) -> BTreeMap<String, ByteString> {
    let mut secret_data = BTreeMap::new();

    for (container_name, _) in images {
        if let Some(auth) = credentials.get(container_name) {
            secret_data.insert(
                format!("{}.username", container_name),
                ByteString(auth.username.clone().into_bytes()),
            );
            secret_data.insert(
                format!("{}.password", container_name),
                ByteString(auth.password.clone().into_bytes()),
            );
        }
    }

    secret_data
}

fn secret_key(secret: &Secret) -> String {
    format!(
        "{}/{}",
        secret.metadata.namespace.as_deref().unwrap_or_default(),
        secret.metadata.name.as_deref().unwrap_or_default()
    )
}
