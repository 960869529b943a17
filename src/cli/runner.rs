//! Runner executing the parsed command against the cluster

use crate::cli::args::{Args, Command};
use crate::config::{AppConfig, ReaderBackend};
use crate::error::{PullSecretError, Result};
use crate::output::OutputManager;
use crate::secrets::{
    self, ApiSecretsReader, ContainerImages, ObjectClient, ObjectKey, ObjectSecretsReader,
    SecretsReader,
};
use k8s_openapi::ByteString;
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::Client;
use std::collections::BTreeMap;
use tracing::debug;

const MASKED_PASSWORD: &str = "********";

pub struct Runner {
    args: Args,
    config: AppConfig,
    output: OutputManager,
}

impl Runner {
    pub fn new(args: Args) -> Result<Self> {
        Self::with_config(args, AppConfig::from_env()?)
    }

    /// Build a runner whose flags are applied on top of `base`
    pub fn with_config(args: Args, base: AppConfig) -> Result<Self> {
        let config = args.apply_to(base);
        config.validate()?;

        let output = if args.quiet {
            OutputManager::new_quiet()
        } else {
            OutputManager::new(config.verbose)
        };

        Ok(Self {
            args,
            config,
            output,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn output(&self) -> &OutputManager {
        &self.output
    }

    pub async fn run(&self) -> Result<()> {
        match &self.args.command {
            Command::Resolve { pod, .. } => self.resolve(pod).await,
            Command::CreateSecret {
                name,
                server,
                username,
                password,
            } => self.create_secret(name, server, username, password),
        }
    }

    async fn resolve(&self, pod_name: &str) -> Result<()> {
        let namespace = self.config.namespace.as_str();
        let key = ObjectKey::new(namespace, pod_name);
        self.output.info(&format!("Resolving image pull secrets for pod {}", key));
        let client = Client::try_default().await?;

        let pod: Pod = ObjectClient::get(&client, &key)
            .await
            .map_err(|source| PullSecretError::GetPod {
                namespace: key.namespace.clone(),
                name: key.name.clone(),
                source,
            })?;
        let spec = pod.spec.unwrap_or_default();

        debug!(backend = ?self.config.backend, "listing image pull secrets");
        let reader: Box<dyn SecretsReader> = match self.config.backend {
            ReaderBackend::Api => Box::new(ApiSecretsReader::new(client)),
            ReaderBackend::Object => Box::new(ObjectSecretsReader::new(client)),
        };
        let pull_secrets = reader
            .list_image_pull_secrets_by_pod_spec(&spec, namespace)
            .await?;
        self.output.detail(&format!(
            "Found {} image pull secret(s) for pod {}",
            pull_secrets.len(),
            key
        ));

        let images = ContainerImages::from_pod_spec(&spec);
        let credentials = secrets::map_container_names_to_docker_auths(&images, &pull_secrets)?;
        for (container, image) in &images {
            if !credentials.contains_key(container) {
                self.output.warning(&format!(
                    "No credentials for container {} ({})",
                    container, image
                ));
            }
        }

        let data = secrets::aggregate_image_pull_secrets_data(&images, &credentials);
        let document = display_data(&data, self.config.show_passwords);
        self.output.print_document(&document, self.config.output)?;
        self.output.success(&format!(
            "Resolved credentials for {} of {} container(s)",
            credentials.len(),
            images.len()
        ));
        Ok(())
    }

    fn create_secret(&self, name: &str, server: &str, username: &str, password: &str) -> Result<()> {
        let meta = ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(self.config.namespace.clone()),
            ..Default::default()
        };
        let secret = secrets::new_image_pull_secret(meta, server, username, password)?;
        self.output.print_document(&secret, self.config.output)
    }
}

/// Secret data as printable strings, passwords masked unless requested
fn display_data(data: &BTreeMap<String, ByteString>, show_passwords: bool) -> BTreeMap<String, String> {
    data.iter()
        .map(|(key, value)| {
            let shown = if key.ends_with(".password") && !show_passwords {
                MASKED_PASSWORD.to_string()
            } else {
                String::from_utf8_lossy(&value.0).into_owned()
            };
            (key.clone(), shown)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(argv: &[&str]) -> Args {
        let mut full = vec!["kube-pull-secrets", "resolve", "--pod", "web-0"];
        full.extend_from_slice(argv);
        Args::try_parse_from(full).unwrap()
    }

    #[test]
    fn test_environment_verbosity_reaches_logging() {
        let base = AppConfig {
            verbose: true,
            ..Default::default()
        };
        let runner = Runner::with_config(args(&[]), base).unwrap();
        assert!(runner.config().verbose);
        assert!(runner.output().verbose);
        assert!(!runner.output().is_quiet());
    }

    #[test]
    fn test_quiet_flag_silences_output_and_logging() {
        let runner = Runner::with_config(args(&["-q"]), AppConfig::default()).unwrap();
        assert!(!runner.config().verbose);
        assert!(runner.output().is_quiet());
    }

    #[test]
    fn test_invalid_namespace_is_rejected() {
        let result = Runner::with_config(args(&["-n", "Prod"]), AppConfig::default());
        assert!(matches!(result, Err(PullSecretError::Configuration(_))));
    }

    #[test]
    fn test_display_data_masks_passwords() {
        let data = BTreeMap::from([
            ("app.username".to_string(), ByteString(b"u".to_vec())),
            ("app.password".to_string(), ByteString(b"p".to_vec())),
        ]);

        let masked = display_data(&data, false);
        assert_eq!(masked["app.username"], "u");
        assert_eq!(masked["app.password"], MASKED_PASSWORD);

        let shown = display_data(&data, true);
        assert_eq!(shown["app.password"], "p");
    }
}
