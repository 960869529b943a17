//! Configuration management module

use crate::error::{PullSecretError, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

const MAX_NAMESPACE_LENGTH: usize = 63;

/// How Secrets are fetched from the API server
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReaderBackend {
    /// Typed `Api<Secret>` / `Api<ServiceAccount>` handles
    #[default]
    Api,
    /// Generic object client
    Object,
}

/// Output format for printed documents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub namespace: String,
    pub backend: ReaderBackend,
    pub output: OutputFormat,
    pub show_passwords: bool,
    pub verbose: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            namespace: "default".to_string(),
            backend: ReaderBackend::Api,
            output: OutputFormat::Json,
            show_passwords: false,
            verbose: false,
        }
    }
}

impl AppConfig {
    /// Create config from environment variables and defaults
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(val) = lookup("PULL_SECRETS_NAMESPACE") {
            config.namespace = val;
        }
        if let Some(val) = lookup("PULL_SECRETS_BACKEND") {
            config.backend = ReaderBackend::from_str(&val, true).map_err(|_| {
                PullSecretError::Configuration(format!(
                    "PULL_SECRETS_BACKEND must be one of: api, object (got {:?})",
                    val
                ))
            })?;
        }
        if let Some(val) = lookup("PULL_SECRETS_OUTPUT") {
            config.output = OutputFormat::from_str(&val, true).map_err(|_| {
                PullSecretError::Configuration(format!(
                    "PULL_SECRETS_OUTPUT must be one of: json, yaml (got {:?})",
                    val
                ))
            })?;
        }
        if let Some(val) = lookup("PULL_SECRETS_VERBOSE") {
            config.verbose = val.to_lowercase() == "true" || val == "1";
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_namespace(&self.namespace)
    }
}

/// Namespaces are RFC 1123 labels
fn validate_namespace(namespace: &str) -> Result<()> {
    if namespace.is_empty() {
        return Err(PullSecretError::Configuration(
            "Namespace cannot be empty".to_string(),
        ));
    }
    if namespace.len() > MAX_NAMESPACE_LENGTH {
        return Err(PullSecretError::Configuration(format!(
            "Namespace {:?} is longer than {} characters",
            namespace, MAX_NAMESPACE_LENGTH
        )));
    }
    let valid_chars = namespace
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !valid_chars || namespace.starts_with('-') || namespace.ends_with('-') {
        return Err(PullSecretError::Configuration(format!(
            "Invalid namespace {:?}: must consist of lowercase alphanumerics or '-'",
            namespace
        )));
    }
    Ok(())
}
