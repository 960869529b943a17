//! Kubernetes image pull Secret resolution
//!
//! Reads the image pull Secrets a Pod can use, either referenced directly by the Pod or
//! through its ServiceAccount, and resolves the Docker registry credentials that apply
//! to each of its containers.

pub mod cli;
pub mod config;
pub mod docker;
pub mod error;
pub mod logging;
pub mod output;
pub mod secrets;

pub use config::AppConfig;
pub use error::{PullSecretError, Result};
pub use output::OutputManager;
pub use secrets::{ContainerImages, SecretsReader};
