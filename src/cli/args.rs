//! Command-line argument parsing

use crate::config::{AppConfig, OutputFormat, ReaderBackend};
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "kube-pull-secrets")]
#[command(about = "Resolve Docker registry credentials from Kubernetes image pull Secrets")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Namespace of the objects to read or create
    #[arg(long = "namespace", short = 'n', global = true)]
    pub namespace: Option<String>,

    /// Output format for printed documents
    #[arg(long = "output", short = 'o', global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Verbose output
    #[arg(long = "verbose", short = 'v', global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Only print the requested document and errors
    #[arg(long = "quiet", short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the registry credentials that apply to each container of a Pod
    Resolve {
        /// Name of the Pod
        #[arg(long = "pod", short = 'p')]
        pod: String,

        /// How Secrets are fetched from the API server
        #[arg(long = "backend", short = 'b', value_enum)]
        backend: Option<ReaderBackend>,

        /// Print passwords instead of masking them
        #[arg(long = "show-passwords")]
        show_passwords: bool,
    },
    /// Print an image pull Secret manifest for basic auth credentials
    CreateSecret {
        /// Name of the Secret
        #[arg(long = "name")]
        name: String,

        /// Registry server, e.g. https://index.docker.io/v1/
        #[arg(long = "server", short = 's')]
        server: String,

        /// Registry username
        #[arg(long = "username", short = 'u')]
        username: String,

        /// Registry password
        #[arg(long = "password", env = "PULL_SECRETS_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

impl Args {
    /// Apply the flags given on the command line on top of `config`
    pub fn apply_to(&self, mut config: AppConfig) -> AppConfig {
        if let Some(namespace) = &self.namespace {
            config.namespace = namespace.clone();
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if self.verbose {
            config.verbose = true;
        }
        if let Command::Resolve {
            backend,
            show_passwords,
            ..
        } = &self.command
        {
            if let Some(backend) = backend {
                config.backend = *backend;
            }
            config.show_passwords |= *show_passwords;
        }
        config
    }
}
