//! Diagnostic logging setup
//!
//! Library code logs through `tracing`. The binary installs a formatting subscriber
//! writing to stderr so that stdout only ever carries the printed document.

use crate::error::{PullSecretError, Result};
use tracing_subscriber::EnvFilter;

/// Filter directive used when `RUST_LOG` is not set
pub fn default_directive(verbose: bool, quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose {
        "kube_pull_secrets=debug,kube=info,warn"
    } else {
        "kube_pull_secrets=info,warn"
    }
}

/// Install the global subscriber. `RUST_LOG` takes precedence over the flags.
pub fn init(verbose: bool, quiet: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .try_init()
        .map_err(|e| PullSecretError::Configuration(format!("Failed to initialize logging: {}", e)))
}
