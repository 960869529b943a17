//! Registry host resolution for servers and image references

use crate::error::{PullSecretError, Result};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Registry host used for images that do not name one (Docker Hub)
pub const DEFAULT_REGISTRY: &str = "index.docker.io";

/// Docker Hub aliases that all resolve to [`DEFAULT_REGISTRY`]
const DOCKER_HUB_ALIASES: &[&str] = &["docker.io", "registry-1.docker.io", DEFAULT_REGISTRY];

const MAX_TAG_LENGTH: usize = 128;

/// Reduce a registry server, as written in a Docker config, to its canonical host.
///
/// The scheme and any path are dropped, the host is lowercased and an explicit port is
/// kept. `https://index.docker.io/v1/`, `index.docker.io` and `docker.io` all resolve to
/// `index.docker.io`.
pub fn get_host_from_server(server: &str) -> Result<String> {
    let trimmed = server.trim();
    if trimmed.is_empty() {
        return Err(invalid_server(server, "empty server"));
    }

    let authority = match trimmed.split_once("://") {
        Some((scheme, rest)) => {
            if scheme.is_empty() {
                return Err(invalid_server(server, "empty scheme"));
            }
            rest
        }
        None => trimmed,
    };
    let authority = authority.split('/').next().unwrap_or_default();
    if authority.is_empty() {
        return Err(invalid_server(server, "missing host"));
    }
    if authority.contains('@') {
        return Err(invalid_server(server, "credentials in server address"));
    }

    // Parsing under a fixed scheme validates the host and keeps non-default ports.
    let parsed = Url::parse(&format!("https://{}", authority))
        .map_err(|e| invalid_server(server, &e.to_string()))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| invalid_server(server, "missing host"))?;

    let host = match parsed.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };

    if DOCKER_HUB_ALIASES.contains(&host.as_str()) {
        return Ok(DEFAULT_REGISTRY.to_string());
    }
    Ok(host)
}

/// Registry host an image reference will be pulled from.
pub fn get_server_from_image_ref(image_ref: &str) -> Result<String> {
    Ok(ImageReference::parse(image_ref)?.registry)
}

fn invalid_server(server: &str, reason: &str) -> PullSecretError {
    PullSecretError::InvalidServer {
        server: server.to_string(),
        reason: reason.to_string(),
    }
}

/// A parsed container image reference: `[registry/]repository[:tag][@digest]`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageReference {
    /// Canonical registry host, see [`get_host_from_server`]
    pub registry: String,
    pub repository: String,
    pub tag: Option<String>,
    pub digest: Option<String>,
}

impl ImageReference {
    pub fn parse(reference: &str) -> Result<Self> {
        let invalid = |reason: &str| PullSecretError::InvalidReference {
            reference: reference.to_string(),
            reason: reason.to_string(),
        };

        if reference.is_empty() {
            return Err(invalid("empty reference"));
        }
        if reference.chars().any(char::is_whitespace) {
            return Err(invalid("reference contains whitespace"));
        }

        let (name_and_tag, digest) = match reference.split_once('@') {
            Some((name, digest)) => {
                validate_digest(digest).map_err(|reason| invalid(reason))?;
                (name, Some(digest.to_string()))
            }
            None => (reference, None),
        };

        // The first component names a registry only if it looks like a host.
        let (registry, remainder) = match name_and_tag.split_once('/') {
            Some((first, rest))
                if first.contains('.') || first.contains(':') || first == "localhost" =>
            {
                let host = get_host_from_server(first)
                    .map_err(|_| invalid("invalid registry host"))?;
                (host, rest)
            }
            _ => (DEFAULT_REGISTRY.to_string(), name_and_tag),
        };

        let (repository, tag) = match remainder.rsplit_once(':') {
            Some((repository, tag)) => {
                validate_tag(tag).map_err(|reason| invalid(reason))?;
                (repository, Some(tag.to_string()))
            }
            None => (remainder, None),
        };
        validate_repository(repository).map_err(|reason| invalid(reason))?;

        let repository = if registry == DEFAULT_REGISTRY && !repository.contains('/') {
            format!("library/{}", repository)
        } else {
            repository.to_string()
        };

        Ok(Self {
            registry,
            repository,
            tag,
            digest,
        })
    }
}

impl FromStr for ImageReference {
    type Err = PullSecretError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.registry, self.repository)?;
        if let Some(tag) = &self.tag {
            write!(f, ":{}", tag)?;
        }
        if let Some(digest) = &self.digest {
            write!(f, "@{}", digest)?;
        }
        Ok(())
    }
}

fn validate_repository(repository: &str) -> std::result::Result<(), &'static str> {
    if repository.is_empty() {
        return Err("empty repository");
    }
    for component in repository.split('/') {
        let first = component.chars().next();
        let last = component.chars().last();
        match (first, last) {
            (Some(a), Some(b)) if is_lower_alnum(a) && is_lower_alnum(b) => {}
            _ => return Err("repository components must start and end with [a-z0-9]"),
        }
        if !component
            .chars()
            .all(|c| is_lower_alnum(c) || matches!(c, '.' | '_' | '-'))
        {
            return Err("repository must be lowercase [a-z0-9._-]");
        }
    }
    Ok(())
}

fn validate_tag(tag: &str) -> std::result::Result<(), &'static str> {
    if tag.is_empty() || tag.len() > MAX_TAG_LENGTH {
        return Err("tag must be 1 to 128 characters");
    }
    if tag.starts_with('.') || tag.starts_with('-') {
        return Err("tag must not start with '.' or '-'");
    }
    if !tag
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err("tag must be [A-Za-z0-9_.-]");
    }
    Ok(())
}

fn validate_digest(digest: &str) -> std::result::Result<(), &'static str> {
    let (algorithm, encoded) = digest
        .split_once(':')
        .ok_or("digest must be algorithm:encoded")?;
    if algorithm.is_empty()
        || !algorithm
            .chars()
            .all(|c| is_lower_alnum(c) || matches!(c, '+' | '.' | '_' | '-'))
    {
        return Err("invalid digest algorithm");
    }
    if encoded.len() < 32 || !encoded.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err("digest must be at least 32 hex characters");
    }
    Ok(())
}

fn is_lower_alnum(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit()
}
