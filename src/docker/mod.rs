//! Docker registry auth configuration
//!
//! This module reads and writes the `config.json` style document that Kubernetes stores
//! under the `.dockerconfigjson` key of an image pull Secret, and provides the registry
//! host resolution used to match credentials against image references.

pub mod reference;

pub use reference::{DEFAULT_REGISTRY, ImageReference, get_host_from_server, get_server_from_image_ref};

use crate::error::{PullSecretError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The `auth` token of a Docker config entry: `base64(username ":" password)`
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BasicAuth(String);

impl BasicAuth {
    pub fn new(username: &str, password: &str) -> Self {
        Self(STANDARD.encode(format!("{}:{}", username, password)))
    }

    /// Decode the token back into its username and password.
    pub fn decode(&self) -> Result<(String, String)> {
        let bytes = STANDARD
            .decode(self.0.trim())
            .map_err(|e| PullSecretError::InvalidBasicAuth(format!("not base64: {}", e)))?;
        let decoded = String::from_utf8(bytes)
            .map_err(|e| PullSecretError::InvalidBasicAuth(format!("not UTF-8: {}", e)))?;
        // Passwords may contain ':', usernames may not.
        let (username, password) = decoded
            .split_once(':')
            .ok_or_else(|| PullSecretError::InvalidBasicAuth("missing ':' separator".to_string()))?;
        Ok((username.to_string(), password.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for BasicAuth {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BasicAuth(<redacted>)")
    }
}

/// Credentials for a single registry server
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAuth")]
pub struct Auth {
    #[serde(skip_serializing_if = "BasicAuth::is_empty")]
    pub auth: BasicAuth,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub password: String,
}

impl Auth {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        let username = username.into();
        let password = password.into();
        Self {
            auth: BasicAuth::new(&username, &password),
            username,
            password,
        }
    }
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Auth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Deserialize)]
struct RawAuth {
    #[serde(default)]
    auth: BasicAuth,
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

impl TryFrom<RawAuth> for Auth {
    type Error = PullSecretError;

    fn try_from(raw: RawAuth) -> Result<Self> {
        let RawAuth {
            auth,
            mut username,
            mut password,
        } = raw;

        // Files written by `docker login` only carry the combined token.
        if username.is_empty() && password.is_empty() && !auth.is_empty() {
            (username, password) = auth.decode()?;
        }

        Ok(Self {
            auth,
            username,
            password,
        })
    }
}

/// The Docker config document, keyed by registry server as written by the user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub auths: BTreeMap<String, Auth>,
}

impl Config {
    /// Config with a single entry for `server`.
    pub fn with_basic_auth(server: impl Into<String>, username: &str, password: &str) -> Self {
        let mut auths = BTreeMap::new();
        auths.insert(server.into(), Auth::new(username, password));
        Self { auths }
    }

    pub fn read(contents: &[u8]) -> Result<Self> {
        serde_json::from_slice(contents).map_err(PullSecretError::MalformedConfig)
    }

    pub fn write(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| PullSecretError::Serialization(e.to_string()))
    }
}
