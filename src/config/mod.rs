//! Configuration management for gistcheck
//!
//! Settings come from `~/.gistcheck/config.yaml` (or `--config`), with
//! environment variables layered on top. A missing default file is not an
//! error: every field has a default and credentials can come from the
//! environment alone.

use std::path::{Path, PathBuf};

use base64::{Engine as _, engine::general_purpose};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Public GitHub API root
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Gist forked during suite setup
pub const DEFAULT_FORK_SOURCE_ID: &str = "5979afb981e4e964abb517480692c929";

/// A file inside the default fork source
pub const DEFAULT_FORK_SOURCE_FILE: &str = "starwars-graph-data.csv";

/// Directory holding the JSON request payloads
pub const DEFAULT_FIXTURES_DIR: &str = "fixtures";

/// Environment variable holding a pre-issued bearer token
pub const ENV_TOKEN: &str = "GISTCHECK_TOKEN";

/// Environment variable holding base64 `user:password` credentials
pub const ENV_BASIC_CREDENTIALS: &str = "GISTCHECK_BASIC_CREDENTIALS";

/// Environment variable holding the OAuth app client ID
pub const ENV_CLIENT_ID: &str = "GISTCHECK_CLIENT_ID";

/// Environment variable holding the OAuth app client secret
pub const ENV_CLIENT_SECRET: &str = "GISTCHECK_CLIENT_SECRET";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API root, e.g. `https://api.github.com`
    pub api_base: String,

    /// Authorization endpoint (defaults to `{api_base}/authorizations`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_url: Option<String>,

    /// Base64-encoded `username:password` exchanged for a token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basic_credentials: Option<String>,

    /// Pre-issued bearer token; skips the credential exchange when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// OAuth app client ID used for the raised anonymous rate limit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// OAuth app client secret
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    /// ID of an existing gist owned by someone else, forked during setup
    pub fork_source_id: String,

    /// Name of a file in the fork source, checked on the fork
    pub fork_source_file: String,

    /// Directory with the JSON request payloads
    pub fixtures_dir: PathBuf,

    /// HTTP timeout in seconds
    pub timeout_secs: u64,

    /// Client-side pacing of outgoing requests
    pub requests_per_second: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            auth_url: None,
            basic_credentials: None,
            token: None,
            client_id: None,
            client_secret: None,
            fork_source_id: DEFAULT_FORK_SOURCE_ID.to_string(),
            fork_source_file: DEFAULT_FORK_SOURCE_FILE.to_string(),
            fixtures_dir: PathBuf::from(DEFAULT_FIXTURES_DIR),
            timeout_secs: 30,
            requests_per_second: 5,
        }
    }
}

/// How the suite obtains its bearer credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource<'a> {
    /// Use a token that was issued out of band
    Token(&'a str),
    /// Exchange basic credentials at the authorization endpoint
    Basic(&'a str),
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".gistcheck").join("config.yaml"))
    }

    /// Resolve the config path from an optional override
    pub fn resolve_path(path: Option<&str>) -> Result<PathBuf> {
        match path {
            Some(p) => Ok(PathBuf::from(p)),
            None => Self::default_path(),
        }
    }

    /// Load configuration from an optional override path.
    ///
    /// An explicit path must exist. The default path falls back to defaults
    /// when absent.
    pub fn load_at(path: Option<&str>) -> Result<Self> {
        let resolved = Self::resolve_path(path)?;
        if !resolved.exists() {
            if path.is_some() {
                return Err(ConfigError::NotFound(resolved).into());
            }
            return Ok(Self::default());
        }
        Self::load_from(&resolved)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()).into());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;

        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;

        std::fs::write(path, contents)?;

        // Credentials live in this file
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(path, perms)?;
        }

        Ok(())
    }

    /// Apply `GISTCHECK_*` environment overrides
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from a key lookup; empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = get(ENV_TOKEN) {
            self.token = Some(token);
        }
        if let Some(basic) = get(ENV_BASIC_CREDENTIALS) {
            self.basic_credentials = Some(basic);
        }
        if let Some(id) = get(ENV_CLIENT_ID) {
            self.client_id = Some(id);
        }
        if let Some(secret) = get(ENV_CLIENT_SECRET) {
            self.client_secret = Some(secret);
        }
    }

    /// Point the configuration at a different API host
    pub fn with_api_host(mut self, host: Option<&str>) -> Self {
        if let Some(host) = host {
            self.api_base = host.trim_end_matches('/').to_string();
        }
        self
    }

    /// Authorization endpoint URL
    pub fn auth_url(&self) -> String {
        self.auth_url
            .clone()
            .unwrap_or_else(|| format!("{}/authorizations", self.api_root()))
    }

    /// Gists collection URL, e.g. `https://api.github.com/gists`
    pub fn gists_url(&self) -> String {
        format!("{}/gists", self.api_root())
    }

    /// Canonical URL of a single gist as echoed in API responses
    pub fn gist_url(&self, id: &str) -> String {
        format!("{}/{}", self.gists_url(), id)
    }

    fn api_root(&self) -> &str {
        self.api_base.trim_end_matches('/')
    }

    /// Which credential the suite will use; a token wins over basic credentials
    pub fn credential_source(&self) -> Option<CredentialSource<'_>> {
        fn non_empty(v: &Option<String>) -> Option<&str> {
            v.as_deref().filter(|s| !s.trim().is_empty())
        }

        non_empty(&self.token)
            .map(CredentialSource::Token)
            .or_else(|| non_empty(&self.basic_credentials).map(CredentialSource::Basic))
    }

    /// OAuth app credentials, when both halves are present
    pub fn app_credentials(&self) -> Option<(&str, &str)> {
        match (self.client_id.as_deref(), self.client_secret.as_deref()) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => Some((id, secret)),
            _ => None,
        }
    }

    /// Validate that the suite can obtain a credential
    pub fn validate(&self) -> Result<()> {
        if self.credential_source().is_none() {
            return Err(ConfigError::MissingCredentials.into());
        }
        if self.requests_per_second == 0 {
            return Err(
                ConfigError::Invalid("requests_per_second must be at least 1".to_string()).into(),
            );
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be at least 1".to_string()).into());
        }
        Ok(())
    }
}

/// Encode `username:password` the way HTTP Basic auth expects
pub fn encode_basic_credentials(username: &str, password: &str) -> String {
    general_purpose::STANDARD.encode(format!("{}:{}", username, password))
}
