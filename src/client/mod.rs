//! GitHub Gist API client
//!
//! The client is deliberately thin: every call returns an [`ApiResponse`]
//! carrying the raw status, headers and JSON body, because the suites assert
//! on exactly those. Only transport failures are errors.

use std::fmt;

use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde_json::Value;

pub mod api;
pub mod github;
#[cfg(test)]
pub mod mock;
pub mod rate_limit;

pub use api::{AuthApi, GistApi};
pub use github::GitHubClient;
#[cfg(test)]
pub use mock::MockGistService;
pub use rate_limit::{RateLimitInfo, RequestPacer};

/// Combined surface used by the provisioner and the suites
pub trait GitHubApi: AuthApi + GistApi {}

impl<T: AuthApi + GistApi> GitHubApi for T {}

/// Opaque bearer token.
///
/// `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for the `Authorization` header
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Who a request is sent as
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// No `Authorization` header
    Anonymous,
    /// `Authorization: Bearer <token>`
    Bearer(Credential),
}

/// Raw outcome of one API call
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Parsed JSON body; `None` for empty or non-JSON bodies (e.g. 204)
    pub body: Option<Value>,
}

impl ApiResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: Option<Value>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Status as a plain number
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Walk the body along `path`.
    ///
    /// Object keys are matched literally (so `newPublicGistFile.txt` is one
    /// segment); numeric segments index into arrays.
    pub fn lookup(&self, path: &[&str]) -> Option<&Value> {
        let mut current = self.body.as_ref()?;
        for segment in path {
            current = match current {
                Value::Object(map) => map.get(*segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Top-level string field, e.g. `id` or `token`
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.lookup(&[key])?.as_str()
    }

    /// Header value as a string
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// Parsed `X-RateLimit-*` headers
    pub fn rate_limit(&self) -> Option<RateLimitInfo> {
        RateLimitInfo::from_headers(&self.headers)
    }
}
