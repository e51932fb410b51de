//! Error types for gistcheck

use std::path::PathBuf;

use thiserror::Error;

use crate::provision::ProvisionStep;

/// Result type alias for gistcheck operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fixture(#[from] FixtureError),

    #[error(transparent)]
    Provision(#[from] ProvisionError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Interactive prompt error: {0}")]
    Dialoguer(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0} scenario(s) failed")]
    SuitesFailed(usize),

    #[error("Operation failed: {0}")]
    Other(String),
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        Error::Dialoguer(err.to_string())
    }
}

/// Transport-level API errors.
///
/// HTTP status codes are not errors here: every response, including 401 and
/// 404, is handed back to the caller for assertion.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("Request timed out".to_string())
        } else if err.is_connect() {
            ApiError::Network("Failed to connect to API".to_string())
        } else if err.is_builder() {
            ApiError::InvalidRequest(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),

    #[error(
        "No credentials configured. Run `gistcheck init` or set GISTCHECK_TOKEN / GISTCHECK_BASIC_CREDENTIALS."
    )]
    MissingCredentials,
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Errors loading the JSON request payloads from disk
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("Fixture payload not found: {}", .0.display())]
    Missing(PathBuf),

    #[error("Fixture payload {} is not valid JSON: {}", .0.display(), .1)]
    Malformed(PathBuf, String),
}

/// Failure of one of the suite setup steps
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("{step} failed with HTTP {status}")]
    Status { step: ProvisionStep, status: u16 },

    #[error("{step} response has no `{field}` field")]
    MissingField {
        step: ProvisionStep,
        field: &'static str,
    },

    #[error("{step} failed: {source}")]
    Transport {
        step: ProvisionStep,
        #[source]
        source: ApiError,
    },
}

/// A single failed expectation inside a scenario
#[derive(Debug, Clone, Error)]
#[error("{step}: expected {expected}, got {actual}")]
pub struct CheckFailure {
    /// Step of the scenario that failed (e.g. "star public gist")
    pub step: String,
    /// What the scenario expected
    pub expected: String,
    /// What the API actually returned
    pub actual: String,
}

impl CheckFailure {
    pub fn new(
        step: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            step: step.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}
