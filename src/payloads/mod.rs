//! JSON request payloads loaded from the fixtures directory
//!
//! Each payload file is sent verbatim as a request body. Loading only checks
//! that the file exists and parses as JSON, so a broken fixture is reported
//! before any gist is created.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::debug;
use serde_json::Value;

use crate::error::FixtureError;

/// The request bodies used by the suites
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    /// Scopes requested when exchanging basic credentials for a token
    GetAccessToken,
    CreatePublicGist,
    CreateSecretGist,
    UpdatePublicGist,
    UpdateSecretGist,
    /// Adds a file to an existing gist
    CreateNewGistFile,
    /// Removes a file by mapping its name to `null`
    DeleteGistFile,
}

impl PayloadKind {
    /// All payloads, in the order they are loaded.
    pub const ALL: [PayloadKind; 7] = [
        PayloadKind::GetAccessToken,
        PayloadKind::CreatePublicGist,
        PayloadKind::CreateSecretGist,
        PayloadKind::UpdatePublicGist,
        PayloadKind::UpdateSecretGist,
        PayloadKind::CreateNewGistFile,
        PayloadKind::DeleteGistFile,
    ];

    /// File name inside the fixtures directory
    pub fn file_name(&self) -> &'static str {
        match self {
            PayloadKind::GetAccessToken => "GetAccessToken.json",
            PayloadKind::CreatePublicGist => "CreatePublicGist.json",
            PayloadKind::CreateSecretGist => "CreateSecretGist.json",
            PayloadKind::UpdatePublicGist => "UpdatePublicGist.json",
            PayloadKind::UpdateSecretGist => "UpdateSecretGist.json",
            PayloadKind::CreateNewGistFile => "CreateNewGistFile.json",
            PayloadKind::DeleteGistFile => "DeleteGistFile.json",
        }
    }
}

/// A request body as read from disk
#[derive(Debug, Clone)]
pub struct Payload {
    kind: PayloadKind,
    raw: String,
    value: Value,
}

impl Payload {
    /// Build a payload from raw JSON text
    pub fn parse(kind: PayloadKind, raw: String, path: &Path) -> Result<Self, FixtureError> {
        let value = serde_json::from_str(&raw)
            .map_err(|e| FixtureError::Malformed(path.to_path_buf(), e.to_string()))?;
        Ok(Self { kind, raw, value })
    }

    pub fn kind(&self) -> PayloadKind {
        self.kind
    }

    /// The exact bytes sent on the wire
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Parsed view of the payload
    pub fn json(&self) -> &Value {
        &self.value
    }
}

/// Every payload the suites need, loaded up front
#[derive(Debug, Clone)]
pub struct PayloadSet {
    dir: PathBuf,
    payloads: HashMap<PayloadKind, Payload>,
}

impl PayloadSet {
    /// Load all payloads from `dir`, failing on the first missing or
    /// malformed file.
    pub fn load(dir: &Path) -> Result<Self, FixtureError> {
        let mut payloads = HashMap::new();

        for kind in PayloadKind::ALL {
            let path = dir.join(kind.file_name());
            let raw = std::fs::read_to_string(&path)
                .map_err(|_| FixtureError::Missing(path.clone()))?;
            debug!("Loaded payload {}", path.display());
            payloads.insert(kind, Payload::parse(kind, raw, &path)?);
        }

        Ok(Self {
            dir: dir.to_path_buf(),
            payloads,
        })
    }

    /// Directory the payloads were loaded from
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Get a payload. `load` guarantees every kind is present.
    pub fn get(&self, kind: PayloadKind) -> &Payload {
        &self.payloads[&kind]
    }
}
