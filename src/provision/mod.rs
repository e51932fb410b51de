//! Suite fixture provisioning
//!
//! Before any scenario runs, a suite needs four things from GitHub: a bearer
//! credential, a public gist, a secret gist and a fork of a known gist.
//! [`SuiteFixture::provision`] obtains them in that order, one call at a
//! time, and hands back an immutable value every scenario borrows.
//!
//! Setup fails fast: a non-2xx status or a missing `token`/`id` field stops
//! provisioning with a [`ProvisionError`] naming the step. Gists created by
//! earlier steps are deleted before the error is returned. Nothing is
//! retried.

use std::fmt;

use log::{info, warn};
use serde::Serialize;

use crate::client::{ApiResponse, Credential, GitHubApi, Identity};
use crate::config::{Config, CredentialSource};
use crate::error::{ApiError, ConfigError, Error, ProvisionError, Result};
use crate::payloads::{PayloadKind, PayloadSet};

/// The setup steps, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionStep {
    ObtainCredential,
    CreatePublicGist,
    CreateSecretGist,
    ForkGist,
}

impl fmt::Display for ProvisionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProvisionStep::ObtainCredential => "obtain credential",
            ProvisionStep::CreatePublicGist => "create public gist",
            ProvisionStep::CreateSecretGist => "create secret gist",
            ProvisionStep::ForkGist => "fork gist",
        };
        f.write_str(label)
    }
}

/// Kind of provisioned gist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GistKind {
    Public,
    Secret,
    Forked,
}

impl fmt::Display for GistKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GistKind::Public => "public",
            GistKind::Secret => "secret",
            GistKind::Forked => "forked",
        };
        f.write_str(label)
    }
}

/// A gist created during setup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GistRef {
    pub kind: GistKind,
    pub id: String,
}

impl GistRef {
    fn new(kind: GistKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

/// What happened to a provisioned gist at teardown
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "detail", rename_all = "snake_case")]
pub enum TeardownOutcome {
    Deleted,
    /// A scenario already deleted it (404)
    AlreadyGone,
    Failed(String),
}

/// Teardown result for one gist
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeardownNote {
    pub gist: GistRef,
    pub outcome: TeardownOutcome,
}

/// Shared, read-only state for one suite run
#[derive(Debug, Clone)]
pub struct SuiteFixture {
    credential: Credential,
    public_gist: GistRef,
    secret_gist: GistRef,
    forked_gist: GistRef,
}

impl SuiteFixture {
    /// Run the four setup steps against `client`.
    pub async fn provision(
        client: &dyn GitHubApi,
        config: &Config,
        payloads: &PayloadSet,
    ) -> Result<Self> {
        let credential = obtain_credential(client, config, payloads).await?;
        let owner = Identity::Bearer(credential.clone());
        let mut created: Vec<GistRef> = Vec::with_capacity(3);

        let pending = [
            (ProvisionStep::CreatePublicGist, GistKind::Public),
            (ProvisionStep::CreateSecretGist, GistKind::Secret),
            (ProvisionStep::ForkGist, GistKind::Forked),
        ];

        for (step, kind) in pending {
            let call = match kind {
                GistKind::Public => {
                    client.create_gist(&owner, payloads.get(PayloadKind::CreatePublicGist))
                }
                GistKind::Secret => {
                    client.create_gist(&owner, payloads.get(PayloadKind::CreateSecretGist))
                }
                GistKind::Forked => client.fork_gist(&owner, &config.fork_source_id),
            };

            let outcome = call
                .await
                .map_err(|e| transport(step, e))
                .and_then(|resp| extract(&resp, step, "id"));

            match outcome {
                Ok(id) => {
                    info!("Provisioned {} gist {}", kind, id);
                    created.push(GistRef::new(kind, id));
                }
                Err(err) => {
                    warn!("Provisioning stopped at '{}': {}", step, err);
                    discard(client, &owner, &created).await;
                    return Err(err.into());
                }
            }
        }

        let [public_gist, secret_gist, forked_gist]: [GistRef; 3] = created
            .try_into()
            .map_err(|_| Error::Other("provisioning produced an incomplete fixture".to_string()))?;

        Ok(Self {
            credential,
            public_gist,
            secret_gist,
            forked_gist,
        })
    }

    pub fn public_gist_id(&self) -> &str {
        &self.public_gist.id
    }

    pub fn secret_gist_id(&self) -> &str {
        &self.secret_gist.id
    }

    pub fn forked_gist_id(&self) -> &str {
        &self.forked_gist.id
    }

    /// Identity of the fixture owner
    pub fn owner(&self) -> Identity {
        Identity::Bearer(self.credential.clone())
    }

    /// All three provisioned gists
    pub fn gists(&self) -> [&GistRef; 3] {
        [&self.public_gist, &self.secret_gist, &self.forked_gist]
    }

    /// Delete every provisioned gist, including the fork.
    ///
    /// A 404 means a scenario already removed the gist and counts as done.
    pub async fn teardown(&self, client: &dyn GitHubApi) -> Vec<TeardownNote> {
        let owner = self.owner();
        let mut notes = Vec::with_capacity(3);

        for gist in self.gists() {
            let outcome = match client.delete_gist(&owner, &gist.id).await {
                Ok(resp) if resp.status.is_success() => TeardownOutcome::Deleted,
                Ok(resp) if resp.status_code() == 404 => TeardownOutcome::AlreadyGone,
                Ok(resp) => TeardownOutcome::Failed(format!("HTTP {}", resp.status_code())),
                Err(err) => TeardownOutcome::Failed(err.to_string()),
            };

            match &outcome {
                TeardownOutcome::Failed(reason) => {
                    warn!("Could not delete {} gist {}: {}", gist.kind, gist.id, reason)
                }
                _ => info!("Tore down {} gist {}: {:?}", gist.kind, gist.id, outcome),
            }

            notes.push(TeardownNote {
                gist: gist.clone(),
                outcome,
            });
        }

        notes
    }
}

/// Step 1: use the configured token, or exchange basic credentials.
async fn obtain_credential(
    client: &dyn GitHubApi,
    config: &Config,
    payloads: &PayloadSet,
) -> Result<Credential> {
    let step = ProvisionStep::ObtainCredential;

    match config
        .credential_source()
        .ok_or(ConfigError::MissingCredentials)?
    {
        CredentialSource::Token(token) => {
            info!("Using configured bearer token");
            Ok(Credential::new(token))
        }
        CredentialSource::Basic(basic) => {
            let payload = payloads.get(PayloadKind::GetAccessToken);
            info!(
                "Exchanging basic credentials for a token with scopes {}",
                payload.json().get("scopes").unwrap_or(&serde_json::Value::Null)
            );
            let resp = client
                .authorize(basic, payload)
                .await
                .map_err(|e| transport(step, e))?;
            let token = extract(&resp, step, "token")?;
            Ok(Credential::new(token))
        }
    }
}

/// Pull a string field out of a successful response
fn extract(
    resp: &ApiResponse,
    step: ProvisionStep,
    field: &'static str,
) -> std::result::Result<String, ProvisionError> {
    if !resp.status.is_success() {
        return Err(ProvisionError::Status {
            step,
            status: resp.status_code(),
        });
    }

    resp.str_field(field)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(ProvisionError::MissingField { step, field })
}

fn transport(step: ProvisionStep, err: Error) -> ProvisionError {
    let source = match err {
        Error::Api(api) => api,
        other => ApiError::Network(other.to_string()),
    };
    ProvisionError::Transport { step, source }
}

/// Best-effort removal of gists created before a failed step
async fn discard(client: &dyn GitHubApi, owner: &Identity, created: &[GistRef]) {
    for gist in created {
        match client.delete_gist(owner, &gist.id).await {
            Ok(resp) if resp.status.is_success() => {
                info!("Removed partially provisioned {} gist {}", gist.kind, gist.id)
            }
            Ok(resp) => warn!(
                "Could not remove {} gist {}: HTTP {}",
                gist.kind,
                gist.id,
                resp.status_code()
            ),
            Err(err) => warn!("Could not remove {} gist {}: {}", gist.kind, gist.id, err),
        }
    }
}
