//! Scenario suites and the runner
//!
//! A suite run is three phases: provision a [`SuiteFixture`], run every
//! scenario of the suite in declaration order, then tear the fixture down.
//! Scenarios share the fixture read-only and report independently, so one
//! failed check does not stop the rest of the suite.

use std::fmt;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use indicatif::ProgressBar;
use log::{info, warn};
use serde::Serialize;

use crate::client::{GitHubApi, Identity};
use crate::config::Config;
use crate::error::CheckFailure;
use crate::payloads::{Payload, PayloadKind, PayloadSet};
use crate::provision::{SuiteFixture, TeardownNote};

pub mod authorized;
pub mod expect;
pub mod unauthorized;

pub use authorized::AuthorizedScenario;
pub use unauthorized::UnauthorizedScenario;

/// File created in the public gist
pub const PUBLIC_FILE: &str = "newPublicGistFile.txt";

/// File created in the secret gist
pub const SECRET_FILE: &str = "newSecretGistFile.txt";

/// Public gist file after its update
pub const UPDATED_PUBLIC_FILE: &str = "updatedPublicGistFile.json";

/// Secret gist file after its update
pub const UPDATED_SECRET_FILE: &str = "updatedSecretGistFile.json";

/// File added to, then removed from, the public gist
pub const ADDED_FILE: &str = "newFileName.json";

pub const CONTENT: &str = "The content is here";
pub const UPDATED_CONTENT: &str = "The updated content is here";

/// Language GitHub reports for `.txt` files
pub const TEXT_LANGUAGE: &str = "Text";

/// Which suite to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuiteKind {
    Authorized,
    Unauthorized,
}

impl fmt::Display for SuiteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuiteKind::Authorized => f.write_str("authorized"),
            SuiteKind::Unauthorized => f.write_str("unauthorized"),
        }
    }
}

/// Everything a scenario may touch
pub struct ScenarioContext<'a> {
    pub client: &'a dyn GitHubApi,
    pub config: &'a Config,
    pub payloads: &'a PayloadSet,
    pub fixture: &'a SuiteFixture,
}

impl ScenarioContext<'_> {
    /// The fixture owner's identity
    pub fn owner(&self) -> Identity {
        self.fixture.owner()
    }

    pub fn payload(&self, kind: PayloadKind) -> &Payload {
        self.payloads.get(kind)
    }
}

/// Why a scenario stopped before passing
#[derive(Debug, Clone)]
pub enum ScenarioHalt {
    Failed(CheckFailure),
    /// Preconditions not met; not counted as a failure
    Skipped(&'static str),
}

impl From<CheckFailure> for ScenarioHalt {
    fn from(failure: CheckFailure) -> Self {
        ScenarioHalt::Failed(failure)
    }
}

pub type ScenarioResult = std::result::Result<(), ScenarioHalt>;

/// One named check against the API
#[async_trait]
pub trait Scenario: Sync {
    fn title(&self) -> &'static str;

    async fn run(&self, ctx: &ScenarioContext<'_>) -> ScenarioResult;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioStatus {
    Passed,
    Failed,
    Skipped,
}

/// Result of one scenario
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioOutcome {
    /// 1-based position in the suite
    pub index: usize,
    pub title: String,
    pub status: ScenarioStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ScenarioOutcome {
    fn new(index: usize, title: &str, status: ScenarioStatus, detail: Option<String>) -> Self {
        Self {
            index,
            title: title.to_string(),
            status,
            detail,
        }
    }
}

/// IDs of the gists a suite ran against
#[derive(Debug, Clone, Serialize)]
pub struct FixtureSummary {
    pub public_gist_id: String,
    pub secret_gist_id: String,
    pub forked_gist_id: String,
}

impl From<&SuiteFixture> for FixtureSummary {
    fn from(fixture: &SuiteFixture) -> Self {
        Self {
            public_gist_id: fixture.public_gist_id().to_string(),
            secret_gist_id: fixture.secret_gist_id().to_string(),
            forked_gist_id: fixture.forked_gist_id().to_string(),
        }
    }
}

/// Everything that happened during one suite run
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub suite: SuiteKind,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixture: Option<FixtureSummary>,
    pub outcomes: Vec<ScenarioOutcome>,
    pub teardown: Vec<TeardownNote>,
}

impl SuiteReport {
    fn count(&self, status: ScenarioStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    pub fn passed_count(&self) -> usize {
        self.count(ScenarioStatus::Passed)
    }

    pub fn failed_count(&self) -> usize {
        self.count(ScenarioStatus::Failed)
    }

    pub fn skipped_count(&self) -> usize {
        self.count(ScenarioStatus::Skipped)
    }

    /// No scenario failed
    pub fn passed(&self) -> bool {
        self.failed_count() == 0
    }
}

/// Title of the synthetic outcome recorded when setup fails
pub const PROVISION_TITLE: &str = "provision fixture";

/// Provision, run every scenario of `kind`, then tear down.
pub async fn run_suite(
    kind: SuiteKind,
    client: &dyn GitHubApi,
    config: &Config,
    payloads: &PayloadSet,
    progress: &ProgressBar,
) -> SuiteReport {
    let started_at = Utc::now();
    let timer = Instant::now();

    progress.set_message(format!("{}: provisioning fixture", kind));
    info!("Starting {} suite", kind);

    let (fixture, outcomes, teardown) = match SuiteFixture::provision(client, config, payloads).await
    {
        Ok(fixture) => {
            let ctx = ScenarioContext {
                client,
                config,
                payloads,
                fixture: &fixture,
            };

            let outcomes = match kind {
                SuiteKind::Authorized => {
                    run_scenarios(kind, &AuthorizedScenario::ALL, &ctx, progress).await
                }
                SuiteKind::Unauthorized => {
                    run_scenarios(kind, &UnauthorizedScenario::ALL, &ctx, progress).await
                }
            };

            progress.set_message(format!("{}: tearing down", kind));
            let teardown = fixture.teardown(client).await;
            (Some(FixtureSummary::from(&fixture)), outcomes, teardown)
        }
        Err(err) => {
            warn!("{} suite could not provision its fixture: {}", kind, err);
            let outcome =
                ScenarioOutcome::new(0, PROVISION_TITLE, ScenarioStatus::Failed, Some(err.to_string()));
            (None, vec![outcome], Vec::new())
        }
    };

    SuiteReport {
        suite: kind,
        started_at,
        duration_ms: timer.elapsed().as_millis() as u64,
        fixture,
        outcomes,
        teardown,
    }
}

async fn run_scenarios<S: Scenario>(
    kind: SuiteKind,
    scenarios: &[S],
    ctx: &ScenarioContext<'_>,
    progress: &ProgressBar,
) -> Vec<ScenarioOutcome> {
    let mut outcomes = Vec::with_capacity(scenarios.len());

    for (i, scenario) in scenarios.iter().enumerate() {
        let index = i + 1;
        let title = scenario.title();
        progress.set_message(format!("{} [{}/{}] {}", kind, index, scenarios.len(), title));

        let outcome = match scenario.run(ctx).await {
            Ok(()) => {
                info!("PASS {} #{} {}", kind, index, title);
                ScenarioOutcome::new(index, title, ScenarioStatus::Passed, None)
            }
            Err(ScenarioHalt::Failed(failure)) => {
                warn!("FAIL {} #{} {}: {}", kind, index, title, failure);
                ScenarioOutcome::new(index, title, ScenarioStatus::Failed, Some(failure.to_string()))
            }
            Err(ScenarioHalt::Skipped(reason)) => {
                info!("SKIP {} #{} {}: {}", kind, index, title, reason);
                ScenarioOutcome::new(index, title, ScenarioStatus::Skipped, Some(reason.to_string()))
            }
        };

        outcomes.push(outcome);
    }

    outcomes
}

/// Delete a gist a scenario created beyond the fixture.
pub(crate) async fn discard_extra(ctx: &ScenarioContext<'_>, id: Option<&str>) {
    let Some(id) = id else { return };

    match ctx.client.delete_gist(&ctx.owner(), id).await {
        Ok(resp) if resp.status.is_success() => info!("Removed scenario gist {}", id),
        Ok(resp) => warn!("Could not remove scenario gist {}: HTTP {}", id, resp.status_code()),
        Err(err) => warn!("Could not remove scenario gist {}: {}", id, err),
    }
}
