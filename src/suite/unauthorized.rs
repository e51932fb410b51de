//! Scenarios run without credentials
//!
//! GitHub answers anonymous writes to an existing gist with 404 rather than
//! 401, so as not to leak which gists exist. Creating a gist or listing stars
//! has no such target and yields 401. Both are asserted exactly.

use async_trait::async_trait;
use serde_json::json;

use super::expect::call;
use super::{
    CONTENT, PUBLIC_FILE, SECRET_FILE, Scenario, ScenarioContext, ScenarioResult, TEXT_LANGUAGE,
};
use crate::client::Identity;
use crate::client::rate_limit::ANONYMOUS_LIMIT;
use crate::payloads::PayloadKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnauthorizedScenario {
    CreateGist,
    ReadPublicGist,
    ListStarred,
    UpdatePublicGist,
    DeletePublicGist,
    ListPublicGists,
    StarPublicGist,
    ListForks,
    AnonymousRateLimit,
}

impl UnauthorizedScenario {
    /// Every scenario, in run order
    pub const ALL: [UnauthorizedScenario; 9] = [
        UnauthorizedScenario::CreateGist,
        UnauthorizedScenario::ReadPublicGist,
        UnauthorizedScenario::ListStarred,
        UnauthorizedScenario::UpdatePublicGist,
        UnauthorizedScenario::DeletePublicGist,
        UnauthorizedScenario::ListPublicGists,
        UnauthorizedScenario::StarPublicGist,
        UnauthorizedScenario::ListForks,
        UnauthorizedScenario::AnonymousRateLimit,
    ];
}

#[async_trait]
impl Scenario for UnauthorizedScenario {
    fn title(&self) -> &'static str {
        match self {
            UnauthorizedScenario::CreateGist => "create gist anonymously",
            UnauthorizedScenario::ReadPublicGist => "read public gist anonymously",
            UnauthorizedScenario::ListStarred => "list starred anonymously",
            UnauthorizedScenario::UpdatePublicGist => "update public gist anonymously",
            UnauthorizedScenario::DeletePublicGist => "delete public gist anonymously",
            UnauthorizedScenario::ListPublicGists => "list public gists anonymously",
            UnauthorizedScenario::StarPublicGist => "star public gist anonymously",
            UnauthorizedScenario::ListForks => "list forks",
            UnauthorizedScenario::AnonymousRateLimit => "anonymous rate limit",
        }
    }

    async fn run(&self, ctx: &ScenarioContext<'_>) -> ScenarioResult {
        let anonymous = Identity::Anonymous;
        let public_id = ctx.fixture.public_gist_id();

        match self {
            UnauthorizedScenario::CreateGist => {
                call(
                    "create gist",
                    ctx.client
                        .create_gist(&anonymous, ctx.payload(PayloadKind::CreatePublicGist)),
                )
                .await?
                .status(401)?;
            }
            UnauthorizedScenario::ReadPublicGist => {
                call("read public gist", ctx.client.get_gist(&anonymous, public_id))
                    .await?
                    .status(200)?
                    .field(&["files", PUBLIC_FILE, "filename"], json!(PUBLIC_FILE))?
                    .field(&["files", PUBLIC_FILE, "language"], json!(TEXT_LANGUAGE))?
                    .field(&["files", PUBLIC_FILE, "content"], json!(CONTENT))?;
            }
            UnauthorizedScenario::ListStarred => {
                call("list starred gists", ctx.client.list_starred(&anonymous))
                    .await?
                    .status(401)?;
            }
            UnauthorizedScenario::UpdatePublicGist => {
                call(
                    "update public gist",
                    ctx.client.update_gist(
                        &anonymous,
                        public_id,
                        ctx.payload(PayloadKind::UpdateSecretGist),
                    ),
                )
                .await?
                .status(404)?;
            }
            UnauthorizedScenario::DeletePublicGist => {
                call("delete public gist", ctx.client.delete_gist(&anonymous, public_id))
                    .await?
                    .status(404)?;
            }
            UnauthorizedScenario::ListPublicGists => {
                call("list public gists", ctx.client.list_gists(&anonymous))
                    .await?
                    .status(200)?
                    .field_absent(&["0", "files", SECRET_FILE])?
                    .lacks_id(ctx.fixture.secret_gist_id())?;
            }
            UnauthorizedScenario::StarPublicGist => {
                call("star public gist", ctx.client.star_gist(&anonymous, public_id))
                    .await?
                    .status(404)?;
            }
            UnauthorizedScenario::ListForks => {
                // Listing forks is done with the credential
                call(
                    "list forks",
                    ctx.client
                        .list_forks(&ctx.owner(), &ctx.config.fork_source_id),
                )
                .await?
                .status(200)?
                .field(&["0", "id"], json!(ctx.fixture.forked_gist_id()))?;
            }
            UnauthorizedScenario::AnonymousRateLimit => {
                call("list gists anonymously", ctx.client.list_gists(&anonymous))
                    .await?
                    .status(200)?
                    .header("X-RateLimit-Limit", &ANONYMOUS_LIMIT.to_string())?;
            }
        }

        Ok(())
    }
}
