//! Scenarios run as the fixture owner

use async_trait::async_trait;
use serde_json::json;

use super::expect::{Expect, call};
use super::{
    ADDED_FILE, CONTENT, PUBLIC_FILE, SECRET_FILE, Scenario, ScenarioContext, ScenarioHalt,
    ScenarioResult, TEXT_LANGUAGE, UPDATED_CONTENT, UPDATED_PUBLIC_FILE, UPDATED_SECRET_FILE,
    discard_extra,
};
use crate::client::rate_limit::AUTHENTICATED_LIMIT;
use crate::error::CheckFailure;
use crate::payloads::PayloadKind;

const RATE_LIMIT_HEADER: &str = "X-RateLimit-Limit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizedScenario {
    CreatePublicGist,
    CreateSecretGist,
    ReadPublicGist,
    ReadSecretGist,
    ListOwnGists,
    StarPublicGist,
    StarSecretGist,
    UpdatePublicGist,
    UpdateSecretGist,
    AddGistFile,
    DeleteGistFile,
    DeletePublicGist,
    DeleteSecretGist,
    ForkGist,
    ListForks,
    AuthenticatedRateLimit,
    AppRateLimit,
}

impl AuthorizedScenario {
    /// Every scenario, in run order
    pub const ALL: [AuthorizedScenario; 17] = [
        AuthorizedScenario::CreatePublicGist,
        AuthorizedScenario::CreateSecretGist,
        AuthorizedScenario::ReadPublicGist,
        AuthorizedScenario::ReadSecretGist,
        AuthorizedScenario::ListOwnGists,
        AuthorizedScenario::StarPublicGist,
        AuthorizedScenario::StarSecretGist,
        AuthorizedScenario::UpdatePublicGist,
        AuthorizedScenario::UpdateSecretGist,
        AuthorizedScenario::AddGistFile,
        AuthorizedScenario::DeleteGistFile,
        AuthorizedScenario::DeletePublicGist,
        AuthorizedScenario::DeleteSecretGist,
        AuthorizedScenario::ForkGist,
        AuthorizedScenario::ListForks,
        AuthorizedScenario::AuthenticatedRateLimit,
        AuthorizedScenario::AppRateLimit,
    ];
}

#[async_trait]
impl Scenario for AuthorizedScenario {
    fn title(&self) -> &'static str {
        match self {
            AuthorizedScenario::CreatePublicGist => "create public gist",
            AuthorizedScenario::CreateSecretGist => "create secret gist",
            AuthorizedScenario::ReadPublicGist => "read public gist",
            AuthorizedScenario::ReadSecretGist => "read secret gist",
            AuthorizedScenario::ListOwnGists => "list own gists",
            AuthorizedScenario::StarPublicGist => "star public gist",
            AuthorizedScenario::StarSecretGist => "star secret gist",
            AuthorizedScenario::UpdatePublicGist => "update public gist",
            AuthorizedScenario::UpdateSecretGist => "update secret gist",
            AuthorizedScenario::AddGistFile => "add file to gist",
            AuthorizedScenario::DeleteGistFile => "delete file from gist",
            AuthorizedScenario::DeletePublicGist => "delete public gist",
            AuthorizedScenario::DeleteSecretGist => "delete secret gist",
            AuthorizedScenario::ForkGist => "fork gist",
            AuthorizedScenario::ListForks => "list forks",
            AuthorizedScenario::AuthenticatedRateLimit => "authenticated rate limit",
            AuthorizedScenario::AppRateLimit => "app credentials rate limit",
        }
    }

    async fn run(&self, ctx: &ScenarioContext<'_>) -> ScenarioResult {
        let owner = ctx.owner();
        let public_id = ctx.fixture.public_gist_id();
        let secret_id = ctx.fixture.secret_gist_id();

        match self {
            AuthorizedScenario::CreatePublicGist => {
                let created = call(
                    "create public gist",
                    ctx.client
                        .create_gist(&owner, ctx.payload(PayloadKind::CreatePublicGist)),
                )
                .await?;
                let checked = check_new_gist(&created, PUBLIC_FILE, true);
                discard_extra(ctx, created.id()).await;
                checked?;
            }
            AuthorizedScenario::CreateSecretGist => {
                let created = call(
                    "create secret gist",
                    ctx.client
                        .create_gist(&owner, ctx.payload(PayloadKind::CreateSecretGist)),
                )
                .await?;
                let checked = check_new_gist(&created, SECRET_FILE, false);
                discard_extra(ctx, created.id()).await;
                checked?;
            }
            AuthorizedScenario::ReadPublicGist => {
                call("read public gist", ctx.client.get_gist(&owner, public_id))
                    .await?
                    .status(200)?
                    .field(&["files", PUBLIC_FILE, "filename"], json!(PUBLIC_FILE))?
                    .field(&["files", PUBLIC_FILE, "language"], json!(TEXT_LANGUAGE))?
                    .field(&["files", PUBLIC_FILE, "content"], json!(CONTENT))?;
            }
            AuthorizedScenario::ReadSecretGist => {
                call("read secret gist", ctx.client.get_gist(&owner, secret_id))
                    .await?
                    .status(200)?
                    .field(&["files", SECRET_FILE, "filename"], json!(SECRET_FILE))?
                    .field(&["files", SECRET_FILE, "language"], json!(TEXT_LANGUAGE))?
                    .field(&["files", SECRET_FILE, "content"], json!(CONTENT))?
                    .field(&["id"], json!(secret_id))?;
            }
            AuthorizedScenario::ListOwnGists => {
                let listed = call("list own gists", ctx.client.list_gists(&owner)).await?;
                listed.status(200)?;

                // The fork made during setup is newer, so locate the entry by id
                let index = listed.contains_id(secret_id)?.to_string();
                listed
                    .field(
                        &entry_path(&index, &["files", SECRET_FILE, "filename"]),
                        json!(SECRET_FILE),
                    )?
                    .field(
                        &entry_path(&index, &["files", SECRET_FILE, "language"]),
                        json!(TEXT_LANGUAGE),
                    )?
                    .field(&entry_path(&index, &["public"]), json!(false))?;
            }
            AuthorizedScenario::StarPublicGist => star_lifecycle(ctx, public_id, "public").await?,
            AuthorizedScenario::StarSecretGist => star_lifecycle(ctx, secret_id, "secret").await?,
            AuthorizedScenario::UpdatePublicGist => {
                call(
                    "update public gist",
                    ctx.client.update_gist(
                        &owner,
                        public_id,
                        ctx.payload(PayloadKind::UpdatePublicGist),
                    ),
                )
                .await?
                .status(200)?
                .field(&["url"], json!(ctx.config.gist_url(public_id)))?
                .field(
                    &["files", UPDATED_PUBLIC_FILE, "filename"],
                    json!(UPDATED_PUBLIC_FILE),
                )?
                .field(
                    &["files", UPDATED_PUBLIC_FILE, "content"],
                    json!(UPDATED_CONTENT),
                )?;
            }
            AuthorizedScenario::UpdateSecretGist => {
                call(
                    "update secret gist",
                    ctx.client.update_gist(
                        &owner,
                        secret_id,
                        ctx.payload(PayloadKind::UpdateSecretGist),
                    ),
                )
                .await?
                .status(200)?
                .field(&["url"], json!(ctx.config.gist_url(secret_id)))?
                .field(
                    &["files", UPDATED_SECRET_FILE, "filename"],
                    json!(UPDATED_SECRET_FILE),
                )?
                .field(
                    &["files", UPDATED_SECRET_FILE, "content"],
                    json!(UPDATED_CONTENT),
                )?;
            }
            AuthorizedScenario::AddGistFile => {
                call(
                    "add file to public gist",
                    ctx.client.update_gist(
                        &owner,
                        public_id,
                        ctx.payload(PayloadKind::CreateNewGistFile),
                    ),
                )
                .await?
                .status(200)?
                .field(&["url"], json!(ctx.config.gist_url(public_id)))?
                .field(&["files", ADDED_FILE, "filename"], json!(ADDED_FILE))?
                .field(&["files", ADDED_FILE, "content"], json!(CONTENT))?;
            }
            AuthorizedScenario::DeleteGistFile => {
                call(
                    "delete file from public gist",
                    ctx.client.update_gist(
                        &owner,
                        public_id,
                        ctx.payload(PayloadKind::DeleteGistFile),
                    ),
                )
                .await?
                .status(200)?
                .field_absent(&["files", ADDED_FILE])?;
            }
            AuthorizedScenario::DeletePublicGist => {
                call("delete public gist", ctx.client.delete_gist(&owner, public_id))
                    .await?
                    .status(204)?;
            }
            AuthorizedScenario::DeleteSecretGist => {
                call("delete secret gist", ctx.client.delete_gist(&owner, secret_id))
                    .await?
                    .status(204)?;
            }
            AuthorizedScenario::ForkGist => {
                let forked = call(
                    "fork gist",
                    ctx.client.fork_gist(&owner, &ctx.config.fork_source_id),
                )
                .await?;
                let file = ctx.config.fork_source_file.as_str();
                let checked = forked
                    .status(201)
                    .and_then(|f| f.field(&["files", file, "filename"], json!(file)))
                    .and_then(|f| f.field(&["public"], json!(true)))
                    .map(|_| ());

                // A repeat fork normally returns the fixture's fork
                let extra = forked
                    .id()
                    .filter(|id| *id != ctx.fixture.forked_gist_id());
                discard_extra(ctx, extra).await;
                checked?;
            }
            AuthorizedScenario::ListForks => {
                call(
                    "list forks",
                    ctx.client.list_forks(&owner, &ctx.config.fork_source_id),
                )
                .await?
                .status(200)?
                .field(&["0", "id"], json!(ctx.fixture.forked_gist_id()))?;
            }
            AuthorizedScenario::AuthenticatedRateLimit => {
                call("list gists with credential", ctx.client.list_gists(&owner))
                    .await?
                    .status(200)?
                    .header(RATE_LIMIT_HEADER, &AUTHENTICATED_LIMIT.to_string())?;
            }
            AuthorizedScenario::AppRateLimit => {
                let Some((client_id, client_secret)) = ctx.config.app_credentials() else {
                    return Err(ScenarioHalt::Skipped(
                        "client_id and client_secret are not configured",
                    ));
                };
                call(
                    "list gists with app credentials",
                    ctx.client.list_gists_as_app(client_id, client_secret),
                )
                .await?
                .status(200)?
                .header(RATE_LIMIT_HEADER, &AUTHENTICATED_LIMIT.to_string())?;
            }
        }

        Ok(())
    }
}

fn entry_path<'a>(index: &'a str, rest: &[&'a str]) -> Vec<&'a str> {
    std::iter::once(index).chain(rest.iter().copied()).collect()
}

fn check_new_gist(created: &Expect, file: &str, public: bool) -> Result<(), CheckFailure> {
    created
        .status(201)?
        .field(&["files", file, "filename"], json!(file))?
        .field(&["files", file, "content"], json!(CONTENT))?
        .field(&["public"], json!(public))?;
    Ok(())
}

/// star 204, check 204, unstar 204, check 404
async fn star_lifecycle(ctx: &ScenarioContext<'_>, id: &str, label: &str) -> ScenarioResult {
    let owner = ctx.owner();

    call(&format!("star {} gist", label), ctx.client.star_gist(&owner, id))
        .await?
        .status(204)?;
    call(
        &format!("check starred {} gist", label),
        ctx.client.check_star(&owner, id),
    )
    .await?
    .status(204)?;
    call(
        &format!("unstar {} gist", label),
        ctx.client.unstar_gist(&owner, id),
    )
    .await?
    .status(204)?;
    call(
        &format!("check unstarred {} gist", label),
        ctx.client.check_star(&owner, id),
    )
    .await?
    .status(404)?;

    Ok(())
}
