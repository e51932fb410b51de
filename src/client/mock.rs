//! In-memory Gist service for testing
//!
//! Implements the API traits with GitHub's observable behavior so the
//! provisioner and both suites can run end to end without the network:
//! anonymous writes get 401 (create, starred list) or 404 (update, delete,
//! star), star checks answer 204/404, and rate-limit headers report 60 or
//! 5000 depending on the caller.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::{Map, Value, json};
use tokio::sync::Mutex;

use super::api::{AuthApi, GistApi};
use super::rate_limit::{ANONYMOUS_LIMIT, AUTHENTICATED_LIMIT, HEADER_LIMIT, HEADER_REMAINING};
use super::{ApiResponse, Identity};
use crate::config::{DEFAULT_API_BASE, DEFAULT_FORK_SOURCE_FILE, DEFAULT_FORK_SOURCE_ID};
use crate::error::Result;
use crate::payloads::Payload;

/// Login of the account behind [`MOCK_TOKEN`]
pub const MOCK_USER: &str = "octocat";

/// The only bearer token the service accepts
pub const MOCK_TOKEN: &str = "ghp_mock_token";

/// base64 of `octocat:hunter2`
pub const MOCK_BASIC_CREDENTIALS: &str = "b2N0b2NhdDpodW50ZXIy";

/// OAuth app accepted by `list_gists_as_app`
pub const MOCK_CLIENT_ID: &str = "mock-client-id";
pub const MOCK_CLIENT_SECRET: &str = "mock-client-secret";

/// Owner of the seeded fork source
const OTHER_USER: &str = "gist-author";

/// A stored gist
#[derive(Debug, Clone)]
pub struct MockGist {
    pub id: String,
    pub owner: String,
    pub public: bool,
    pub description: Option<String>,
    pub files: BTreeMap<String, String>,
    pub forked_from: Option<String>,
}

#[derive(Default)]
struct State {
    /// Creation order
    gists: Vec<MockGist>,
    /// (user, gist id)
    stars: HashSet<(String, String)>,
    next_id: u64,
    calls: Vec<&'static str>,
    /// Canned responses per operation, bypassing the simulation
    overrides: HashMap<&'static str, (u16, Option<Value>)>,
}

impl State {
    fn find(&self, id: &str) -> Option<&MockGist> {
        self.gists.iter().find(|g| g.id == id)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.gists.iter().position(|g| g.id == id)
    }

    fn next_id(&mut self) -> String {
        self.next_id += 1;
        format!("{:032x}", 0xa11ce000_u64 + self.next_id)
    }
}

enum Caller {
    Anonymous,
    User(String),
    BadToken,
}

/// Mock Gist API for testing.
///
/// # Example
/// ```ignore
/// let service = MockGistService::new().fail("fork_gist", 404).await;
/// let err = SuiteFixture::provision(&service, &config, &payloads).await;
/// ```
#[derive(Clone)]
pub struct MockGistService {
    state: Arc<Mutex<State>>,
    base: String,
}

impl Default for MockGistService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGistService {
    /// Create a service seeded with the public gist that suites fork.
    pub fn new() -> Self {
        let mut state = State::default();
        state.gists.push(MockGist {
            id: DEFAULT_FORK_SOURCE_ID.to_string(),
            owner: OTHER_USER.to_string(),
            public: true,
            description: Some("Star Wars graph data".to_string()),
            files: BTreeMap::from([(
                DEFAULT_FORK_SOURCE_FILE.to_string(),
                "source,target,weight".to_string(),
            )]),
            forked_from: None,
        });

        Self {
            state: Arc::new(Mutex::new(state)),
            base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Make `operation` answer with `status` and a generic error body.
    pub async fn fail(self, operation: &'static str, status: u16) -> Self {
        self.state.lock().await.overrides.insert(
            operation,
            (status, Some(json!({ "message": "Mock failure" }))),
        );
        self
    }

    /// Make `operation` answer with `status` and a raw JSON body.
    pub async fn override_body(self, operation: &'static str, status: u16, body: &str) -> Self {
        let value = serde_json::from_str(body).ok();
        self.state
            .lock()
            .await
            .overrides
            .insert(operation, (status, value));
        self
    }

    pub fn fork_source_id(&self) -> &str {
        DEFAULT_FORK_SOURCE_ID
    }

    /// Operations called so far, in order
    pub async fn calls(&self) -> Vec<&'static str> {
        self.state.lock().await.calls.clone()
    }

    pub async fn gist(&self, id: &str) -> Option<MockGist> {
        self.state.lock().await.find(id).cloned()
    }

    pub async fn gists_owned_by(&self, user: &str) -> Vec<MockGist> {
        self.state
            .lock()
            .await
            .gists
            .iter()
            .filter(|g| g.owner == user)
            .cloned()
            .collect()
    }

    pub async fn is_starred(&self, user: &str, id: &str) -> bool {
        self.state
            .lock()
            .await
            .stars
            .contains(&(user.to_string(), id.to_string()))
    }

    /// Record the call and return a canned response if one is configured.
    fn begin(state: &mut State, operation: &'static str) -> Option<ApiResponse> {
        state.calls.push(operation);
        state
            .overrides
            .get(operation)
            .map(|(status, body)| respond(*status, AUTHENTICATED_LIMIT, body.clone()))
    }

    fn gist_json(&self, gist: &MockGist) -> Value {
        let files: Map<String, Value> = gist
            .files
            .iter()
            .map(|(name, content)| {
                (
                    name.clone(),
                    json!({
                        "filename": name,
                        "language": language_of(name),
                        "content": content,
                    }),
                )
            })
            .collect();

        json!({
            "id": gist.id,
            "url": format!("{}/gists/{}", self.base, gist.id),
            "public": gist.public,
            "description": gist.description,
            "owner": { "login": gist.owner },
            "files": files,
        })
    }

    fn list_json<'a>(&self, gists: impl Iterator<Item = &'a MockGist>) -> Value {
        Value::Array(gists.map(|g| self.gist_json(g)).collect())
    }
}

fn caller(identity: &Identity) -> Caller {
    match identity {
        Identity::Anonymous => Caller::Anonymous,
        Identity::Bearer(credential) if credential.expose() == MOCK_TOKEN => {
            Caller::User(MOCK_USER.to_string())
        }
        Identity::Bearer(_) => Caller::BadToken,
    }
}

fn limit_for(caller: &Caller) -> u32 {
    match caller {
        Caller::Anonymous => ANONYMOUS_LIMIT,
        _ => AUTHENTICATED_LIMIT,
    }
}

fn respond(status: u16, limit: u32, body: Option<Value>) -> ApiResponse {
    let mut headers = HeaderMap::new();
    headers.insert(HEADER_LIMIT, HeaderValue::from(limit));
    headers.insert(HEADER_REMAINING, HeaderValue::from(limit - 1));
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    ApiResponse::new(status, headers, body)
}

fn message(status: u16, limit: u32, text: &str) -> ApiResponse {
    respond(status, limit, Some(json!({ "message": text })))
}

fn not_found(limit: u32) -> ApiResponse {
    message(404, limit, "Not Found")
}

fn language_of(name: &str) -> Value {
    match name.rsplit('.').next() {
        Some("txt") => json!("Text"),
        Some("json") => json!("JSON"),
        Some("csv") => json!("CSV"),
        _ => Value::Null,
    }
}

/// Apply a `files` patch: `null` deletes, `filename` renames, `content`
/// replaces.
fn apply_files(files: &mut BTreeMap<String, String>, patch: &Map<String, Value>) {
    for (name, change) in patch {
        match change {
            Value::Null => {
                files.remove(name);
            }
            Value::Object(fields) => {
                let previous = files.remove(name);
                let target = fields
                    .get("filename")
                    .and_then(Value::as_str)
                    .unwrap_or(name)
                    .to_string();
                let content = fields
                    .get("content")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .or(previous)
                    .unwrap_or_default();
                files.insert(target, content);
            }
            _ => {}
        }
    }
}

#[async_trait]
impl AuthApi for MockGistService {
    async fn authorize(&self, basic_credentials: &str, payload: &Payload) -> Result<ApiResponse> {
        let mut state = self.state.lock().await;
        if let Some(resp) = Self::begin(&mut state, "authorize") {
            return Ok(resp);
        }

        if basic_credentials != MOCK_BASIC_CREDENTIALS {
            return Ok(message(401, ANONYMOUS_LIMIT, "Bad credentials"));
        }

        let scopes = payload.json().get("scopes").cloned().unwrap_or(json!([]));
        Ok(respond(
            201,
            AUTHENTICATED_LIMIT,
            Some(json!({ "token": MOCK_TOKEN, "scopes": scopes })),
        ))
    }
}

#[async_trait]
impl GistApi for MockGistService {
    async fn create_gist(&self, identity: &Identity, payload: &Payload) -> Result<ApiResponse> {
        let mut state = self.state.lock().await;
        if let Some(resp) = Self::begin(&mut state, "create_gist") {
            return Ok(resp);
        }

        let who = caller(identity);
        let user = match &who {
            Caller::User(user) => user.clone(),
            _ => return Ok(message(401, limit_for(&who), "Requires authentication")),
        };

        let body = payload.json();
        let mut files = BTreeMap::new();
        if let Some(patch) = body.get("files").and_then(Value::as_object) {
            apply_files(&mut files, patch);
        }
        if files.is_empty() {
            return Ok(message(422, AUTHENTICATED_LIMIT, "Validation Failed"));
        }

        let gist = MockGist {
            id: state.next_id(),
            owner: user,
            public: body.get("public").and_then(Value::as_bool).unwrap_or(false),
            description: body
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string),
            files,
            forked_from: None,
        };
        let json = self.gist_json(&gist);
        state.gists.push(gist);

        Ok(respond(201, AUTHENTICATED_LIMIT, Some(json)))
    }

    async fn get_gist(&self, identity: &Identity, id: &str) -> Result<ApiResponse> {
        let mut state = self.state.lock().await;
        if let Some(resp) = Self::begin(&mut state, "get_gist") {
            return Ok(resp);
        }

        let who = caller(identity);
        let limit = limit_for(&who);
        if let Caller::BadToken = who {
            return Ok(message(401, limit, "Bad credentials"));
        }

        // Secret gists are readable by anyone holding the ID
        Ok(match state.find(id) {
            Some(gist) => respond(200, limit, Some(self.gist_json(gist))),
            None => not_found(limit),
        })
    }

    async fn list_gists(&self, identity: &Identity) -> Result<ApiResponse> {
        let mut state = self.state.lock().await;
        if let Some(resp) = Self::begin(&mut state, "list_gists") {
            return Ok(resp);
        }

        let who = caller(identity);
        let limit = limit_for(&who);
        let body = match &who {
            Caller::User(user) => {
                self.list_json(state.gists.iter().rev().filter(|g| &g.owner == user))
            }
            Caller::Anonymous => self.list_json(state.gists.iter().rev().filter(|g| g.public)),
            Caller::BadToken => return Ok(message(401, limit, "Bad credentials")),
        };

        Ok(respond(200, limit, Some(body)))
    }

    async fn list_gists_as_app(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> Result<ApiResponse> {
        let mut state = self.state.lock().await;
        if let Some(resp) = Self::begin(&mut state, "list_gists_as_app") {
            return Ok(resp);
        }

        if client_id != MOCK_CLIENT_ID || client_secret != MOCK_CLIENT_SECRET {
            return Ok(message(401, ANONYMOUS_LIMIT, "Bad credentials"));
        }

        let body = self.list_json(state.gists.iter().rev().filter(|g| g.public));
        Ok(respond(200, AUTHENTICATED_LIMIT, Some(body)))
    }

    async fn list_starred(&self, identity: &Identity) -> Result<ApiResponse> {
        let mut state = self.state.lock().await;
        if let Some(resp) = Self::begin(&mut state, "list_starred") {
            return Ok(resp);
        }

        let who = caller(identity);
        let user = match &who {
            Caller::User(user) => user.clone(),
            _ => return Ok(message(401, limit_for(&who), "Requires authentication")),
        };

        let body = self.list_json(
            state
                .gists
                .iter()
                .filter(|g| state.stars.contains(&(user.clone(), g.id.clone()))),
        );
        Ok(respond(200, AUTHENTICATED_LIMIT, Some(body)))
    }

    async fn update_gist(
        &self,
        identity: &Identity,
        id: &str,
        payload: &Payload,
    ) -> Result<ApiResponse> {
        let mut state = self.state.lock().await;
        if let Some(resp) = Self::begin(&mut state, "update_gist") {
            return Ok(resp);
        }

        let who = caller(identity);
        let limit = limit_for(&who);
        let user = match who {
            Caller::User(user) => user,
            // GitHub hides other people's gists behind 404 for writes
            _ => return Ok(not_found(limit)),
        };

        let Some(index) = state.position(id).filter(|&i| state.gists[i].owner == user) else {
            return Ok(not_found(limit));
        };

        let body = payload.json();
        let gist = &mut state.gists[index];
        if let Some(description) = body.get("description").and_then(Value::as_str) {
            gist.description = Some(description.to_string());
        }
        if let Some(patch) = body.get("files").and_then(Value::as_object) {
            apply_files(&mut gist.files, patch);
        }

        let json = self.gist_json(&state.gists[index]);
        Ok(respond(200, limit, Some(json)))
    }

    async fn delete_gist(&self, identity: &Identity, id: &str) -> Result<ApiResponse> {
        let mut state = self.state.lock().await;
        if let Some(resp) = Self::begin(&mut state, "delete_gist") {
            return Ok(resp);
        }

        let who = caller(identity);
        let limit = limit_for(&who);
        let Caller::User(user) = who else {
            return Ok(not_found(limit));
        };

        let Some(index) = state.position(id).filter(|&i| state.gists[i].owner == user) else {
            return Ok(not_found(limit));
        };

        state.gists.remove(index);
        state.stars.retain(|(_, starred)| starred != id);
        Ok(respond(204, limit, None))
    }

    async fn star_gist(&self, identity: &Identity, id: &str) -> Result<ApiResponse> {
        let mut state = self.state.lock().await;
        if let Some(resp) = Self::begin(&mut state, "star_gist") {
            return Ok(resp);
        }

        let who = caller(identity);
        let limit = limit_for(&who);
        let Caller::User(user) = who else {
            return Ok(not_found(limit));
        };
        if state.find(id).is_none() {
            return Ok(not_found(limit));
        }

        state.stars.insert((user, id.to_string()));
        Ok(respond(204, limit, None))
    }

    async fn unstar_gist(&self, identity: &Identity, id: &str) -> Result<ApiResponse> {
        let mut state = self.state.lock().await;
        if let Some(resp) = Self::begin(&mut state, "unstar_gist") {
            return Ok(resp);
        }

        let who = caller(identity);
        let limit = limit_for(&who);
        let Caller::User(user) = who else {
            return Ok(not_found(limit));
        };
        if state.find(id).is_none() {
            return Ok(not_found(limit));
        }

        state.stars.remove(&(user, id.to_string()));
        Ok(respond(204, limit, None))
    }

    async fn check_star(&self, identity: &Identity, id: &str) -> Result<ApiResponse> {
        let mut state = self.state.lock().await;
        if let Some(resp) = Self::begin(&mut state, "check_star") {
            return Ok(resp);
        }

        let who = caller(identity);
        let limit = limit_for(&who);
        let Caller::User(user) = who else {
            return Ok(not_found(limit));
        };

        if state.stars.contains(&(user, id.to_string())) {
            Ok(respond(204, limit, None))
        } else {
            Ok(not_found(limit))
        }
    }

    async fn fork_gist(&self, identity: &Identity, id: &str) -> Result<ApiResponse> {
        let mut state = self.state.lock().await;
        if let Some(resp) = Self::begin(&mut state, "fork_gist") {
            return Ok(resp);
        }

        let who = caller(identity);
        let limit = limit_for(&who);
        let user = match who {
            Caller::User(user) => user,
            _ => return Ok(message(401, limit, "Requires authentication")),
        };

        let Some(source) = state.find(id).cloned() else {
            return Ok(not_found(limit));
        };

        // Forking again hands back the existing fork
        if let Some(existing) = state
            .gists
            .iter()
            .find(|g| g.owner == user && g.forked_from.as_deref() == Some(id))
        {
            return Ok(respond(201, limit, Some(self.gist_json(existing))));
        }

        let fork = MockGist {
            id: state.next_id(),
            owner: user,
            public: source.public,
            description: source.description.clone(),
            files: source.files.clone(),
            forked_from: Some(source.id.clone()),
        };
        let json = self.gist_json(&fork);
        state.gists.push(fork);

        Ok(respond(201, limit, Some(json)))
    }

    async fn list_forks(&self, identity: &Identity, id: &str) -> Result<ApiResponse> {
        let mut state = self.state.lock().await;
        if let Some(resp) = Self::begin(&mut state, "list_forks") {
            return Ok(resp);
        }

        let limit = limit_for(&caller(identity));
        if state.find(id).is_none() {
            return Ok(not_found(limit));
        }

        let forks: Vec<Value> = state
            .gists
            .iter()
            .filter(|g| g.forked_from.as_deref() == Some(id))
            .map(|g| {
                json!({
                    "id": g.id,
                    "url": format!("{}/gists/{}", self.base, g.id),
                    "owner": { "login": g.owner },
                })
            })
            .collect();

        Ok(respond(200, limit, Some(Value::Array(forks))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Credential;
    use crate::payloads::PayloadKind;
    use std::path::Path;

    fn payload(kind: PayloadKind, raw: &str) -> Payload {
        Payload::parse(kind, raw.to_string(), Path::new("inline.json")).unwrap()
    }

    fn owner() -> Identity {
        Identity::Bearer(Credential::new(MOCK_TOKEN))
    }

    async fn create(service: &MockGistService, public: bool) -> String {
        let raw = format!(
            r#"{{"public":{},"files":{{"a.txt":{{"content":"hello"}}}}}}"#,
            public
        );
        let resp = service
            .create_gist(&owner(), &payload(PayloadKind::CreatePublicGist, &raw))
            .await
            .unwrap();
        resp.str_field("id").unwrap().to_string()
    }

    #[tokio::test]
    async fn test_star_transitions() {
        let service = MockGistService::new();
        let id = create(&service, true).await;

        let check = |service: &MockGistService| {
            let service = service.clone();
            let id = id.clone();
            async move { service.check_star(&owner(), &id).await.unwrap().status_code() }
        };

        assert_eq!(check(&service).await, 404);
        assert_eq!(service.star_gist(&owner(), &id).await.unwrap().status_code(), 204);
        assert_eq!(check(&service).await, 204);
        assert_eq!(service.unstar_gist(&owner(), &id).await.unwrap().status_code(), 204);
        assert_eq!(check(&service).await, 404);
    }

    #[tokio::test]
    async fn test_anonymous_write_statuses() {
        let service = MockGistService::new();
        let id = create(&service, true).await;
        let anon = Identity::Anonymous;
        let update = payload(PayloadKind::UpdatePublicGist, r#"{"files":{}}"#);

        let status = service
            .create_gist(&anon, &update)
            .await
            .unwrap()
            .status_code();
        assert_eq!(status, 401);
        assert_eq!(service.list_starred(&anon).await.unwrap().status_code(), 401);
        assert_eq!(
            service.update_gist(&anon, &id, &update).await.unwrap().status_code(),
            404
        );
        assert_eq!(service.delete_gist(&anon, &id).await.unwrap().status_code(), 404);
        assert_eq!(service.star_gist(&anon, &id).await.unwrap().status_code(), 404);
    }

    #[tokio::test]
    async fn test_rate_limit_headers_follow_caller() {
        let service = MockGistService::new();

        let anon = service.list_gists(&Identity::Anonymous).await.unwrap();
        assert_eq!(anon.header("x-ratelimit-limit"), Some("60"));

        let authed = service.list_gists(&owner()).await.unwrap();
        assert_eq!(authed.header("x-ratelimit-limit"), Some("5000"));

        let app = service
            .list_gists_as_app(MOCK_CLIENT_ID, MOCK_CLIENT_SECRET)
            .await
            .unwrap();
        assert_eq!(app.header("x-ratelimit-limit"), Some("5000"));
    }

    #[tokio::test]
    async fn test_anonymous_listing_hides_secret_gists() {
        let service = MockGistService::new();
        let secret = create(&service, false).await;

        let anon = service.list_gists(&Identity::Anonymous).await.unwrap();
        let ids: Vec<&str> = anon
            .body
            .as_ref()
            .and_then(Value::as_array)
            .unwrap()
            .iter()
            .filter_map(|g| g["id"].as_str())
            .collect();
        assert!(!ids.contains(&secret.as_str()));

        let mine = service.list_gists(&owner()).await.unwrap();
        assert_eq!(mine.lookup(&["0", "id"]), Some(&json!(secret)));
    }

    #[tokio::test]
    async fn test_update_renames_and_deletes_files() {
        let service = MockGistService::new();
        let id = create(&service, true).await;

        let rename = payload(
            PayloadKind::UpdatePublicGist,
            r#"{"files":{"a.txt":{"filename":"b.json","content":"new"}}}"#,
        );
        let resp = service.update_gist(&owner(), &id, &rename).await.unwrap();
        assert_eq!(resp.lookup(&["files", "b.json", "content"]), Some(&json!("new")));
        assert_eq!(resp.lookup(&["files", "b.json", "language"]), Some(&json!("JSON")));
        assert!(resp.lookup(&["files", "a.txt"]).is_none());

        let delete = payload(PayloadKind::DeleteGistFile, r#"{"files":{"b.json":null}}"#);
        service.update_gist(&owner(), &id, &delete).await.unwrap();
        assert!(service.gist(&id).await.unwrap().files.is_empty());
    }

    #[tokio::test]
    async fn test_repeat_fork_returns_existing() {
        let service = MockGistService::new();
        let source = service.fork_source_id().to_string();

        let first = service.fork_gist(&owner(), &source).await.unwrap();
        let second = service.fork_gist(&owner(), &source).await.unwrap();
        assert_eq!(first.status_code(), 201);
        assert_eq!(first.str_field("id"), second.str_field("id"));

        let forks = service.list_forks(&Identity::Anonymous, &source).await.unwrap();
        assert_eq!(forks.lookup(&["0", "id"]).and_then(Value::as_str), first.str_field("id"));
    }

    #[tokio::test]
    async fn test_overrides_bypass_simulation() {
        let service = MockGistService::new().fail("get_gist", 500).await;
        let resp = service.get_gist(&owner(), "anything").await.unwrap();
        assert_eq!(resp.status_code(), 500);
        assert_eq!(service.calls().await, vec!["get_gist"]);
    }
}
