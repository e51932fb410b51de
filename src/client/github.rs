//! GitHub API client implementation

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap};
use reqwest::{Client as HttpClient, Method, RequestBuilder};

use super::{ApiResponse, AuthApi, GistApi, Identity, RateLimitInfo, RequestPacer};
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::payloads::Payload;

/// Media type GitHub recommends for REST calls
const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";

/// GitHub rejects requests without a user agent
const CLIENT_USER_AGENT: &str = concat!("gistcheck/", env!("CARGO_PKG_VERSION"));

/// Warn once the remaining GitHub quota drops below this
const LOW_QUOTA: u32 = 10;

/// GitHub Gist API client
pub struct GitHubClient {
    http: HttpClient,
    gists_url: String,
    auth_url: String,
    pacer: RequestPacer,
}

impl GitHubClient {
    /// Create a client for the API described by `config`
    pub fn new(config: &Config) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(CLIENT_USER_AGENT)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let pacer = RequestPacer::per_second(config.requests_per_second);
        debug!("Client for {} paced at {}/s", config.api_base, pacer.rate());

        Ok(Self {
            http,
            gists_url: config.gists_url(),
            auth_url: config.auth_url(),
            pacer,
        })
    }

    /// Build a request against the gists collection.
    ///
    /// `path` is relative to `/gists` and starts with `/` when non-empty.
    fn gists_request(&self, method: Method, path: &str, identity: &Identity) -> RequestBuilder {
        let url = format!("{}{}", self.gists_url, path);
        let builder = self
            .http
            .request(method, url)
            .header(ACCEPT, GITHUB_MEDIA_TYPE);

        match identity {
            Identity::Anonymous => builder,
            Identity::Bearer(credential) => builder.bearer_auth(credential.expose()),
        }
    }

    /// Attach a fixture payload verbatim as a JSON body
    fn with_payload(builder: RequestBuilder, payload: &Payload) -> RequestBuilder {
        debug!("Attaching payload {}", payload.kind().file_name());
        builder
            .header(CONTENT_TYPE, "application/json")
            .body(payload.raw().to_string())
    }

    /// Send a request and capture status, headers and body.
    async fn send(&self, builder: RequestBuilder) -> Result<ApiResponse> {
        self.pacer.until_ready().await;

        let request = builder.build().map_err(ApiError::from)?;
        let method = request.method().clone();
        let url = request.url().clone();

        let response = self.http.execute(request).await.map_err(ApiError::from)?;

        let status = response.status();
        let headers = response.headers().clone();
        let text = response.text().await.map_err(ApiError::from)?;

        debug!("{} {} -> {}", method, redact_query(&url), status);

        if let Some(message) = quota_warning(&headers) {
            warn!("{}", message);
        }

        let body = if text.trim().is_empty() {
            None
        } else {
            match serde_json::from_str(&text) {
                Ok(value) => Some(value),
                Err(e) => {
                    debug!("Response body is not JSON: {}", e);
                    None
                }
            }
        };

        Ok(ApiResponse::new(status, headers, body))
    }
}

/// Warning text when the rate-limit headers show fewer than `LOW_QUOTA`
/// calls left.
fn quota_warning(headers: &HeaderMap) -> Option<String> {
    let quota = RateLimitInfo::from_headers(headers)?;
    let left = quota.remaining.filter(|left| *left < LOW_QUOTA)?;
    Some(format!(
        "GitHub {} quota nearly exhausted: {} of {} left (resets {})",
        if quota.is_authenticated() { "authenticated" } else { "anonymous" },
        left,
        quota.limit,
        quota
            .reset_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "unknown".to_string())
    ))
}

/// Strip the query string from a URL before logging it; it may carry the
/// OAuth client secret.
fn redact_query(url: &reqwest::Url) -> String {
    let mut url = url.clone();
    if url.query().is_some() {
        url.set_query(Some("redacted"));
    }
    url.to_string()
}

#[async_trait]
impl AuthApi for GitHubClient {
    async fn authorize(&self, basic_credentials: &str, payload: &Payload) -> Result<ApiResponse> {
        let builder = self
            .http
            .post(&self.auth_url)
            .header(ACCEPT, GITHUB_MEDIA_TYPE)
            .header(AUTHORIZATION, format!("Basic {}", basic_credentials));

        self.send(Self::with_payload(builder, payload)).await
    }
}

#[async_trait]
impl GistApi for GitHubClient {
    async fn create_gist(&self, identity: &Identity, payload: &Payload) -> Result<ApiResponse> {
        let builder = self.gists_request(Method::POST, "", identity);
        self.send(Self::with_payload(builder, payload)).await
    }

    async fn get_gist(&self, identity: &Identity, id: &str) -> Result<ApiResponse> {
        let path = format!("/{}", id);
        self.send(self.gists_request(Method::GET, &path, identity))
            .await
    }

    async fn list_gists(&self, identity: &Identity) -> Result<ApiResponse> {
        self.send(self.gists_request(Method::GET, "", identity)).await
    }

    async fn list_gists_as_app(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> Result<ApiResponse> {
        let builder = self
            .gists_request(Method::GET, "", &Identity::Anonymous)
            .query(&[("client_id", client_id), ("client_secret", client_secret)]);
        self.send(builder).await
    }

    async fn list_starred(&self, identity: &Identity) -> Result<ApiResponse> {
        self.send(self.gists_request(Method::GET, "/starred", identity))
            .await
    }

    async fn update_gist(
        &self,
        identity: &Identity,
        id: &str,
        payload: &Payload,
    ) -> Result<ApiResponse> {
        let path = format!("/{}", id);
        let builder = self.gists_request(Method::PATCH, &path, identity);
        self.send(Self::with_payload(builder, payload)).await
    }

    async fn delete_gist(&self, identity: &Identity, id: &str) -> Result<ApiResponse> {
        let path = format!("/{}", id);
        self.send(self.gists_request(Method::DELETE, &path, identity))
            .await
    }

    async fn star_gist(&self, identity: &Identity, id: &str) -> Result<ApiResponse> {
        let path = format!("/{}/star", id);
        // GitHub wants an explicit zero-length body on PUT
        let builder = self.gists_request(Method::PUT, &path, identity).body("");
        self.send(builder).await
    }

    async fn unstar_gist(&self, identity: &Identity, id: &str) -> Result<ApiResponse> {
        let path = format!("/{}/star", id);
        self.send(self.gists_request(Method::DELETE, &path, identity))
            .await
    }

    async fn check_star(&self, identity: &Identity, id: &str) -> Result<ApiResponse> {
        let path = format!("/{}/star", id);
        self.send(self.gists_request(Method::GET, &path, identity))
            .await
    }

    async fn fork_gist(&self, identity: &Identity, id: &str) -> Result<ApiResponse> {
        let path = format!("/{}/forks", id);
        self.send(self.gists_request(Method::POST, &path, identity))
            .await
    }

    async fn list_forks(&self, identity: &Identity, id: &str) -> Result<ApiResponse> {
        let path = format!("/{}/forks", id);
        self.send(self.gists_request(Method::GET, &path, identity))
            .await
    }
}
