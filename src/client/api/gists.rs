//! Gist API trait
//!
//! One method per endpoint the suites touch. Every method takes the
//! [`Identity`] to send the request as, so the same client serves both the
//! authorized and the unauthorized suite.

use async_trait::async_trait;

use crate::client::{ApiResponse, Identity};
use crate::error::Result;
use crate::payloads::Payload;

/// Gist operations for the GitHub API
#[async_trait]
pub trait GistApi: Send + Sync {
    // ========================================================================
    // Gists
    // ========================================================================

    /// `POST /gists`
    async fn create_gist(&self, identity: &Identity, payload: &Payload) -> Result<ApiResponse>;

    /// `GET /gists/{id}`
    async fn get_gist(&self, identity: &Identity, id: &str) -> Result<ApiResponse>;

    /// `GET /gists`
    ///
    /// Authenticated callers get their own gists (including secret ones);
    /// anonymous callers get recent public gists.
    async fn list_gists(&self, identity: &Identity) -> Result<ApiResponse>;

    /// `GET /gists` with OAuth app credentials as query parameters and no
    /// `Authorization` header.
    async fn list_gists_as_app(&self, client_id: &str, client_secret: &str)
    -> Result<ApiResponse>;

    /// `GET /gists/starred`
    async fn list_starred(&self, identity: &Identity) -> Result<ApiResponse>;

    /// `PATCH /gists/{id}`
    async fn update_gist(
        &self,
        identity: &Identity,
        id: &str,
        payload: &Payload,
    ) -> Result<ApiResponse>;

    /// `DELETE /gists/{id}`
    async fn delete_gist(&self, identity: &Identity, id: &str) -> Result<ApiResponse>;

    // ========================================================================
    // Stars
    // ========================================================================

    /// `PUT /gists/{id}/star`
    async fn star_gist(&self, identity: &Identity, id: &str) -> Result<ApiResponse>;

    /// `DELETE /gists/{id}/star`
    async fn unstar_gist(&self, identity: &Identity, id: &str) -> Result<ApiResponse>;

    /// `GET /gists/{id}/star`
    ///
    /// 204 when starred, 404 when not. There is no boolean body.
    async fn check_star(&self, identity: &Identity, id: &str) -> Result<ApiResponse>;

    // ========================================================================
    // Forks
    // ========================================================================

    /// `POST /gists/{id}/forks`
    async fn fork_gist(&self, identity: &Identity, id: &str) -> Result<ApiResponse>;

    /// `GET /gists/{id}/forks`
    async fn list_forks(&self, identity: &Identity, id: &str) -> Result<ApiResponse>;
}
