//! Authorization API trait

use async_trait::async_trait;

use crate::client::ApiResponse;
use crate::error::Result;
use crate::payloads::Payload;

/// Authorization operations for the GitHub API
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// POST the scope request to the authorization endpoint using HTTP Basic
    /// auth. `basic_credentials` is base64 `username:password`.
    async fn authorize(&self, basic_credentials: &str, payload: &Payload) -> Result<ApiResponse>;
}
