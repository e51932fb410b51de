//! API trait definitions split by responsibility
//!
//! - [`AuthApi`] - Exchanging basic credentials for a bearer token
//! - [`GistApi`] - Gist CRUD, stars and forks
//!
//! [`GitHubApi`](super::GitHubApi) combines both.

mod auth;
mod gists;

pub use auth::AuthApi;
pub use gists::GistApi;
