//! Response assertions
//!
//! Each check returns `&Self` on success so checks chain with `?`:
//!
//! ```ignore
//! call("read public gist", client.get_gist(&owner, id))
//!     .await?
//!     .status(200)?
//!     .field(&["files", "a.txt", "content"], json!("hello"))?;
//! ```

use std::future::Future;

use serde_json::Value;

use crate::client::ApiResponse;
use crate::error::{CheckFailure, Result};

/// A response tagged with the scenario step that produced it
#[derive(Debug)]
pub struct Expect {
    step: String,
    response: ApiResponse,
}

/// Await an API call, turning a transport error into a check failure.
pub async fn call<F>(step: &str, request: F) -> std::result::Result<Expect, CheckFailure>
where
    F: Future<Output = Result<ApiResponse>>,
{
    match request.await {
        Ok(response) => Ok(Expect {
            step: step.to_string(),
            response,
        }),
        Err(err) => Err(CheckFailure::new(step, "a response", err.to_string())),
    }
}

impl Expect {
    /// Top-level `id` of the returned gist
    pub fn id(&self) -> Option<&str> {
        self.response.str_field("id")
    }

    fn fail(&self, expected: impl Into<String>, actual: impl Into<String>) -> CheckFailure {
        CheckFailure::new(self.step.clone(), expected, actual)
    }

    /// Exact status code
    pub fn status(&self, code: u16) -> std::result::Result<&Self, CheckFailure> {
        let actual = self.response.status_code();
        if actual == code {
            return Ok(self);
        }

        let detail = match self.response.str_field("message") {
            Some(message) => format!("HTTP {} ({})", actual, message),
            None => format!("HTTP {}", actual),
        };
        Err(self.fail(format!("HTTP {}", code), detail))
    }

    /// Value at `path` equals `expected`
    pub fn field(&self, path: &[&str], expected: Value) -> std::result::Result<&Self, CheckFailure> {
        match self.response.lookup(path) {
            Some(actual) if *actual == expected => Ok(self),
            Some(actual) => Err(self.fail(
                format!("{} = {}", path.join("."), expected),
                actual.to_string(),
            )),
            None => Err(self.fail(format!("{} = {}", path.join("."), expected), "nothing")),
        }
    }

    /// Value at `path` is missing or `null`
    pub fn field_absent(&self, path: &[&str]) -> std::result::Result<&Self, CheckFailure> {
        match self.response.lookup(path) {
            None | Some(Value::Null) => Ok(self),
            Some(actual) => Err(self.fail(
                format!("no {}", path.join(".")),
                actual.to_string(),
            )),
        }
    }

    /// Header `name` has exactly `expected` as its value
    pub fn header(&self, name: &str, expected: &str) -> std::result::Result<&Self, CheckFailure> {
        match self.response.header(name) {
            Some(actual) if actual == expected => Ok(self),
            Some(actual) => Err(self.fail(format!("{}: {}", name, expected), actual)),
            None => Err(self.fail(format!("{}: {}", name, expected), "no such header")),
        }
    }

    /// Index of the array element whose `id` is `id`
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.response
            .body
            .as_ref()?
            .as_array()?
            .iter()
            .position(|item| item.get("id").and_then(Value::as_str) == Some(id))
    }

    /// The body is an array containing an element with this `id`
    pub fn contains_id(&self, id: &str) -> std::result::Result<usize, CheckFailure> {
        self.position_of(id)
            .ok_or_else(|| self.fail(format!("an entry with id {}", id), "none"))
    }

    /// The body does not contain an element with this `id`
    pub fn lacks_id(&self, id: &str) -> std::result::Result<&Self, CheckFailure> {
        match self.position_of(id) {
            None => Ok(self),
            Some(index) => Err(self.fail(
                format!("no entry with id {}", id),
                format!("entry at index {}", index),
            )),
        }
    }
}
