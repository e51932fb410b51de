//! Shared CLI argument types

mod common;
mod global;

pub use common::{OutputFormat, SuiteSelection};
pub use global::GlobalOptions;
