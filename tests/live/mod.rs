//! Harness for running gistcheck against api.github.com

use std::env;
use std::path::PathBuf;
use std::process::Command;

#[allow(unused_imports)]
use assert_cmd::prelude::*;

pub mod suite_tests;

/// Warning banner shown when confirmation is missing
const LIVE_WARNING: &str = r#"
╔══════════════════════════════════════════════════════════════════╗
║  ⚠️  LIVE API WARNING                                            ║
║                                                                  ║
║  These tests create, star, fork and delete gists on the account  ║
║  behind GISTCHECK_TOKEN / GISTCHECK_BASIC_CREDENTIALS.           ║
║                                                                  ║
║  To proceed, set: GISTCHECK_LIVE_CONFIRM=yes                     ║
╚══════════════════════════════════════════════════════════════════╝
"#;

/// Runs the gistcheck binary against the real API.
pub struct LiveTestContext {
    pub binary_path: PathBuf,
}

impl LiveTestContext {
    /// Panics unless live runs are confirmed and credentials are present.
    pub fn new() -> Self {
        if env::var("GISTCHECK_LIVE_CONFIRM").as_deref() != Ok("yes") {
            eprintln!("{}", LIVE_WARNING);
            panic!("Live confirmation required. Set GISTCHECK_LIVE_CONFIRM=yes to proceed.");
        }

        let has_credentials = ["GISTCHECK_TOKEN", "GISTCHECK_BASIC_CREDENTIALS"]
            .iter()
            .any(|var| env::var(var).is_ok_and(|v| !v.trim().is_empty()));
        assert!(
            has_credentials,
            "Set GISTCHECK_TOKEN or GISTCHECK_BASIC_CREDENTIALS for live tests"
        );

        Self {
            binary_path: assert_cmd::cargo::cargo_bin!("gistcheck").to_path_buf(),
        }
    }

    /// Build a Command pointed at the bundled payloads.
    pub fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.binary_path);
        cmd.current_dir(env!("CARGO_MANIFEST_DIR"));
        cmd.env_remove("GISTCHECK_API_HOST");
        cmd.args(args);
        cmd
    }

    /// Execute command and return an assertion object for chaining.
    pub fn run(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command(args).assert()
    }

    /// Run a suite with JSON output and return the parsed report list.
    ///
    /// Panics if the command fails, printing the report.
    pub fn run_suite_json(&self, suite: &str) -> serde_json::Value {
        let output = self
            .command(&["run", "--suite", suite, "--format", "json"])
            .output()
            .expect("Failed to execute command");

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() {
            panic!(
                "gistcheck run --suite {} failed\nstdout: {}\nstderr: {}",
                suite,
                stdout,
                String::from_utf8_lossy(&output.stderr)
            );
        }

        serde_json::from_str(&stdout).expect("report is valid JSON")
    }
}

impl Default for LiveTestContext {
    fn default() -> Self {
        Self::new()
    }
}
