//! Full suite runs against api.github.com
//!
//! Both suites fork the same gist, so they run in one invocation rather than
//! as parallel tests.

use predicates::prelude::*;

use super::LiveTestContext;

#[test]
#[cfg_attr(not(feature = "live-tests"), ignore)]
fn test_status_sees_credentials() {
    let ctx = LiveTestContext::new();

    ctx.run(&["status"])
        .success()
        .stdout(predicate::str::contains("configured"));
}

#[test]
#[cfg_attr(not(feature = "live-tests"), ignore)]
fn test_both_suites_pass() {
    let ctx = LiveTestContext::new();
    let report = ctx.run_suite_json("all");

    let suites = report["data"].as_array().expect("suite reports");
    assert_eq!(suites.len(), 2);
    assert_eq!(suites[0]["suite"], "authorized");
    assert_eq!(suites[1]["suite"], "unauthorized");
    assert_eq!(suites[0]["outcomes"].as_array().map(Vec::len), Some(17));
    assert_eq!(suites[1]["outcomes"].as_array().map(Vec::len), Some(9));

    for suite in suites {
        for outcome in suite["outcomes"].as_array().expect("outcomes") {
            assert_ne!(outcome["status"], "failed", "{}", outcome);
        }
        // Every provisioned gist is gone afterwards
        for note in suite["teardown"].as_array().expect("teardown notes") {
            assert_ne!(note["outcome"]["result"], "failed", "{}", note);
        }
    }
}
