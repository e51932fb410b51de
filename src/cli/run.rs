//! Run command implementation

use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::args::{GlobalOptions, SuiteSelection};
use crate::cli::CommandContext;
use crate::error::{Error, Result};
use crate::output::{self, RunSummary};
use crate::suite::run_suite;

/// Run the selected suites and print their reports.
///
/// Returns an error when any scenario failed, so the process exits non-zero.
pub async fn run(opts: &GlobalOptions, selection: SuiteSelection) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let progress = spinner();

    let mut reports = Vec::new();
    for kind in selection.suites() {
        let report = run_suite(kind, &ctx.client, &ctx.config, &ctx.payloads, &progress).await;
        reports.push(report);
    }
    progress.finish_and_clear();

    let summary = RunSummary::new(reports);
    output::print(&summary, ctx.format)?;

    if summary.passed() {
        Ok(())
    } else {
        Err(Error::SuitesFailed(summary.failed_count()))
    }
}

/// Spinner on stderr; hidden when stderr is not a terminal
fn spinner() -> ProgressBar {
    if !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.cyan} {msg} ({elapsed})")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    bar.set_style(style);
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}
