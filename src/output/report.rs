//! Rendering of suite reports

use colored::Colorize;
use tabled::Tabled;

use super::Formattable;
use super::json::format_json;
use super::table::format_table;
use crate::cli::OutputFormat;
use crate::error::Result;
use crate::provision::TeardownOutcome;
use crate::suite::{ScenarioOutcome, ScenarioStatus, SuiteReport};

/// Reports of every suite in one invocation
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub reports: Vec<SuiteReport>,
}

impl RunSummary {
    pub fn new(reports: Vec<SuiteReport>) -> Self {
        Self { reports }
    }

    /// Every suite passed
    pub fn passed(&self) -> bool {
        self.reports.iter().all(SuiteReport::passed)
    }

    pub fn failed_count(&self) -> usize {
        self.reports.iter().map(SuiteReport::failed_count).sum()
    }

    fn pretty(&self) -> String {
        let mut out = Vec::new();

        for report in &self.reports {
            let heading = format!("{} suite", capitalize(&report.suite.to_string()));
            out.push(heading.as_str().bold().to_string());

            if let Some(fixture) = &report.fixture {
                let ids = format!(
                    "  fixture: public {} · secret {} · fork {}",
                    fixture.public_gist_id, fixture.secret_gist_id, fixture.forked_gist_id
                );
                out.push(ids.as_str().dimmed().to_string());
            }

            for outcome in &report.outcomes {
                out.push(pretty_outcome(outcome));
            }

            for note in &report.teardown {
                let line = match &note.outcome {
                    TeardownOutcome::Deleted => format!(
                        "  {} deleted {} gist {}",
                        "○".dimmed(),
                        note.gist.kind,
                        note.gist.id
                    ),
                    TeardownOutcome::AlreadyGone => format!(
                        "  {} {} gist {} already deleted",
                        "○".dimmed(),
                        note.gist.kind,
                        note.gist.id
                    ),
                    TeardownOutcome::Failed(reason) => format!(
                        "  {} could not delete {} gist {}: {}",
                        "⚠".yellow(),
                        note.gist.kind,
                        note.gist.id,
                        reason
                    ),
                };
                out.push(line);
            }

            let totals = format!(
                "  {} passed, {} failed, {} skipped in {:.1}s",
                report.passed_count(),
                report.failed_count(),
                report.skipped_count(),
                report.duration_ms as f64 / 1000.0
            );
            out.push(if report.passed() {
                totals.as_str().green().to_string()
            } else {
                totals.as_str().red().to_string()
            });
            out.push(String::new());
        }

        // Drop the trailing blank line
        out.pop();
        out.join("\n")
    }
}

fn pretty_outcome(outcome: &ScenarioOutcome) -> String {
    let mark = match outcome.status {
        ScenarioStatus::Passed => "✓".green(),
        ScenarioStatus::Failed => "✗".red(),
        ScenarioStatus::Skipped => "○".dimmed(),
    };

    let mut line = format!("  {} {:>2} {}", mark, outcome.index, outcome.title);
    if let Some(detail) = &outcome.detail {
        let detail = match outcome.status {
            ScenarioStatus::Failed => detail.as_str().red().to_string(),
            _ => detail.as_str().dimmed().to_string(),
        };
        line.push_str(&format!("\n       → {}", detail));
    }
    line
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// One table row per scenario outcome
#[derive(Debug, Tabled)]
struct OutcomeRow {
    #[tabled(rename = "SUITE")]
    suite: String,
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "SCENARIO")]
    title: String,
    #[tabled(rename = "RESULT")]
    status: String,
    #[tabled(rename = "DETAIL")]
    detail: String,
}

impl OutcomeRow {
    fn new(report: &SuiteReport, outcome: &ScenarioOutcome) -> Self {
        let status = match outcome.status {
            ScenarioStatus::Passed => "PASS",
            ScenarioStatus::Failed => "FAIL",
            ScenarioStatus::Skipped => "SKIP",
        };

        Self {
            suite: report.suite.to_string(),
            index: outcome.index,
            title: outcome.title.clone(),
            status: status.to_string(),
            detail: outcome.detail.clone().unwrap_or_default(),
        }
    }
}

impl Formattable for RunSummary {
    fn format(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Pretty => Ok(self.pretty()),
            OutputFormat::Table => {
                let rows: Vec<OutcomeRow> = self
                    .reports
                    .iter()
                    .flat_map(|r| r.outcomes.iter().map(move |o| OutcomeRow::new(r, o)))
                    .collect();
                Ok(format_table(&rows))
            }
            OutputFormat::Json => Ok(format_json(&self.reports)?),
        }
    }
}
