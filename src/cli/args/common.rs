//! Common CLI types shared across commands

use crate::suite::SuiteKind;

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty format - one line per scenario with pass/fail marks (default)
    #[default]
    Pretty,
    /// Table format - one row per scenario
    Table,
    /// JSON format - full reports for scripts and CI
    Json,
}

/// Which suites `run` executes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SuiteSelection {
    /// Authorized suite, then unauthorized suite
    #[default]
    All,
    /// Requests sent with the bearer credential
    Authorized,
    /// Requests sent without credentials
    Unauthorized,
}

impl SuiteSelection {
    /// Suites in run order
    pub fn suites(self) -> Vec<SuiteKind> {
        match self {
            SuiteSelection::All => vec![SuiteKind::Authorized, SuiteKind::Unauthorized],
            SuiteSelection::Authorized => vec![SuiteKind::Authorized],
            SuiteSelection::Unauthorized => vec![SuiteKind::Unauthorized],
        }
    }
}
