//! CLI command definitions and handlers

use clap::{Parser, Subcommand};
pub use clap_complete::Shell;

pub mod args;
pub mod completions;
pub mod context;
pub mod init;
pub mod run;
pub mod status;

pub use args::{OutputFormat, SuiteSelection};
pub use context::CommandContext;

/// gistcheck - integration suites for the GitHub Gist API
#[derive(Parser, Debug)]
#[command(name = "gistcheck")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (pretty, table, json)
    #[arg(
        long,
        global = true,
        env = "GISTCHECK_FORMAT",
        default_value = "pretty",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: OutputFormat,

    /// Override config file location
    #[arg(long, global = true, env = "GISTCHECK_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "GISTCHECK_DEBUG", hide_env = true)]
    pub debug: bool,

    /// Override the API host (default https://api.github.com)
    #[arg(long, global = true, env = "GISTCHECK_API_HOST", hide_env = true)]
    pub api_host: Option<String>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the integration suites against the Gist API
    #[command(after_help = "\
Each suite provisions its own gists (a public gist, a secret gist and a fork)
and deletes them when done. The process exits non-zero if any scenario fails.")]
    Run {
        /// Suites to run
        #[arg(long, value_enum, default_value = "all")]
        suite: SuiteSelection,
    },

    /// Create a configuration file interactively
    Init,

    /// Show credential and configuration status
    Status,

    /// Display version information
    Version,

    /// Generate shell completions
    #[command(after_help = "\
Setup:
  bash:   gistcheck completion bash > ~/.local/share/bash-completion/completions/gistcheck
  zsh:    gistcheck completion zsh > ~/.zfunc/_gistcheck
  fish:   gistcheck completion fish > ~/.config/fish/completions/gistcheck.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
