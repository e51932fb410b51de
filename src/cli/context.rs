//! Command execution context
//!
//! Loads configuration, layers environment and CLI overrides on top, reads
//! the fixture payloads and builds the API client, so commands start from a
//! validated state.

use crate::cli::OutputFormat;
use crate::cli::args::GlobalOptions;
use crate::client::GitHubClient;
use crate::config::Config;
use crate::error::Result;
use crate::payloads::PayloadSet;

/// Everything `run` needs to execute suites.
pub struct CommandContext {
    /// Merged and validated configuration
    pub config: Config,
    /// Request payloads read from `config.fixtures_dir`
    pub payloads: PayloadSet,
    pub client: GitHubClient,
    /// Output format preference
    pub format: OutputFormat,
}

impl CommandContext {
    /// Build the context.
    ///
    /// # Errors
    /// Returns an error if the config file cannot be read, no credential is
    /// configured, or a payload file is missing or malformed.
    pub fn new(opts: &GlobalOptions) -> Result<Self> {
        let config = Self::load_config(opts)?;
        config.validate()?;

        let payloads = PayloadSet::load(&config.fixtures_dir)?;
        let client = GitHubClient::new(&config)?;

        Ok(Self {
            config,
            payloads,
            client,
            format: opts.format,
        })
    }

    /// Config file, then `GISTCHECK_*` variables, then `--api-host`
    pub fn load_config(opts: &GlobalOptions) -> Result<Config> {
        let mut config = Config::load_at(opts.config_ref())?;
        config.apply_env();
        Ok(config.with_api_host(opts.api_host_ref()))
    }
}
