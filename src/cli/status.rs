//! Status command implementation

use colored::Colorize;

use crate::cli::args::GlobalOptions;
use crate::cli::CommandContext;
use crate::config::{Config, CredentialSource};
use crate::error::Result;
use crate::payloads::PayloadSet;

/// Run the status command to display configuration status
pub fn run(opts: &GlobalOptions) -> Result<()> {
    println!("{}\n", "gistcheck Configuration Status".bold());

    let config_path = Config::resolve_path(opts.config_ref())?;
    if config_path.exists() {
        println!("Config file: {}", config_path.display().to_string().cyan());
    } else {
        println!(
            "Config file: {} {}",
            config_path.display().to_string().cyan(),
            "(not found, using defaults)".dimmed()
        );
    }

    let config = match CommandContext::load_config(opts) {
        Ok(config) => config,
        Err(err) => {
            println!("{} {}", "✗".red(), err);
            println!();
            println!("Run {} to create a configuration file.", "gistcheck init".cyan());
            println!();
            return Ok(());
        }
    };

    println!("API: {}", config.api_base.as_str().cyan());
    println!();

    // Credential status
    match config.credential_source() {
        Some(CredentialSource::Token(_)) => {
            println!("{} Bearer token configured", "✓".green())
        }
        Some(CredentialSource::Basic(_)) => println!(
            "{} Basic credentials configured (exchanged for a token on each run)",
            "✓".green()
        ),
        None => {
            println!("{} No credentials configured", "✗".red());
            println!("  → Run 'gistcheck init' or set GISTCHECK_TOKEN");
        }
    }

    // OAuth app credentials
    if config.app_credentials().is_some() {
        println!("{} OAuth app credentials configured", "✓".green());
    } else {
        println!(
            "{} OAuth app credentials not set (app rate limit scenario will be skipped)",
            "○".dimmed()
        );
    }

    // Payloads
    match PayloadSet::load(&config.fixtures_dir) {
        Ok(payloads) => println!(
            "{} Payloads found in {}",
            "✓".green(),
            payloads.dir().display()
        ),
        Err(err) => println!("{} {}", "✗".red(), err),
    }

    println!("{} Fork source: {}", "○".dimmed(), config.fork_source_id);
    println!();

    Ok(())
}
