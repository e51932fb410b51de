//! Init command implementation

use colored::Colorize;
use dialoguer::{Confirm, Input, Password, Select, theme::ColorfulTheme};

use crate::cli::args::GlobalOptions;
use crate::config::{Config, encode_basic_credentials};
use crate::error::{ConfigError, Error, Result};

/// Run the init command
///
/// Nothing is sent to GitHub here; credentials are checked on the first
/// `gistcheck run`.
pub fn run(opts: &GlobalOptions) -> Result<()> {
    let theme = ColorfulTheme::default();

    println!("{}", "Welcome to gistcheck!".bold().green());
    println!("Let's set up credentials for the Gist API suites.\n");

    let mut config = existing_config(opts)?;

    let methods = [
        "Personal access token (gist scope)",
        "Username and password (exchanged for a token each run)",
    ];
    let method = Select::with_theme(&theme)
        .with_prompt("How should gistcheck authenticate?")
        .items(&methods)
        .default(0)
        .interact()?;

    if method == 0 {
        let token: String = Password::with_theme(&theme)
            .with_prompt("Enter your GitHub token")
            .interact()?;
        config.token = Some(token);
        config.basic_credentials = None;
    } else {
        let username: String = Input::with_theme(&theme)
            .with_prompt("GitHub username")
            .interact_text()?;
        let password: String = Password::with_theme(&theme)
            .with_prompt("GitHub password")
            .interact()?;
        config.basic_credentials = Some(encode_basic_credentials(&username, &password));
        config.token = None;
    }

    let with_app = Confirm::with_theme(&theme)
        .with_prompt("Configure OAuth app credentials for the app rate limit check?")
        .default(false)
        .interact()?;

    if with_app {
        let client_id: String = Input::with_theme(&theme)
            .with_prompt("OAuth app client ID")
            .interact_text()?;
        let client_secret: String = Password::with_theme(&theme)
            .with_prompt("OAuth app client secret")
            .interact()?;
        config.client_id = Some(client_id);
        config.client_secret = Some(client_secret);
    }

    let config_path = Config::resolve_path(opts.config_ref())?;
    config.save_to(&config_path)?;

    println!(
        "\n{} Configuration saved to: {}",
        "✓".green(),
        config_path.display()
    );

    println!("\n{}", "You're all set! Try running:".bold());
    println!("  {} - Show configuration status", "gistcheck status".cyan());
    println!("  {} - Run both suites", "gistcheck run".cyan());

    Ok(())
}

/// The config `init` starts from. Unrelated settings in an existing file are
/// kept; a file that fails to parse is an error rather than being overwritten.
fn existing_config(opts: &GlobalOptions) -> Result<Config> {
    let config = match Config::load_at(opts.config_ref()) {
        Ok(config) => config,
        Err(Error::Config(ConfigError::NotFound(_))) => Config::default(),
        Err(err) => return Err(err),
    };
    Ok(config.with_api_host(opts.api_host_ref()))
}
