use anyhow::Result;
use colored::*;
use std::path::{Path, PathBuf};

use crate::cli::ConfigAction;
use crate::config::Config;

pub async fn execute(path: Option<&Path>, action: &ConfigAction) -> Result<()> {
    let config_path: PathBuf = match path {
        Some(p) => p.to_path_buf(),
        None => Config::get_config_path()?,
    };

    match action {
        ConfigAction::Show => {
            println!("{}  Current Configuration:", "⚙️".cyan());

            let config = Config::load(Some(&config_path))?;

            println!(
                "\n  {} {}",
                "API Endpoint:".white().bold(),
                config.api_endpoint.yellow()
            );
            println!(
                "  {} {}",
                "Login Contract:".white().bold(),
                config.login_contract.to_string().yellow()
            );
            println!(
                "  {} {}",
                "Request Timeout:".white().bold(),
                config
                    .request_timeout_secs
                    .map(|s| format!("{}s", s))
                    .unwrap_or_else(|| "transport default".to_string())
                    .yellow()
            );
            println!(
                "  {} {}",
                "Session File:".white().bold(),
                config.session_path()?.display().to_string().yellow()
            );
            println!(
                "  {} {}",
                "Default Format:".white().bold(),
                config.default_format.to_string().yellow()
            );
            println!(
                "  {} {}",
                "Color Output:".white().bold(),
                if config.color_output {
                    "enabled".green()
                } else {
                    "disabled".red()
                }
            );

            println!(
                "\n  Config file: {}",
                config_path.display().to_string().blue()
            );
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load(Some(&config_path))?;
            config.set(key, value)?;
            config.save_to(&config_path)?;
            println!(
                "{}  Configuration updated: {} = {}",
                "✓".green(),
                key.cyan(),
                value.yellow()
            );
        }
        ConfigAction::Reset => {
            Config::reset(&config_path)?;
            println!("{}  Configuration reset to defaults", "✓".green());
        }
    }

    Ok(())
}
