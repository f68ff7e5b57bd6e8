use anyhow::{bail, Context, Result};
use chrono_humanize::HumanTime;
use colored::*;
use dialoguer::{theme::ColorfulTheme, Input};
use std::io::{self, Write};

use crate::auth::models::Credentials;
use crate::cli::AuthAction;
use crate::config::Config;
use crate::flows::{LoginFlow, LoginOutcome, Probe, ProbeOutcome, Route};

pub async fn execute(config: &Config, action: &AuthAction) -> Result<()> {
    let client = super::connect(config)?;

    match action {
        AuthAction::Login { username, password } => {
            let mut flow = LoginFlow::new(client, config.login_contract);

            let username = match username {
                Some(u) => u.clone(),
                None => prompt_username()?,
            };
            let password = match password {
                Some(p) => Some(p.clone()),
                None if flow.requires_password() => Some(prompt_password()?),
                None => None,
            };

            println!("{}  Authenticating...", "🔐".cyan());
            match flow.submit(&username, password.as_deref()).await {
                LoginOutcome::Authenticated { route } => {
                    println!("{}  Successfully authenticated!", "✓".green());
                    print_next_step(&route);
                }
                LoginOutcome::Invalid(message) => bail!(message),
                LoginOutcome::Failed { message } => bail!(message),
            }
        }
        AuthAction::Register { username, password } => {
            let username = match username {
                Some(u) => u.clone(),
                None => prompt_username()?,
            };
            let password = match password {
                Some(p) => p.clone(),
                None => prompt_password()?,
            };
            if username.trim().is_empty() || password.is_empty() {
                bail!("Username and password are required.");
            }

            let credentials = Credentials {
                username: username.trim().to_string(),
                password,
            };
            if let Err(e) = client.register(&credentials).await {
                bail!(e.detail().map(str::to_string).unwrap_or_else(|| e.to_string()));
            }
            println!("{}  Account created for {}", "✓".green(), credentials.username.cyan());
            println!("  Run {} to sign in", "finadvisor auth login".cyan());
        }
        AuthAction::Logout => {
            client.session().clear_token()?;
            println!("{}  Successfully logged out", "✓".green());
        }
        AuthAction::Status => {
            let stored = client.session().stored()?;
            let Some(stored) = stored else {
                println!("{}  Authentication Status: {}", "🔐".red(), "NOT AUTHENTICATED".red().bold());
                println!("  Run {} to authenticate", "finadvisor auth login".cyan());
                return Ok(());
            };

            match Probe::new(client.clone()).check().await {
                ProbeOutcome::Valid => {
                    println!(
                        "{}  Authentication Status: {}",
                        "🔐".green(),
                        "AUTHENTICATED".green().bold()
                    );
                    if let Some(user) = &stored.username {
                        println!("  User: {}", user.yellow());
                    }
                    println!("  Logged in: {}", HumanTime::from(stored.created_at));
                    println!("  API Endpoint: {}", config.api_endpoint);
                }
                ProbeOutcome::Redirect(route) => {
                    println!(
                        "{}  Authentication Status: {}",
                        "🔐".red(),
                        "SESSION EXPIRED".red().bold()
                    );
                    print_next_step(&route);
                }
                ProbeOutcome::Unreachable(reason) => {
                    println!("{}  Backend unreachable: {}", "⚠️".yellow(), reason);
                    println!("  Your session was kept; try again when the server is back.");
                }
                ProbeOutcome::Unavailable(status) => {
                    println!("{}  Backend returned {}", "⚠️".yellow(), status);
                    println!("  Your session was kept; try again later.");
                }
            }
        }
    }

    Ok(())
}

fn prompt_username() -> Result<String> {
    let theme = ColorfulTheme::default();
    let username: String = Input::with_theme(&theme)
        .with_prompt("Username (e.g. admin@example.com)")
        .interact_text()?;
    Ok(username)
}

fn prompt_password() -> Result<String> {
    print!("Password: ");
    io::stdout().flush()?;
    rpassword::read_password().context("Failed to read password")
}

/// Terminal stand-in for navigating to `route`.
pub(crate) fn print_next_step(route: &Route) {
    let hint = match route {
        Route::Login => "finadvisor auth login".to_string(),
        Route::Protected => "finadvisor document list".to_string(),
        Route::Analysis => "finadvisor analyze <file>".to_string(),
        Route::Query(id) => format!("finadvisor query {} --query \"...\"", id),
    };
    println!("  {} {}", "➜".cyan(), hint.yellow());
}
