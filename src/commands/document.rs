use anyhow::{bail, Context, Result};
use colored::*;
use std::time::Duration;

use crate::api::{ApiClient, JobResults};
use crate::cli::DocumentAction;
use crate::config::Config;
use crate::error::ApiError;
use crate::flows::DocumentsFlow;
use crate::utils::{display, progress};

const POLL_INTERVAL: Duration = Duration::from_secs(2);

pub async fn execute(config: &Config, action: &DocumentAction) -> Result<()> {
    let client = super::connect(config)?;

    match action {
        DocumentAction::Upload { file } => {
            let flow = DocumentsFlow::new(client);
            if let Some(path) = file {
                println!(
                    "{} {}",
                    "📤".cyan(),
                    format!("Uploading document: {}", path.display()).bold()
                );
            }
            match flow.upload(file.as_deref()).await {
                Ok(message) => {
                    println!("{} {}", "✅".green(), message.bold());
                    println!("\n{}", "To see your documents, run:".bright_black());
                    println!("  {} {}", "➜".cyan(), "finadvisor document list".yellow());
                    Ok(())
                }
                Err(message) => bail!(message),
            }
        }
        DocumentAction::List => {
            let flow = DocumentsFlow::new(client);
            eprintln!("{} Fetching your documents...", "📄".cyan());
            match flow.list().await {
                Ok(documents) => display::print_documents(&documents, config.default_format),
                Err(message) => bail!(message),
            }
        }
        DocumentAction::Analyze { id, wait, timeout } => {
            client
                .start_analysis(id)
                .await
                .context("Failed to start analysis")?;
            eprintln!("{} Analysis started for document {}", "🚀".cyan(), id.yellow());

            if *wait {
                let results = wait_for_completion(&client, id, *timeout).await?;
                display::print_job_results(&results, config.default_format)?;
            } else {
                println!("\n{}", "To check on it, run:".bright_black());
                println!(
                    "  {} {}",
                    "➜".cyan(),
                    format!("finadvisor document results {}", id).yellow()
                );
            }
            Ok(())
        }
        DocumentAction::Results { id } => {
            let results = client
                .get_results(id)
                .await
                .context("Failed to fetch analysis results")?;
            display::print_job_results(&results, config.default_format)
        }
    }
}

async fn wait_for_completion(client: &ApiClient, id: &str, timeout_secs: u64) -> Result<JobResults> {
    let pb = progress::create_job_spinner(id);
    let result = client
        .wait_for_completion(id, Duration::from_secs(timeout_secs), POLL_INTERVAL, |results| {
            let status = results.status.as_deref().unwrap_or("processing");
            pb.set_message(format!("{}...", status));
        })
        .await;

    match result {
        Ok(results) => {
            pb.finish_and_clear();
            Ok(results)
        }
        Err(e @ ApiError::TimedOut { .. }) => {
            pb.finish_with_message("❌ Timed out");
            Err(e.into())
        }
        Err(e) => {
            pb.finish_and_clear();
            Err(anyhow::Error::new(e).context("Failed to fetch analysis results"))
        }
    }
}
