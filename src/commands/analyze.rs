use anyhow::{bail, Result};
use colored::*;
use std::path::Path;

use crate::config::Config;
use crate::flows::{AnalyzeFlow, AnalyzeOutcome, UploadRequest};
use crate::utils::{display, progress};

pub async fn execute(
    config: &Config,
    file: Option<&Path>,
    input_field: Option<&str>,
    user_query: Option<&str>,
    open_dashboard: bool,
) -> Result<()> {
    let client = super::connect(config)?;
    let flow = AnalyzeFlow::new(client);

    let request = UploadRequest {
        file: file.map(Path::to_path_buf),
        input_field: input_field.map(str::to_string),
        user_query: user_query.map(str::to_string),
    };

    if let Some(path) = file {
        eprintln!("{}  {}", "📄".cyan(), format!("Analyzing document: {}", path.display()).bold());
    }

    let pb = progress::create_request_spinner("⏳ Processing...");
    let outcome = flow.submit(request).await;
    pb.finish_and_clear();

    match outcome {
        AnalyzeOutcome::Displayed(view) => {
            display::print_analysis(&view, config.default_format)?;
            if open_dashboard {
                if let Some(link) = &view.dashboard {
                    if let Err(e) = open::that(link) {
                        tracing::warn!("Failed to open dashboard link: {}", e);
                    }
                }
            }
            Ok(())
        }
        AnalyzeOutcome::Invalid(message) => bail!(message),
        AnalyzeOutcome::Failed(message) => bail!("❌ {}", message),
        AnalyzeOutcome::Superseded => Ok(()),
    }
}
