use anyhow::{bail, Result};
use colored::*;

use crate::config::Config;
use crate::flows::{DocumentsFlow, QueryOutcome, QueryTarget};
use crate::utils::{display, progress};

pub async fn execute(
    config: &Config,
    id: Option<&str>,
    pdf_path: Option<&str>,
    input_field: Option<&str>,
    user_query: Option<&str>,
) -> Result<()> {
    let client = super::connect(config)?;
    let flow = DocumentsFlow::new(client);

    let target = match (id, pdf_path) {
        (_, Some(path)) => QueryTarget::ServerPath(path),
        (Some(id), None) => QueryTarget::Document(id),
        (None, None) => QueryTarget::Document(""),
    };

    if let QueryTarget::Document(id) = target {
        if !id.is_empty() {
            eprintln!("{}  {}", "🔎".cyan(), format!("Querying document {}", id).bold());
        }
    }

    let pb = progress::create_request_spinner("Running...");
    let outcome = flow.query(target, input_field, user_query).await;
    pb.finish_and_clear();

    match outcome {
        QueryOutcome::Displayed(view) => display::print_query(&view, config.default_format),
        QueryOutcome::Invalid(message) | QueryOutcome::Failed(message) => bail!(message),
        QueryOutcome::Superseded => Ok(()),
    }
}
