use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown while a single request is in flight.
pub fn create_request_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Spinner for polling a background analysis job.
pub fn create_job_spinner(document_id: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.yellow} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_prefix(format!("Document {}", document_id));
    pb.set_message("Queued for processing...");
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}
