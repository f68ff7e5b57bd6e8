use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::sequence::{RequestSequence, Ticket};
use crate::api::{AnalyzeResponse, ApiClient};

pub const FILE_REQUIRED: &str = "Please upload a file.";
pub const NO_SUMMARY: &str = "No summary returned.";
pub const ANALYZE_FAILED: &str = "Error analyzing the document";

#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub file: Option<PathBuf>,
    pub input_field: Option<String>,
    pub user_query: Option<String>,
}

/// What the analysis view shows.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AnalysisView {
    pub text: String,
    pub dashboard: Option<String>,
}

impl From<AnalyzeResponse> for AnalysisView {
    fn from(response: AnalyzeResponse) -> Self {
        Self {
            text: response
                .final_answer
                .filter(|a| !a.is_empty())
                .unwrap_or_else(|| NO_SUMMARY.to_string()),
            dashboard: response.agentops_dashboard.filter(|d| !d.trim().is_empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalyzeOutcome {
    /// Rejected locally; nothing was sent.
    Invalid(String),
    Displayed(AnalysisView),
    Failed(&'static str),
    /// A newer submission started before this one finished.
    Superseded,
}

/// Upload a document and show the crew's answer.
pub struct AnalyzeFlow {
    client: Arc<ApiClient>,
    sequence: RequestSequence,
    view: RwLock<Option<AnalysisView>>,
}

impl AnalyzeFlow {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            sequence: RequestSequence::new(),
            view: RwLock::new(None),
        }
    }

    /// The result currently on display.
    pub async fn view(&self) -> Option<AnalysisView> {
        self.view.read().await.clone()
    }

    pub async fn submit(&self, request: UploadRequest) -> AnalyzeOutcome {
        let Some(file) = request.file else {
            return AnalyzeOutcome::Invalid(FILE_REQUIRED.to_string());
        };
        if !file.is_file() {
            return AnalyzeOutcome::Invalid(format!("File not found: {}", file.display()));
        }

        let ticket = self.sequence.issue();
        let result = self
            .client
            .upload_and_analyze(
                &file,
                request.input_field.as_deref(),
                request.user_query.as_deref(),
            )
            .await;

        match result {
            Ok(response) => self.settle(ticket, AnalysisView::from(response)).await,
            Err(e) => {
                // Detail stays in the log; the user sees the fixed message.
                tracing::debug!("analysis failed: {}", e);
                if self.sequence.is_latest(ticket) {
                    AnalyzeOutcome::Failed(ANALYZE_FAILED)
                } else {
                    AnalyzeOutcome::Superseded
                }
            }
        }
    }

    async fn settle(&self, ticket: Ticket, view: AnalysisView) -> AnalyzeOutcome {
        let mut slot = self.view.write().await;
        if !self.sequence.is_latest(ticket) {
            tracing::debug!(?ticket, "discarding stale analysis response");
            return AnalyzeOutcome::Superseded;
        }
        *slot = Some(view.clone());
        AnalyzeOutcome::Displayed(view)
    }
}
