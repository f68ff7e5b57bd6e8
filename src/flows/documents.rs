use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::sequence::{RequestSequence, Ticket};
use crate::api::{ApiClient, DocumentRef, QueryResponse};
use crate::error::ApiError;

pub const DOCUMENT_REQUIRED: &str = "Please upload/select a PDF first.";
pub const SELECT_FILE: &str = "Please select a PDF file first.";
pub const LIST_FAILED: &str = "Failed to load documents.";
pub const QUERY_FAILED: &str = "Query failed!";
pub const UPLOADED: &str = "PDF uploaded";
pub const UPLOAD_FAILED: &str = "Upload failed";

/// Answer and crew logs for one query.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct QueryView {
    pub answer: String,
    pub logs: Option<String>,
}

impl From<QueryResponse> for QueryView {
    fn from(response: QueryResponse) -> Self {
        Self {
            answer: response.answer.unwrap_or_default(),
            logs: response.logs.filter(|l| !l.is_empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    Invalid(&'static str),
    Displayed(QueryView),
    Failed(&'static str),
    Superseded,
}

/// Where a query is aimed.
#[derive(Debug, Clone, Copy)]
pub enum QueryTarget<'a> {
    /// A document from the listing, by id.
    Document(&'a str),
    /// A file path on the server.
    ServerPath(&'a str),
}

/// Document listing, plain upload, and per-document queries.
pub struct DocumentsFlow {
    client: Arc<ApiClient>,
    sequence: RequestSequence,
    view: RwLock<Option<QueryView>>,
}

impl DocumentsFlow {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            sequence: RequestSequence::new(),
            view: RwLock::new(None),
        }
    }

    pub async fn view(&self) -> Option<QueryView> {
        self.view.read().await.clone()
    }

    pub async fn list(&self) -> Result<Vec<DocumentRef>, &'static str> {
        self.client.list_documents().await.map_err(|e| {
            tracing::debug!("listing documents failed: {}", e);
            LIST_FAILED
        })
    }

    pub async fn upload(&self, file: Option<&Path>) -> Result<&'static str, String> {
        let Some(file) = file else {
            return Err(SELECT_FILE.to_string());
        };
        if !file.is_file() {
            return Err(format!("File not found: {}", file.display()));
        }

        match self.client.upload_document(file).await {
            Ok(_) => Ok(UPLOADED),
            Err(e) => {
                tracing::debug!("upload failed: {}", e);
                Err(UPLOAD_FAILED.to_string())
            }
        }
    }

    pub async fn query(
        &self,
        target: QueryTarget<'_>,
        input_field: Option<&str>,
        user_query: Option<&str>,
    ) -> QueryOutcome {
        let result = match target {
            QueryTarget::Document(id) if id.trim().is_empty() => {
                return QueryOutcome::Invalid(DOCUMENT_REQUIRED)
            }
            QueryTarget::ServerPath(path) if path.trim().is_empty() => {
                return QueryOutcome::Invalid(DOCUMENT_REQUIRED)
            }
            QueryTarget::Document(id) => {
                let ticket = self.sequence.issue();
                let result = self
                    .client
                    .query_document(id.trim(), input_field, user_query)
                    .await;
                (ticket, result)
            }
            QueryTarget::ServerPath(path) => {
                let ticket = self.sequence.issue();
                let result = self.client.query_path(path, input_field, user_query).await;
                (ticket, result)
            }
        };

        let (ticket, result) = result;
        self.settle(ticket, result).await
    }

    async fn settle(
        &self,
        ticket: Ticket,
        result: Result<QueryResponse, ApiError>,
    ) -> QueryOutcome {
        let mut slot = self.view.write().await;
        if !self.sequence.is_latest(ticket) {
            tracing::debug!(?ticket, "discarding stale query response");
            return QueryOutcome::Superseded;
        }

        match result {
            Ok(response) => {
                let view = QueryView::from(response);
                *slot = Some(view.clone());
                QueryOutcome::Displayed(view)
            }
            Err(e) => {
                tracing::debug!("query failed: {}", e);
                QueryOutcome::Failed(QUERY_FAILED)
            }
        }
    }
}
