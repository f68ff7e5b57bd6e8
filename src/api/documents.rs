use reqwest::{multipart, Method};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};

use super::{file_part, ApiClient, Payload};
use crate::error::ApiError;

/// Document identifier. The backend uses integer keys but nothing here
/// depends on that, so string ids are accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentId {
    Number(i64),
    Text(String),
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentId::Number(n) => write!(f, "{}", n),
            DocumentId::Text(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRef {
    pub id: DocumentId,
    pub filename: String,
}

/// Status of a background analysis job from `GET /results/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobResults {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub logs: Option<String>,
}

impl JobResults {
    /// Whether the job is still queued or running.
    pub fn is_pending(&self) -> bool {
        matches!(
            self.status.as_deref().map(str::to_lowercase).as_deref(),
            Some("pending" | "queued" | "processing" | "running" | "started")
        )
    }
}

impl ApiClient {
    /// Upload a document without analyzing it.
    pub async fn upload_document(&self, file_path: &Path) -> Result<serde_json::Value, ApiError> {
        let form = multipart::Form::new().part("file", file_part(file_path).await?);
        tracing::info!("Uploading {}", file_path.display());
        self.request(Method::POST, "/upload", Payload::Multipart(form))
            .await
    }

    /// List every document owned by the session.
    pub async fn list_documents(&self) -> Result<Vec<DocumentRef>, ApiError> {
        self.request(Method::GET, "/documents", Payload::Empty).await
    }

    /// Start the backend analysis job for an uploaded document.
    pub async fn start_analysis(&self, id: &str) -> Result<serde_json::Value, ApiError> {
        self.request_url(Method::POST, self.item_endpoint("analyze", id)?, Payload::Empty)
            .await
    }

    pub async fn get_results(&self, id: &str) -> Result<JobResults, ApiError> {
        self.request_url(Method::GET, self.item_endpoint("results", id)?, Payload::Empty)
            .await
    }

    /// Poll `/results/{id}` every `interval` until the job is no longer
    /// pending.
    ///
    /// Always polls at least once, so a zero timeout still reports a job
    /// that has already finished. `on_poll` sees every pending result.
    pub async fn wait_for_completion(
        &self,
        id: &str,
        timeout: Duration,
        interval: Duration,
        mut on_poll: impl FnMut(&JobResults),
    ) -> Result<JobResults, ApiError> {
        let start_time = Instant::now();

        loop {
            let results = self.get_results(id).await?;
            if !results.is_pending() {
                return Ok(results);
            }
            on_poll(&results);

            if start_time.elapsed() + interval > timeout {
                tracing::debug!(%id, ?timeout, "gave up waiting for analysis");
                return Err(ApiError::TimedOut {
                    id: id.to_string(),
                    seconds: timeout.as_secs(),
                });
            }
            tokio::time::sleep(interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::client_for;
    use crate::auth::Session;
    use mockito::Matcher;
    use std::io::Write;

    #[tokio::test]
    async fn test_list_documents_mixed_ids() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/documents")
            .with_status(200)
            .with_body(r#"[{"id": 1, "filename": "q3.pdf"}, {"id": "b7", "filename": "q4.docx"}]"#)
            .create_async()
            .await;

        let client = client_for(&server, Session::in_memory());
        let docs = client.list_documents().await.unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, DocumentId::Number(1));
        assert_eq!(docs[0].id.to_string(), "1");
        assert_eq!(docs[1].id.to_string(), "b7");
        assert_eq!(docs[1].filename, "q4.docx");
    }

    #[tokio::test]
    async fn test_upload_document_sends_file_part() {
        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        file.write_all(b"%PDF-1.4 test").unwrap();

        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/upload")
            .match_header("content-type", Matcher::Regex("multipart/form-data".into()))
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="file""#.into()),
                Matcher::Regex("application/pdf".into()),
                Matcher::Regex("%PDF-1.4 test".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"id": 12, "filename": "x.pdf"}"#)
            .create_async()
            .await;

        let client = client_for(&server, Session::in_memory());
        client.upload_document(file.path()).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_job_results() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/analyze/4")
            .with_status(202)
            .with_body(r#"{"message": "Analysis started"}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/results/4")
            .with_status(200)
            .with_body(r#"{"status": "processing"}"#)
            .create_async()
            .await;

        let client = client_for(&server, Session::in_memory());
        client.start_analysis("4").await.unwrap();
        let results = client.get_results("4").await.unwrap();

        assert!(results.is_pending());
        assert_eq!(results.summary, None);
    }

    #[tokio::test]
    async fn test_wait_for_completion_polls_until_done() {
        let mut server = mockito::Server::new_async().await;
        let pending = server
            .mock("GET", "/results/9")
            .with_status(200)
            .with_body(r#"{"status": "processing"}"#)
            .expect(2)
            .create_async()
            .await;
        let done = server
            .mock("GET", "/results/9")
            .with_status(200)
            .with_body(r#"{"status": "completed", "summary": "Revenue grew 12%"}"#)
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server, Session::in_memory());
        let mut seen = Vec::new();
        let results = client
            .wait_for_completion(
                "9",
                Duration::from_secs(5),
                Duration::from_millis(10),
                |r| seen.push(r.status.clone()),
            )
            .await
            .unwrap();

        assert_eq!(results.summary.as_deref(), Some("Revenue grew 12%"));
        assert_eq!(seen, vec![Some("processing".to_string()); 2]);
        pending.assert_async().await;
        done.assert_async().await;
    }

    #[tokio::test]
    async fn test_wait_for_completion_times_out() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/results/9")
            .with_status(200)
            .with_body(r#"{"status": "queued"}"#)
            .expect_at_least(2)
            .create_async()
            .await;

        let client = client_for(&server, Session::in_memory());
        let err = client
            .wait_for_completion(
                "9",
                Duration::from_millis(60),
                Duration::from_millis(10),
                |_| {},
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::TimedOut { ref id, .. } if id == "9"));
    }

    #[tokio::test]
    async fn test_wait_with_zero_timeout_polls_once() {
        let mut server = mockito::Server::new_async().await;
        let finished = server
            .mock("GET", "/results/1")
            .with_status(200)
            .with_body(r#"{"status": "completed"}"#)
            .expect(1)
            .create_async()
            .await;
        let running = server
            .mock("GET", "/results/2")
            .with_status(200)
            .with_body(r#"{"status": "running"}"#)
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server, Session::in_memory());
        let results = client
            .wait_for_completion("1", Duration::ZERO, Duration::from_secs(2), |_| {})
            .await
            .unwrap();
        assert_eq!(results.status.as_deref(), Some("completed"));

        let err = client
            .wait_for_completion("2", Duration::ZERO, Duration::from_secs(2), |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::TimedOut { seconds: 0, .. }));

        finished.assert_async().await;
        running.assert_async().await;
    }

    #[test]
    fn test_is_pending() {
        let done = JobResults {
            status: Some("Completed".to_string()),
            ..Default::default()
        };
        assert!(!done.is_pending());
        assert!(!JobResults::default().is_pending());
        let running = JobResults {
            status: Some("RUNNING".to_string()),
            ..Default::default()
        };
        assert!(running.is_pending());
    }
}
