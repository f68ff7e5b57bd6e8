use reqwest::{multipart, Method};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{file_part, ApiClient, Payload};
use crate::error::ApiError;

/// Response from `/analysis/upload-and-analyze`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub pdf_path: Option<String>,
    #[serde(default)]
    pub final_answer: Option<String>,
    #[serde(default)]
    pub agentops_dashboard: Option<String>,
}

/// Response from `/query` and `/query/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub logs: Option<String>,
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pdf_path: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    input_field: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_query: Option<&'a str>,
}

impl ApiClient {
    /// Upload a file and run the analysis crew on it in one request.
    ///
    /// Unset text fields go out as empty strings; the backend requires all
    /// three parts.
    pub async fn upload_and_analyze(
        &self,
        file_path: &Path,
        input_field: Option<&str>,
        user_query: Option<&str>,
    ) -> Result<AnalyzeResponse, ApiError> {
        let form = multipart::Form::new()
            .part("file", file_part(file_path).await?)
            .text("input_field", input_field.unwrap_or_default().to_string())
            .text("user_query", user_query.unwrap_or_default().to_string());

        tracing::info!("Uploading {} for analysis", file_path.display());
        self.request(
            Method::POST,
            "/analysis/upload-and-analyze",
            Payload::Multipart(form),
        )
        .await
    }

    /// Query a previously uploaded document.
    pub async fn query_document(
        &self,
        id: &str,
        input_field: Option<&str>,
        user_query: Option<&str>,
    ) -> Result<QueryResponse, ApiError> {
        let body = QueryRequest {
            pdf_path: None,
            input_field,
            user_query,
        };
        self.request_url(
            Method::POST,
            self.item_endpoint("query", id)?,
            Payload::Json(serde_json::to_value(&body)?),
        )
        .await
    }

    /// Query a document by its path on the server.
    pub async fn query_path(
        &self,
        pdf_path: &str,
        input_field: Option<&str>,
        user_query: Option<&str>,
    ) -> Result<QueryResponse, ApiError> {
        let body = QueryRequest {
            pdf_path: Some(pdf_path),
            input_field,
            user_query,
        };
        self.request(
            Method::POST,
            "/query",
            Payload::Json(serde_json::to_value(&body)?),
        )
        .await
    }
}
