pub mod analysis;
pub mod documents;

use reqwest::{multipart, Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use crate::auth::Session;
use crate::config::Config;
use crate::error::ApiError;

pub use analysis::{AnalyzeResponse, QueryResponse};
pub use documents::{DocumentId, DocumentRef, JobResults};

/// Request body. The variant decides the content type.
pub enum Payload {
    Empty,
    Json(serde_json::Value),
    Form(Vec<(String, String)>),
    Multipart(multipart::Form),
}

/// Single point of egress to the analyzer backend.
///
/// Every request is resolved against a fixed base address and, when the
/// session holds a token, carries `Authorization: Bearer <token>`.
pub struct ApiClient {
    client: Client,
    base_url: Url,
    session: Session,
}

impl ApiClient {
    pub fn new(config: &Config, session: Session) -> Result<Self, ApiError> {
        let mut builder = Client::builder().user_agent(format!(
            "finadvisor/{}",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: normalize_base(&config.api_endpoint)?,
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Attach the bearer token, if any.
    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// URL of one item in a collection, e.g. `query/{id}`.
    ///
    /// The id is percent-encoded as a single path segment, so `/`, `?` and
    /// `#` inside it cannot change which endpoint is hit.
    pub fn item_endpoint(&self, collection: &str, id: &str) -> Result<Url, ApiError> {
        if matches!(id, "" | "." | "..") {
            return Err(ApiError::Validation(format!("Invalid document id: {:?}", id)));
        }
        let mut url = self.endpoint(collection)?;
        url.path_segments_mut()
            .map_err(|_| {
                ApiError::Validation(format!("Cannot build a path under {}", self.base_url))
            })?
            .pop_if_empty()
            .push(id);
        Ok(url)
    }

    /// Send a request and decode the JSON response body.
    ///
    /// An empty 2xx body decodes as JSON `null`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        payload: Payload,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        self.request_url(method, url, payload).await
    }

    /// Like [`request`](Self::request), for an already resolved URL.
    pub async fn request_url<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        payload: Payload,
    ) -> Result<T, ApiError> {
        let body = self.send_url(method, url, payload).await?;
        decode(&body)
    }

    /// Send a request and return the raw body of a 2xx response.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        payload: Payload,
    ) -> Result<Vec<u8>, ApiError> {
        let url = self.endpoint(path)?;
        self.send_url(method, url, payload).await
    }

    pub async fn send_url(
        &self,
        method: Method,
        url: Url,
        payload: Payload,
    ) -> Result<Vec<u8>, ApiError> {
        tracing::debug!(%method, %url, "sending request");

        let builder = self.authorize(self.client.request(method.clone(), url.clone()));
        let builder = match payload {
            Payload::Empty => builder,
            Payload::Json(body) => builder.json(&body),
            Payload::Form(fields) => builder.form(&fields),
            Payload::Multipart(form) => builder.multipart(form),
        };

        let response = builder.send().await.map_err(|e| {
            tracing::debug!(%url, "transport failure: {}", e);
            ApiError::Unreachable(e)
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(ApiError::Unreachable)?;
        tracing::debug!(%method, %url, %status, bytes = body.len(), "response received");

        if !status.is_success() {
            return Err(ApiError::from_response(status, &body));
        }

        Ok(body.to_vec())
    }

    /// Lightweight authenticated `GET /` used to check the session.
    pub async fn probe(&self) -> Result<(), ApiError> {
        self.send(Method::GET, "/", Payload::Empty).await?;
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::from_value(serde_json::Value::Null)?);
    }
    Ok(serde_json::from_slice(body)?)
}

/// Parse the configured endpoint so that joins keep any path prefix.
fn normalize_base(endpoint: &str) -> Result<Url, ApiError> {
    let mut url = Url::parse(endpoint.trim())?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// MIME type for an upload, from the file extension.
pub(crate) fn mime_for(path: &std::path::Path) -> Option<&'static str> {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .as_deref()
    {
        Some("pdf") => Some("application/pdf"),
        Some("doc") => Some("application/msword"),
        Some("docx") => {
            Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document")
        }
        Some("txt") => Some("text/plain"),
        _ => None,
    }
}

/// Read a local file into a multipart part named after it.
pub(crate) async fn file_part(path: &std::path::Path) -> Result<multipart::Part, ApiError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| ApiError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ApiError::Validation(format!("Invalid filename: {}", path.display())))?
        .to_string();

    let part = multipart::Part::bytes(bytes).file_name(filename);
    match mime_for(path) {
        Some(mime) => Ok(part.mime_str(mime)?),
        None => Ok(part),
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::client_for;
    use super::*;
    use crate::error::ErrorKind;
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn test_bearer_token_attached_when_present() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/documents")
            .match_header("authorization", "Bearer abc123")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[]")
            .create_async()
            .await;

        let session = Session::in_memory();
        session.set_token("abc123", None).unwrap();
        let client = client_for(&server, session);

        let docs: Vec<serde_json::Value> = client
            .request(Method::GET, "/documents", Payload::Empty)
            .await
            .unwrap();
        assert!(docs.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_no_header_without_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .match_header("authorization", Matcher::Missing)
            .with_status(200)
            .with_body(r#"{"User": null}"#)
            .create_async()
            .await;

        let client = client_for(&server, Session::in_memory());
        client.probe().await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_token_is_read_on_every_request() {
        let mut server = mockito::Server::new_async().await;
        let anonymous = server
            .mock("GET", "/")
            .match_header("authorization", Matcher::Missing)
            .with_status(200)
            .create_async()
            .await;
        let authenticated = server
            .mock("GET", "/")
            .match_header("authorization", "Bearer late-token")
            .with_status(200)
            .create_async()
            .await;

        let session = Session::in_memory();
        let client = client_for(&server, session.clone());

        client.probe().await.unwrap();
        session.set_token("late-token", None).unwrap();
        client.probe().await.unwrap();

        anonymous.assert_async().await;
        authenticated.assert_async().await;
    }

    #[tokio::test]
    async fn test_json_payload_and_empty_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/auth/register")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({"username": "a", "password": "b"})))
            .with_status(201)
            .create_async()
            .await;

        let client = client_for(&server, Session::in_memory());
        let value: serde_json::Value = client
            .request(
                Method::POST,
                "/auth/register",
                Payload::Json(json!({"username": "a", "password": "b"})),
            )
            .await
            .unwrap();
        assert!(value.is_null());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_error_is_typed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/results/7")
            .with_status(500)
            .with_body(r#"{"detail": "Analysis error: boom"}"#)
            .create_async()
            .await;

        let client = client_for(&server, Session::in_memory());
        let err = client
            .request::<serde_json::Value>(Method::GET, "/results/7", Payload::Empty)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Server);
        assert_eq!(err.detail(), Some("Analysis error: boom"));
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        let config = Config {
            // Port 9 (discard) on localhost is closed in test environments
            api_endpoint: "http://127.0.0.1:9".to_string(),
            ..Config::default()
        };
        let client = ApiClient::new(&config, Session::in_memory()).unwrap();

        let err = client.probe().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unreachable);
    }

    #[test]
    fn test_base_path_prefix_is_kept() {
        let config = Config {
            api_endpoint: "http://analyzer.local/api".to_string(),
            ..Config::default()
        };
        let client = ApiClient::new(&config, Session::in_memory()).unwrap();

        assert_eq!(
            client.endpoint("/query/3").unwrap().as_str(),
            "http://analyzer.local/api/query/3"
        );
        assert_eq!(client.endpoint("/").unwrap().as_str(), "http://analyzer.local/api/");
    }

    #[test]
    fn test_item_endpoint_encodes_id_as_one_segment() {
        let config = Config {
            api_endpoint: "http://analyzer.local/api".to_string(),
            ..Config::default()
        };
        let client = ApiClient::new(&config, Session::in_memory()).unwrap();

        assert_eq!(
            client.item_endpoint("query", "7").unwrap().as_str(),
            "http://analyzer.local/api/query/7"
        );
        assert_eq!(
            client.item_endpoint("query", "a/b#c?d").unwrap().as_str(),
            "http://analyzer.local/api/query/a%2Fb%23c%3Fd"
        );
        assert_eq!(
            client.item_endpoint("results", "1/../../upload").unwrap().as_str(),
            "http://analyzer.local/api/results/1%2F..%2F..%2Fupload"
        );
        for id in ["", ".", ".."] {
            assert_eq!(
                client.item_endpoint("analyze", id).unwrap_err().kind(),
                ErrorKind::Validation
            );
        }
    }

    #[test]
    fn test_mime_for_extensions() {
        use std::path::Path;
        assert_eq!(mime_for(Path::new("report.PDF")), Some("application/pdf"));
        assert!(mime_for(Path::new("report.docx")).unwrap().contains("wordprocessingml"));
        assert_eq!(mime_for(Path::new("report")), None);
    }
}
