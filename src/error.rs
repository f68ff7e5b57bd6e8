use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by [`crate::api::ApiClient`] and the session store.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Not authorized: {}", .detail.as_deref().unwrap_or("session rejected by server"))]
    Unauthorized { detail: Option<String> },

    #[error("Server returned {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Server {
        status: StatusCode,
        detail: Option<String>,
    },

    #[error("Backend unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Analysis of document {id} did not finish within {seconds} seconds")]
    TimedOut { id: String, seconds: u64 },

    #[error("Session storage error: {0}")]
    Storage(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Coarse classification that flows match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Unauthorized,
    Server,
    Unreachable,
    Decode,
    Local,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Validation(_) => ErrorKind::Validation,
            ApiError::Unauthorized { .. } => ErrorKind::Unauthorized,
            ApiError::Server { .. } => ErrorKind::Server,
            ApiError::Unreachable(_) => ErrorKind::Unreachable,
            ApiError::Decode(_) => ErrorKind::Decode,
            ApiError::Endpoint(_)
            | ApiError::Io { .. }
            | ApiError::Storage(_)
            | ApiError::TimedOut { .. }
            | ApiError::Http(_) => ErrorKind::Local,
        }
    }

    /// The server-provided `detail` message, if the error body carried one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { detail } | ApiError::Server { detail, .. } => {
                detail.as_deref()
            }
            _ => None,
        }
    }

    /// Build an error from a non-2xx response.
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let detail = extract_detail(body);
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized { detail },
            status => ApiError::Server { status, detail },
        }
    }
}

/// Pull `detail` out of an error body.
///
/// FastAPI sends either a plain string or, for request validation failures,
/// an array of objects with a `msg` field.
fn extract_detail(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        serde_json::Value::Null | serde_json::Value::String(_) => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_carries_detail() {
        let err = ApiError::from_response(
            StatusCode::UNAUTHORIZED,
            br#"{"detail": "Could not validate credentials"}"#,
        );
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert_eq!(err.detail(), Some("Could not validate credentials"));
    }

    #[test]
    fn test_forbidden_is_unauthorized() {
        let err = ApiError::from_response(StatusCode::FORBIDDEN, b"");
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert_eq!(err.detail(), None);
    }

    #[test]
    fn test_validation_array_detail_is_joined() {
        let body = br#"{"detail": [{"loc": ["body", "username"], "msg": "field required"},
                                   {"loc": ["body", "password"], "msg": "field required"}]}"#;
        let err = ApiError::from_response(StatusCode::UNPROCESSABLE_ENTITY, body);
        assert_eq!(err.kind(), ErrorKind::Server);
        assert_eq!(err.detail(), Some("field required; field required"));
    }

    #[test]
    fn test_non_json_body_has_no_detail() {
        let err = ApiError::from_response(StatusCode::BAD_GATEWAY, b"<html>bad gateway</html>");
        assert_eq!(err.detail(), None);
        assert_eq!(err.to_string(), "Server returned 502 Bad Gateway: no detail");
    }
}
