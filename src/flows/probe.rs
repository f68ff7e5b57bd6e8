use reqwest::StatusCode;
use std::sync::Arc;

use super::Route;
use crate::api::ApiClient;
use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The session is still accepted. Nothing changed.
    Valid,
    /// The server rejected the session; the token was cleared.
    Redirect(Route),
    /// The backend could not be reached. The token is kept.
    Unreachable(String),
    /// The backend answered with a non-auth error. The token is kept.
    Unavailable(StatusCode),
}

/// Checks that the stored session is still good before showing a protected
/// view.
pub struct Probe {
    client: Arc<ApiClient>,
}

impl Probe {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn check(&self) -> ProbeOutcome {
        match self.client.probe().await {
            Ok(()) => ProbeOutcome::Valid,
            Err(ApiError::Unauthorized { detail }) => {
                tracing::info!(detail = ?detail, "session rejected, clearing token");
                if let Err(e) = self.client.session().clear_token() {
                    tracing::warn!("Failed to clear session token: {}", e);
                }
                ProbeOutcome::Redirect(Route::Login)
            }
            Err(ApiError::Server { status, .. }) => {
                tracing::warn!(%status, "probe got a server error, keeping session");
                ProbeOutcome::Unavailable(status)
            }
            Err(e) => {
                tracing::warn!("probe failed, keeping session: {}", e);
                ProbeOutcome::Unreachable(e.to_string())
            }
        }
    }
}
