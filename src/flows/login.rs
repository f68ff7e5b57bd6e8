use std::sync::Arc;

use super::Route;
use crate::api::ApiClient;
use crate::auth::models::{Credentials, PLACEHOLDER_PASSWORD};
use crate::config::LoginContract;
use crate::error::ApiError;

pub const LOGIN_FALLBACK_MESSAGE: &str = "Login failed. Invalid username.";
pub const USERNAME_REQUIRED: &str = "Username is required.";
pub const PASSWORD_REQUIRED: &str = "Password is required.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginState {
    Idle,
    Submitting,
    Authenticated,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Rejected locally; nothing was sent.
    Invalid(&'static str),
    Authenticated { route: Route },
    Failed { message: String },
}

/// Login state machine: `Idle -> Submitting -> {Authenticated, Failed}`.
///
/// `submit` borrows the flow mutably, so a second submission cannot start
/// while one is in flight.
pub struct LoginFlow {
    client: Arc<ApiClient>,
    contract: LoginContract,
    state: LoginState,
}

impl LoginFlow {
    pub fn new(client: Arc<ApiClient>, contract: LoginContract) -> Self {
        Self {
            client,
            contract,
            state: LoginState::Idle,
        }
    }

    pub fn state(&self) -> &LoginState {
        &self.state
    }

    /// Whether the caller must collect a password for this backend.
    pub fn requires_password(&self) -> bool {
        self.contract == LoginContract::Form
    }

    pub async fn submit(&mut self, username: &str, password: Option<&str>) -> LoginOutcome {
        let credentials = match self.credentials(username, password) {
            Ok(credentials) => credentials,
            Err(message) => {
                self.state = LoginState::Idle;
                return LoginOutcome::Invalid(message);
            }
        };

        self.state = LoginState::Submitting;

        let result = match self.client.login(self.contract, &credentials).await {
            Ok(response) => self
                .client
                .session()
                .set_token(&response.access_token, Some(&credentials.username)),
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                tracing::info!(username = %credentials.username, "login succeeded");
                self.state = LoginState::Authenticated;
                LoginOutcome::Authenticated {
                    route: Route::Protected,
                }
            }
            Err(e) => {
                tracing::debug!("login failed: {}", e);
                let message = failure_message(&e);
                self.state = LoginState::Failed(message.clone());
                LoginOutcome::Failed { message }
            }
        }
    }

    fn credentials(
        &self,
        username: &str,
        password: Option<&str>,
    ) -> Result<Credentials, &'static str> {
        let username = username.trim();
        if username.is_empty() {
            return Err(USERNAME_REQUIRED);
        }

        let password = match (self.contract, password.filter(|p| !p.is_empty())) {
            (_, Some(p)) => p.to_string(),
            (LoginContract::Json, None) => PLACEHOLDER_PASSWORD.to_string(),
            (LoginContract::Form, None) => return Err(PASSWORD_REQUIRED),
        };

        Ok(Credentials {
            username: username.to_string(),
            password,
        })
    }
}

/// Server detail when present, else the fixed fallback.
fn failure_message(error: &ApiError) -> String {
    error
        .detail()
        .map(str::to_string)
        .unwrap_or_else(|| LOGIN_FALLBACK_MESSAGE.to_string())
}
