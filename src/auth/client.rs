use reqwest::Method;

use super::models::{Credentials, LoginResponse};
use crate::api::{ApiClient, Payload};
use crate::config::LoginContract;
use crate::error::ApiError;

impl ApiClient {
    /// Exchange credentials for an access token.
    ///
    /// Does not touch the session; storing the token is the caller's job.
    pub async fn login(
        &self,
        contract: LoginContract,
        credentials: &Credentials,
    ) -> Result<LoginResponse, ApiError> {
        tracing::info!(
            contract = %contract,
            username = %credentials.username,
            "Attempting login to {}",
            self.base_url()
        );

        match contract {
            LoginContract::Json => {
                self.request(
                    Method::POST,
                    "/auth/login",
                    Payload::Json(serde_json::to_value(credentials)?),
                )
                .await
            }
            LoginContract::Form => {
                let fields = vec![
                    ("username".to_string(), credentials.username.clone()),
                    ("password".to_string(), credentials.password.clone()),
                ];
                self.request(Method::POST, "/auth/token", Payload::Form(fields))
                    .await
            }
        }
    }

    pub async fn register(&self, credentials: &Credentials) -> Result<(), ApiError> {
        tracing::info!(username = %credentials.username, "Registering user");
        self.send(
            Method::POST,
            "/auth/register",
            Payload::Json(serde_json::to_value(credentials)?),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::client_for;
    use crate::auth::models::Credentials;
    use crate::auth::Session;
    use crate::config::LoginContract;
    use crate::error::ErrorKind;
    use mockito::Matcher;
    use serde_json::json;

    fn credentials(username: &str, password: &str) -> Credentials {
        Credentials {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_json_login() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/auth/login")
            .match_body(Matcher::Json(json!({
                "username": "admin@example.com",
                "password": "secret"
            })))
            .with_status(200)
            .with_body(r#"{"access_token": "abc123", "token_type": "bearer"}"#)
            .create_async()
            .await;

        let client = client_for(&server, Session::in_memory());
        let response = client
            .login(LoginContract::Json, &credentials("admin@example.com", "secret"))
            .await
            .unwrap();

        assert_eq!(response.access_token, "abc123");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_form_login() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/auth/token")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("username".into(), "analyst".into()),
                Matcher::UrlEncoded("password".into(), "hunter2".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"access_token": "form-token"}"#)
            .create_async()
            .await;

        let client = client_for(&server, Session::in_memory());
        let response = client
            .login(LoginContract::Form, &credentials("analyst", "hunter2"))
            .await
            .unwrap();

        assert_eq!(response.access_token, "form-token");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_register_surfaces_detail() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/register")
            .with_status(400)
            .with_body(r#"{"detail": "Username already registered"}"#)
            .create_async()
            .await;

        let client = client_for(&server, Session::in_memory());
        let err = client
            .register(&credentials("analyst", "hunter2"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Server);
        assert_eq!(err.detail(), Some("Username already registered"));
    }
}
