use serde::{Deserialize, Serialize};

/// Sent by the `json` login contract when the caller gave no password.
/// The backend requires the field but does not check it.
pub const PLACEHOLDER_PASSWORD: &str = "password_is_ignored";

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    #[allow(dead_code)]
    pub token_type: Option<String>,
}
