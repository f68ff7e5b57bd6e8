pub mod analyze;
pub mod auth;
pub mod completions;
pub mod config;
pub mod document;
pub mod query;

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::api::ApiClient;
use crate::auth::Session;
use crate::config::Config;

/// Build the session context and the client that carries it.
pub fn connect(config: &Config) -> Result<Arc<ApiClient>> {
    let session = Session::file(config.session_path()?);
    let client = ApiClient::new(config, session).context("Failed to create HTTP client")?;
    Ok(Arc::new(client))
}
