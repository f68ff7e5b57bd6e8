pub mod client;
pub mod models;
pub mod token_store;

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::ApiError;
use self::token_store::{FileTokenStore, MemoryTokenStore, StoredToken, TokenStore};

/// The session context: owner of the single bearer token.
///
/// Built once at startup and handed to the [`crate::api::ApiClient`].
/// The token only changes through [`Session::set_token`] and
/// [`Session::clear_token`].
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn TokenStore>,
}

impl Session {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }

    /// Session persisted to a JSON file.
    pub fn file(path: PathBuf) -> Self {
        Self::new(Arc::new(FileTokenStore::new(path)))
    }

    /// Session that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryTokenStore::new()))
    }

    /// Read the current token from storage.
    ///
    /// An unreadable store counts as "no token". The failure is logged and
    /// the request goes out unauthenticated.
    pub fn token(&self) -> Option<String> {
        match self.store.load() {
            Ok(stored) => stored.map(|s| s.token),
            Err(e) => {
                tracing::warn!("Ignoring unreadable session: {}", e);
                None
            }
        }
    }

    pub fn stored(&self) -> Result<Option<StoredToken>, ApiError> {
        self.store.load()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub fn set_token(&self, token: &str, username: Option<&str>) -> Result<(), ApiError> {
        let stored = StoredToken::new(token, username.map(str::to_string));
        self.store.save(&stored)?;
        tracing::debug!(username = ?username, "session token stored");
        Ok(())
    }

    pub fn clear_token(&self) -> Result<(), ApiError> {
        self.store.clear()?;
        tracing::debug!("session token cleared");
        Ok(())
    }
}
