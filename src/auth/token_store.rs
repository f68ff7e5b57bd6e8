use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::ApiError;

/// The persisted bearer token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredToken {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl StoredToken {
    pub fn new(token: impl Into<String>, username: Option<String>) -> Self {
        Self {
            token: token.into(),
            username,
            created_at: Utc::now(),
        }
    }
}

/// Client-local storage for the single session token.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<StoredToken>, ApiError>;
    fn save(&self, token: &StoredToken) -> Result<(), ApiError>;
    fn clear(&self) -> Result<(), ApiError>;
}

/// JSON file in the user's config directory.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> ApiError {
        ApiError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<StoredToken>, ApiError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        if contents.trim().is_empty() {
            return Ok(None);
        }

        let stored: StoredToken = serde_json::from_str(&contents)
            .map_err(|e| ApiError::Storage(format!("Failed to parse session file: {}", e)))?;

        Ok(Some(stored))
    }

    fn save(&self, token: &StoredToken) -> Result<(), ApiError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;
            }
        }

        let json = serde_json::to_string_pretty(token)?;
        fs::write(&self.path, json).map_err(|e| self.io_error(e))?;

        // Owner read/write only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&self.path)
                .map_err(|e| self.io_error(e))?
                .permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&self.path, perms).map_err(|e| self.io_error(e))?;
        }

        Ok(())
    }

    fn clear(&self) -> Result<(), ApiError> {
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| self.io_error(e))?;
        }
        Ok(())
    }
}

/// Process-local store, used when nothing should touch disk.
#[derive(Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<StoredToken>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<StoredToken>>, ApiError> {
        self.slot
            .lock()
            .map_err(|_| ApiError::Storage("token store lock poisoned".to_string()))
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<StoredToken>, ApiError> {
        Ok(self.lock()?.clone())
    }

    fn save(&self, token: &StoredToken) -> Result<(), ApiError> {
        *self.lock()? = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), ApiError> {
        *self.lock()? = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_means_no_token() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(temp_dir.path().join("session.json"));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_save_load_clear() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(temp_dir.path().join("dir").join("session.json"));

        let stored = StoredToken::new("abc123", Some("admin@example.com".to_string()));
        store.save(&stored).unwrap();

        let loaded = store.load().unwrap().expect("token should be stored");
        assert_eq!(loaded.token, "abc123");
        assert_eq!(loaded.username.as_deref(), Some("admin@example.com"));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        // Clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_save_replaces_previous_token() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(temp_dir.path().join("session.json"));

        store.save(&StoredToken::new("first", None)).unwrap();
        store.save(&StoredToken::new("second", None)).unwrap();

        assert_eq!(store.load().unwrap().unwrap().token, "second");
    }

    #[cfg(unix)]
    #[test]
    fn test_session_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(temp_dir.path().join("session.json"));
        store.save(&StoredToken::new("abc123", None)).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_corrupt_file_is_storage_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();

        let store = FileTokenStore::new(path);
        assert!(matches!(store.load(), Err(ApiError::Storage(_))));
    }
}
