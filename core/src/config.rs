//! Client configuration loaded from the environment.
//!
//! `.env` is read first when present. Recognized variables:
//! - `BLOG_API_URL`: API origin including the `/api` prefix.
//! - `BLOG_SESSION_DIR`: directory for the persisted session. Without it the
//!   session lives in memory only.

use std::env;
use std::path::PathBuf;

use crate::session::{FileStorage, SessionStore};
use crate::transport::BlogApi;

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub session_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            session_dir: None,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!(error = %e, "ignoring unreadable .env file");
            }
        }
        Self::from_vars(|key| env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let api_url = var("BLOG_API_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let session_dir = var("BLOG_SESSION_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        Self {
            api_url,
            session_dir,
        }
    }

    pub fn session_store(&self) -> SessionStore {
        match &self.session_dir {
            Some(dir) => SessionStore::new(FileStorage::new(dir)),
            None => SessionStore::in_memory(),
        }
    }

    pub fn connect(&self) -> BlogApi {
        tracing::debug!(api_url = %self.api_url, "configuring blog client");
        BlogApi::with_ureq(&self.api_url, self.session_store())
    }
}
