//! Stored Google bearer token.
//!
//! calbulk does not run an OAuth flow. `calbulk login` stores an access token
//! obtained elsewhere (e.g. `gcloud auth print-access-token`) in
//! `~/.config/calbulk/session.toml`, and every batch reads it back through
//! [`SessionTokenProvider`]. Expired sessions are reported, never renewed.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use calbulk_core::{AuthError, AuthorizationProvider, BearerToken};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub fn base_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Could not determine config directory")?
        .join("calbulk"))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct SessionData {
    access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    account_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct Session {
    path: PathBuf,
    data: SessionData,
}

impl Session {
    pub fn default_path() -> Result<PathBuf> {
        Ok(base_dir()?.join("session.toml"))
    }

    /// A session expiring `expires_in_secs` from now, or never when `None`.
    pub fn new(
        path: impl Into<PathBuf>,
        access_token: &str,
        account_email: Option<String>,
        expires_in_secs: Option<i64>,
    ) -> Self {
        Session {
            path: path.into(),
            data: SessionData {
                access_token: access_token.to_string(),
                account_email,
                expires_at: expires_in_secs.map(|secs| Utc::now() + Duration::seconds(secs)),
            },
        }
    }

    /// `Ok(None)` when nobody has signed in yet.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read session from {}", path.display()))?;

        let data: SessionData = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse session from {}", path.display()))?;

        Ok(Some(Session {
            path: path.to_path_buf(),
            data,
        }))
    }

    pub fn save(&self) -> Result<()> {
        let contents = toml::to_string_pretty(&self.data).context("Failed to serialize session")?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        std::fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write session to {}", self.path.display()))?;

        // Owner-only: the file holds a live bearer token.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("Failed to set permissions on {}", self.path.display()))?;
        }

        Ok(())
    }

    /// Delete the session file. Returns whether there was one.
    pub fn remove(path: &Path) -> Result<bool> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to remove session {}", path.display()))
            }
        }
    }

    pub fn is_expired(&self) -> bool {
        self.data
            .expires_at
            .is_some_and(|expires_at| Utc::now() >= expires_at)
    }

    pub fn account_email(&self) -> Option<&str> {
        self.data.account_email.as_deref()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.data.expires_at
    }

    pub fn token(&self) -> BearerToken {
        BearerToken::new(self.data.access_token.clone())
    }
}

/// Hands out the stored session's token.
#[derive(Debug, Clone)]
pub struct SessionTokenProvider {
    path: PathBuf,
}

impl SessionTokenProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SessionTokenProvider { path: path.into() }
    }
}

#[async_trait]
impl AuthorizationProvider for SessionTokenProvider {
    /// There is nothing to prompt for in a terminal session, so `interactive`
    /// does not change the outcome.
    async fn get_token(&self, _interactive: bool) -> Result<BearerToken, AuthError> {
        let session = Session::load(&self.path)
            .map_err(|e| AuthError::Provider(format!("{:#}", e)))?
            .ok_or(AuthError::NotSignedIn)?;

        if session.is_expired() {
            let who = session.account_email().unwrap_or("this account").to_string();
            return Err(AuthError::Expired(who));
        }

        Ok(session.token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_saved_session_provides_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calbulk").join("session.toml");

        Session::new(&path, "ya29.token", Some("me@example.com".into()), Some(3600))
            .save()
            .unwrap();

        let loaded = Session::load(&path).unwrap().unwrap();
        assert_eq!(loaded.account_email(), Some("me@example.com"));
        assert!(!loaded.is_expired());

        let token = SessionTokenProvider::new(&path).get_token(false).await.unwrap();
        assert_eq!(token.as_str(), "ya29.token");
    }

    #[tokio::test]
    async fn test_missing_session_is_not_signed_in() {
        let dir = tempfile::tempdir().unwrap();
        let provider = SessionTokenProvider::new(dir.path().join("session.toml"));

        assert_eq!(provider.get_token(true).await, Err(AuthError::NotSignedIn));
    }

    #[tokio::test]
    async fn test_expired_session_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.toml");
        Session::new(&path, "old", Some("me@example.com".into()), Some(-60))
            .save()
            .unwrap();

        assert_eq!(
            SessionTokenProvider::new(&path).get_token(true).await,
            Err(AuthError::Expired("me@example.com".into()))
        );
    }

    #[tokio::test]
    async fn test_corrupt_session_is_a_provider_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.toml");
        std::fs::write(&path, "access_token = ").unwrap();

        let result = SessionTokenProvider::new(&path).get_token(true).await;
        assert!(matches!(result, Err(AuthError::Provider(_))));
    }

    #[test]
    fn test_session_without_expiry_never_expires() {
        let session = Session::new("/tmp/unused.toml", "token", None, None);
        assert!(!session.is_expired());
        assert_eq!(session.expires_at(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_session_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.toml");
        Session::new(&path, "token", None, None).save().unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        assert!(Session::remove(&path).unwrap());
        assert!(!Session::remove(&path).unwrap());
    }
}
