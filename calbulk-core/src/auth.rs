//! Authorization collaborator.
//!
//! The engine never signs anyone in. It asks an `AuthorizationProvider` for a
//! bearer token once per batch and treats any `AuthError` as fatal for that
//! call.

use async_trait::async_trait;
use thiserror::Error;

/// An OAuth bearer token. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        BearerToken(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthError {
    #[error("no signed-in account; sign in first")]
    NotSignedIn,

    #[error("stored session for {0} has expired")]
    Expired(String),

    #[error("{0}")]
    Provider(String),
}

#[async_trait]
pub trait AuthorizationProvider: Send + Sync {
    /// Return a usable token. `interactive` tells the provider whether it may
    /// prompt the user; the engine always passes `true` for mutating batches.
    async fn get_token(&self, interactive: bool) -> Result<BearerToken, AuthError>;
}

/// Provider backed by a token handed over up front (flag, env var, tests).
#[derive(Clone, Debug, Default)]
pub struct StaticTokenProvider {
    token: Option<BearerToken>,
}

impl StaticTokenProvider {
    pub fn new(token: Option<BearerToken>) -> Self {
        StaticTokenProvider { token }
    }
}

#[async_trait]
impl AuthorizationProvider for StaticTokenProvider {
    async fn get_token(&self, _interactive: bool) -> Result<BearerToken, AuthError> {
        self.token.clone().ok_or(AuthError::NotSignedIn)
    }
}
