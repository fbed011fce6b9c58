//! Access credential lookup.
//!
//! The pipeline asks a [`CredentialStore`] for the requesting user's access
//! token before anything runs. A lookup error aborts the build; a user with no
//! credential builds with an empty token, which is enough for public repositories.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::consts::REDACTED;

/// An access credential. `Debug` never shows the token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
  access_token: String,
}

impl Credential {
  pub fn new(access_token: impl Into<String>) -> Self {
    Self {
      access_token: access_token.into(),
    }
  }

  pub fn access_token(&self) -> &str {
    &self.access_token
  }
}

impl fmt::Debug for Credential {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Credential").field("access_token", &REDACTED).finish()
  }
}

/// Errors that can occur during credential lookup.
#[derive(Debug, Error)]
pub enum CredentialError {
  /// The credentials file could not be read.
  #[error("failed to read credentials {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The credentials file is not a JSON object of user id to token.
  #[error("invalid credentials {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  /// The backing store could not answer.
  #[error("credential store unavailable: {0}")]
  Unavailable(String),
}

/// Looks up a user's access credential.
#[async_trait]
pub trait CredentialStore: Send + Sync {
  /// Returns `Ok(None)` when the user simply has no credential.
  async fn lookup(&self, user_id: &str) -> Result<Option<Credential>, CredentialError>;
}

/// A store with no credentials. Every build is unauthenticated.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCredentials;

#[async_trait]
impl CredentialStore for NoCredentials {
  async fn lookup(&self, _user_id: &str) -> Result<Option<Credential>, CredentialError> {
    Ok(None)
  }
}

/// An in-memory store.
#[derive(Default, Clone)]
pub struct StaticCredentials {
  tokens: HashMap<String, String>,
}

impl StaticCredentials {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_token(mut self, user_id: impl Into<String>, token: impl Into<String>) -> Self {
    self.tokens.insert(user_id.into(), token.into());
    self
  }
}

#[async_trait]
impl CredentialStore for StaticCredentials {
  async fn lookup(&self, user_id: &str) -> Result<Option<Credential>, CredentialError> {
    Ok(self.tokens.get(user_id).map(Credential::new))
  }
}

/// A store backed by a JSON file: `{ "<user id>": "<token>", ... }`.
///
/// The file is read on every lookup, so rotated tokens are picked up without
/// a restart and a missing or broken file fails the build that needed it.
#[derive(Debug, Clone)]
pub struct FileCredentials {
  path: PathBuf,
}

impl FileCredentials {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }
}

#[async_trait]
impl CredentialStore for FileCredentials {
  async fn lookup(&self, user_id: &str) -> Result<Option<Credential>, CredentialError> {
    let content = tokio::fs::read_to_string(&self.path)
      .await
      .map_err(|source| CredentialError::Read {
        path: self.path.clone(),
        source,
      })?;

    let mut tokens: HashMap<String, String> =
      serde_json::from_str(&content).map_err(|source| CredentialError::Parse {
        path: self.path.clone(),
        source,
      })?;

    Ok(tokens.remove(user_id).map(Credential::new))
  }
}
