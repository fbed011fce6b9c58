//! Static build configuration.
//!
//! Read once at startup and handed to the [`Builder`](crate::pipeline::Builder)
//! explicitly. Nothing in the crate consults process-wide state after that, so
//! independent builders with distinct roots can run side by side.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::consts::{ENV_PUBLISH_DIR, ENV_TEMP_DIR, ENV_WORKING_DIR};

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// The config file could not be read.
  #[error("failed to read config {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The config file is not valid JSON for [`BuildConfig`].
  #[error("invalid config {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },
}

/// A remote synchronization target.
///
/// The program is run with `args` after `${prefix}` and `${directory}` have
/// been substituted from the [`SyncDescriptor`](crate::publish::SyncDescriptor).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteTarget {
  /// Human-readable name, used in logs.
  pub name: String,
  /// Program to invoke.
  pub program: String,
  /// Argument templates.
  #[serde(default)]
  pub args: Vec<String>,
}

/// Build orchestration configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildConfig {
  /// Root for per-build source and destination directories.
  pub temp_dir: PathBuf,

  /// Root of the local publish tree.
  pub publish_dir: PathBuf,

  /// Directory steps run in. Path tokens are relative to it.
  pub working_dir: PathBuf,

  /// Remote sync target. When present, builds are synced instead of copied
  /// into `publish_dir`.
  pub remote: Option<RemoteTarget>,

  /// JSON file mapping user ids to access tokens.
  pub credentials_file: Option<PathBuf>,
}

impl Default for BuildConfig {
  fn default() -> Self {
    Self {
      temp_dir: PathBuf::from("tmp"),
      publish_dir: PathBuf::from("public"),
      working_dir: PathBuf::from("."),
      remote: None,
      credentials_file: None,
    }
  }
}

impl BuildConfig {
  /// Load configuration from a JSON file. Missing fields take their defaults.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;

    let config: BuildConfig = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })?;

    debug!(path = %path.display(), "loaded build config");
    Ok(config)
  }

  /// Apply `SITEBUILD_*` environment overrides on top of this configuration.
  ///
  /// Empty values are ignored.
  pub fn with_env_overrides(mut self) -> Self {
    if let Some(dir) = env_path(ENV_TEMP_DIR) {
      self.temp_dir = dir;
    }
    if let Some(dir) = env_path(ENV_PUBLISH_DIR) {
      self.publish_dir = dir;
    }
    if let Some(dir) = env_path(ENV_WORKING_DIR) {
      self.working_dir = dir;
    }
    self
  }
}

fn env_path(var: &str) -> Option<PathBuf> {
  std::env::var_os(var).filter(|v| !v.is_empty()).map(PathBuf::from)
}
