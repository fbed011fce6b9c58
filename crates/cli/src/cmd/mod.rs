mod build;
mod engines;
mod plan;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use sitebuild_lib::{BuildConfig, BuildRequest, CredentialStore, FileCredentials, NoCredentials};

pub use build::cmd_build;
pub use engines::cmd_engines;
pub use plan::cmd_plan;

/// Load the build configuration, apply environment overrides, and pin the
/// working directory to an absolute path.
fn load_config(path: Option<&Path>) -> Result<BuildConfig> {
  let config = match path {
    Some(path) => BuildConfig::load(path).with_context(|| format!("Failed to load config: {}", path.display()))?,
    None => BuildConfig::default(),
  };

  let mut config = config.with_env_overrides();
  config.working_dir = dunce::canonicalize(&config.working_dir)
    .with_context(|| format!("Working directory not found: {}", config.working_dir.display()))?;

  debug!(?config, "effective configuration");
  Ok(config)
}

fn load_request(path: &Path) -> Result<BuildRequest> {
  let content =
    std::fs::read_to_string(path).with_context(|| format!("Failed to read build request: {}", path.display()))?;
  serde_json::from_str(&content).with_context(|| format!("Invalid build request: {}", path.display()))
}

/// Credential files are resolved against the working directory.
fn credential_store(config: &BuildConfig) -> Arc<dyn CredentialStore> {
  match &config.credentials_file {
    Some(file) => Arc::new(FileCredentials::new(config.working_dir.join(file))),
    None => Arc::new(NoCredentials),
  }
}
