//! Publishing of built sites.
//!
//! Exactly one of two policies applies, chosen from static configuration:
//! - `Remote`: hand the destination directory to a [`RemoteSync`] under the
//!   site's prefix. Nothing is copied locally.
//! - `LocalCopy`: replace the site's directory in the local publish tree with
//!   a copy of the destination directory.

pub mod remote;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::config::BuildConfig;
use crate::process::{ProcessRunner, SequenceError, run_sequence};
use crate::request::BuildRequest;
use crate::template::{StepTemplate, TemplateError, expand_steps};
use crate::tokens::TokenSet;

pub use remote::CommandSync;

/// What to sync and where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncDescriptor {
  /// `<rootSegment>/<owner>/<repository><branchSuffix>`
  pub prefix: String,
  /// The built site.
  pub directory: PathBuf,
}

impl SyncDescriptor {
  pub fn from_tokens(tokens: &TokenSet) -> Self {
    Self {
      prefix: tokens.site_prefix(),
      directory: PathBuf::from(&tokens.destination_path),
    }
  }
}

/// Errors reported by a remote sync target.
#[derive(Debug, Error)]
pub enum SyncError {
  /// The sync command could not be built from its templates.
  #[error("invalid sync arguments: {0}")]
  Template(#[from] TemplateError),

  /// The sync process failed.
  #[error(transparent)]
  Step(#[from] crate::process::StepError),
}

/// Uploads a built site to a remote host.
#[async_trait]
pub trait RemoteSync: Send + Sync {
  async fn sync(&self, descriptor: &SyncDescriptor) -> Result<(), SyncError>;
}

/// Errors from the publish step.
#[derive(Debug, Error)]
pub enum PublishError {
  #[error("remote sync to {target} failed: {source}")]
  Sync {
    target: String,
    #[source]
    source: SyncError,
  },

  #[error("local publish failed: {0}")]
  Copy(#[from] SequenceError),

  #[error("local publish failed: {0}")]
  Template(#[from] TemplateError),
}

/// Steps that replace a site's directory in the local publish tree.
pub const LOCAL_PUBLISH_STEPS: &[StepTemplate] = &[
  StepTemplate::RemoveDir("${publishPath}"),
  StepTemplate::CreateDir("${publishPath}"),
  StepTemplate::CopyDir {
    from: "${destinationPath}",
    to: "${publishPath}",
    exclude: &[],
  },
];

/// Which publish policy is in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishPolicy {
  Remote,
  LocalCopy,
}

impl fmt::Display for PublishPolicy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PublishPolicy::Remote => f.write_str("remote"),
      PublishPolicy::LocalCopy => f.write_str("local"),
    }
  }
}

/// Dispatches a built site to its publish target.
#[derive(Clone)]
pub struct Publisher {
  remote: Option<(String, Arc<dyn RemoteSync>)>,
}

impl Publisher {
  /// Publish by copying into the local publish tree.
  pub fn local() -> Self {
    Self { remote: None }
  }

  /// Publish through `sync`. `name` identifies the target in logs and errors.
  pub fn remote(name: impl Into<String>, sync: Arc<dyn RemoteSync>) -> Self {
    Self {
      remote: Some((name.into(), sync)),
    }
  }

  /// Pick the policy from configuration: a configured remote target wins.
  pub fn from_config(config: &BuildConfig) -> Self {
    match &config.remote {
      Some(target) => Self::remote(
        target.name.clone(),
        Arc::new(CommandSync::new(target.clone(), config.working_dir.clone())),
      ),
      None => Self::local(),
    }
  }

  pub fn policy(&self) -> PublishPolicy {
    if self.remote.is_some() {
      PublishPolicy::Remote
    } else {
      PublishPolicy::LocalCopy
    }
  }

  /// Publish the build described by `tokens`.
  ///
  /// Local copies run through `runner` like any build step.
  pub async fn publish(
    &self,
    tokens: &TokenSet,
    request: &BuildRequest,
    runner: &dyn ProcessRunner,
  ) -> Result<(), PublishError> {
    match &self.remote {
      Some((target, sync)) => {
        let descriptor = SyncDescriptor::from_tokens(tokens);
        info!(id = %request.id, target = %target, prefix = %descriptor.prefix, "publishing to remote");

        sync.sync(&descriptor).await.map_err(|source| PublishError::Sync {
          target: target.clone(),
          source,
        })
      }
      None => {
        info!(id = %request.id, path = %tokens.publish_path, "publishing to local tree");

        let steps = expand_steps(LOCAL_PUBLISH_STEPS, tokens)?;
        run_sequence(runner, &steps).await?;
        Ok(())
      }
    }
  }
}

impl fmt::Debug for Publisher {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let target = self.remote.as_ref().map(|(name, _)| name.as_str());
    f.debug_struct("Publisher")
      .field("policy", &self.policy())
      .field("target", &target)
      .finish()
  }
}
