//! Build pipelines.
//!
//! This module provides the entry points for building and publishing a site:
//! - Credential lookup for the requesting user
//! - Token resolution and step expansion for the selected [`Engine`]
//! - Strictly sequential step execution, aborting at the first failure
//! - Publishing through the configured [`Publisher`]
//!
//! Every entry point reports exactly one [`PipelineResult`], which carries the
//! request it ran for whether the build succeeded or not. Filesystem changes made
//! by steps before a failure are left in place; every engine starts by cleaning
//! its working directories so a retry does not depend on them.

pub mod engine;
pub mod types;

use std::sync::Arc;

use tracing::{Instrument, error, info, info_span};

use crate::config::BuildConfig;
use crate::credentials::CredentialStore;
use crate::process::{ProcessRunner, Step, SystemRunner, run_sequence};
use crate::publish::Publisher;
use crate::request::BuildRequest;
use crate::tokens::TokenSet;

pub use engine::{Engine, UnknownEngine};
pub use types::{BuildError, PipelineResult};

/// Builds and publishes sites.
///
/// A `Builder` holds only immutable configuration and shared collaborators, so
/// one instance can drive any number of concurrent builds. Builds of the same
/// owner, repository and branch share directories and must not overlap.
#[derive(Clone)]
pub struct Builder {
  config: Arc<BuildConfig>,
  credentials: Arc<dyn CredentialStore>,
  runner: Arc<dyn ProcessRunner>,
  publisher: Publisher,
}

impl Builder {
  /// Create a builder with the publish policy taken from `config`.
  pub fn new(config: BuildConfig, credentials: Arc<dyn CredentialStore>, runner: Arc<dyn ProcessRunner>) -> Self {
    let publisher = Publisher::from_config(&config);
    Self {
      config: Arc::new(config),
      credentials,
      runner,
      publisher,
    }
  }

  /// Create a builder that runs steps on the real system in `config.working_dir`.
  pub fn with_system_runner(config: BuildConfig, credentials: Arc<dyn CredentialStore>) -> Self {
    let runner = Arc::new(SystemRunner::new(config.working_dir.clone()));
    Self::new(config, credentials, runner)
  }

  /// Replace the publisher chosen from configuration.
  pub fn with_publisher(mut self, publisher: Publisher) -> Self {
    self.publisher = publisher;
    self
  }

  pub fn config(&self) -> &BuildConfig {
    &self.config
  }

  pub fn publisher(&self) -> &Publisher {
    &self.publisher
  }

  /// Build with the static engine.
  pub async fn static_site(&self, request: BuildRequest) -> PipelineResult {
    self.build(Engine::Static, request).await
  }

  /// Build with the Jekyll engine.
  pub async fn jekyll(&self, request: BuildRequest) -> PipelineResult {
    self.build(Engine::Jekyll, request).await
  }

  /// Build with the Hugo engine.
  pub async fn hugo(&self, request: BuildRequest) -> PipelineResult {
    self.build(Engine::Hugo, request).await
  }

  /// Run the full pipeline for `engine`, then publish.
  pub async fn build(&self, engine: Engine, request: BuildRequest) -> PipelineResult {
    let span = info_span!(
      "build",
      id = %request.id,
      engine = %engine,
      owner = %request.site.owner,
      repository = %request.site.repository,
      branch = %request.branch,
    );

    let outcome = self.run(engine, &request).instrument(span.clone()).await;

    match outcome {
      Ok(()) => {
        span.in_scope(|| info!("build published"));
        PipelineResult::Success(request)
      }
      Err(error) => {
        span.in_scope(|| error!(error = %error, "build failed"));
        PipelineResult::Failure { error, request }
      }
    }
  }

  /// Resolve and expand the steps `engine` would run, without running them.
  ///
  /// Credential lookup still happens, so a failing store fails the plan too.
  pub async fn plan(&self, engine: Engine, request: &BuildRequest) -> Result<Vec<Step>, BuildError> {
    let tokens = self.resolve_tokens(request).await?;
    Ok(engine.expand(&tokens)?)
  }

  async fn resolve_tokens(&self, request: &BuildRequest) -> Result<TokenSet, BuildError> {
    let credential = self
      .credentials
      .lookup(&request.user.id)
      .await
      .map_err(|source| BuildError::Credential {
        user: request.user.id.clone(),
        source,
      })?;

    if credential.is_none() {
      info!(user = %request.user.id, "no credential for user, cloning unauthenticated");
    }

    Ok(TokenSet::resolve(request, credential.as_ref(), &self.config))
  }

  async fn run(&self, engine: Engine, request: &BuildRequest) -> Result<(), BuildError> {
    let tokens = self.resolve_tokens(request).await?;
    let steps = engine.expand(&tokens)?;

    info!(steps = steps.len(), publish = %self.publisher.policy(), "starting build");

    run_sequence(self.runner.as_ref(), &steps).await?;

    info!(destination = %tokens.destination_path, "build complete, publishing");

    self.publisher.publish(&tokens, request, self.runner.as_ref()).await?;
    Ok(())
  }
}
