//! Types for pipeline results and errors.

use thiserror::Error;

use crate::credentials::CredentialError;
use crate::process::SequenceError;
use crate::publish::PublishError;
use crate::request::BuildRequest;
use crate::template::TemplateError;

/// Errors that abort a build pipeline.
///
/// Callers get no typed code beyond the variant; the message carries the detail.
#[derive(Debug, Error)]
pub enum BuildError {
  /// The requesting user's credential could not be looked up. No step ran.
  #[error("credential lookup failed for user {user}: {source}")]
  Credential {
    user: String,
    #[source]
    source: CredentialError,
  },

  /// A step template could not be expanded. No step ran.
  #[error("template error: {0}")]
  Template(#[from] TemplateError),

  /// A build step failed. Later steps and publishing were skipped.
  #[error(transparent)]
  Step(#[from] SequenceError),

  /// The built site could not be published.
  #[error(transparent)]
  Publish(#[from] PublishError),
}

/// The outcome of one pipeline run, always carrying the request it ran for.
#[derive(Debug)]
pub enum PipelineResult {
  Success(BuildRequest),
  Failure { error: BuildError, request: BuildRequest },
}

impl PipelineResult {
  pub fn is_success(&self) -> bool {
    matches!(self, PipelineResult::Success(_))
  }

  pub fn request(&self) -> &BuildRequest {
    match self {
      PipelineResult::Success(request) => request,
      PipelineResult::Failure { request, .. } => request,
    }
  }

  pub fn error(&self) -> Option<&BuildError> {
    match self {
      PipelineResult::Success(_) => None,
      PipelineResult::Failure { error, .. } => Some(error),
    }
  }

  /// Split into the error (if any) and the request, like a completion callback.
  pub fn into_parts(self) -> (Option<BuildError>, BuildRequest) {
    match self {
      PipelineResult::Success(request) => (None, request),
      PipelineResult::Failure { error, request } => (Some(error), request),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::util::testutil::sample_request;

  #[test]
  fn success_parts() {
    let result = PipelineResult::Success(sample_request("main"));
    assert!(result.is_success());
    assert!(result.error().is_none());

    let (error, request) = result.into_parts();
    assert!(error.is_none());
    assert_eq!(request, sample_request("main"));
  }

  #[test]
  fn failure_keeps_request() {
    let result = PipelineResult::Failure {
      error: BuildError::Template(TemplateError::UnknownToken("x".to_string())),
      request: sample_request("feature-x"),
    };

    assert!(!result.is_success());
    assert_eq!(result.request().branch, "feature-x");
    assert_eq!(result.error().unwrap().to_string(), "template error: unknown token: x");

    let (error, request) = result.into_parts();
    assert!(matches!(error, Some(BuildError::Template(_))));
    assert_eq!(request.branch, "feature-x");
  }
}
