//! Build request types.

use serde::{Deserialize, Serialize};

/// The site a build belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
  /// Owning organization or account.
  pub owner: String,

  /// Repository name.
  pub repository: String,

  /// The production branch. Every other branch is a preview.
  pub default_branch: String,

  /// Custom domain serving the default branch, if any.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub domain: Option<String>,

  /// Free-form generator configuration, passed through verbatim.
  #[serde(default)]
  pub config: String,
}

impl Site {
  /// Whether a non-empty custom domain is configured.
  pub fn has_custom_domain(&self) -> bool {
    self.domain.as_deref().is_some_and(|d| !d.trim().is_empty())
  }
}

/// The user who requested a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id: String,
}

/// One build of one branch of a site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRequest {
  /// Caller-supplied correlation id. Only used for logging.
  #[serde(default)]
  pub id: String,

  pub site: Site,

  /// The branch being built.
  pub branch: String,

  pub user: User,
}

impl BuildRequest {
  /// Whether this build is of the site's default (production) branch.
  pub fn is_default_branch(&self) -> bool {
    self.branch == self.site.default_branch
  }
}
