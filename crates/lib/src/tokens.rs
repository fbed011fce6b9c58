//! Token resolution for a single build.
//!
//! A [`TokenSet`] is derived fresh for every pipeline run from the request, the
//! requesting user's credential, and the static configuration. It is never
//! persisted.
//!
//! # Layout
//!
//! - `sourcePath`: `<tempDir>/source/<owner>/<repository>/<branch>`
//! - `destinationPath`: `<tempDir>/destination/<owner>/<repository>/<branch>`
//! - `publishPath`: `<publishDir>/<rootSegment>/<owner>/<repository><branchSuffix>`
//!
//! Default-branch builds live under the `site` root with no branch suffix.
//! Every other branch is a preview under `preview`, suffixed with `/<branch>`.

use std::fmt;
use std::path::Path;

use crate::config::BuildConfig;
use crate::consts::{EMPTY_BASE_URL, PREVIEW_ROOT, REDACTED, SITE_ROOT};
use crate::credentials::Credential;
use crate::request::BuildRequest;
use crate::template::Resolver;
use crate::util::paths::normalize_relative;

/// Template names of every token.
pub mod keys {
  pub const BRANCH: &str = "branch";
  pub const BRANCH_SUFFIX: &str = "branchSuffix";
  pub const ROOT_SEGMENT: &str = "rootSegment";
  pub const OWNER: &str = "owner";
  pub const REPOSITORY: &str = "repository";
  pub const ACCESS_TOKEN: &str = "accessToken";
  pub const BASE_URL: &str = "baseUrl";
  pub const BASE_URL_VALUE: &str = "baseUrlValue";
  pub const SOURCE_PATH: &str = "sourcePath";
  pub const DESTINATION_PATH: &str = "destinationPath";
  pub const PUBLISH_PATH: &str = "publishPath";
  pub const GENERATOR_CONFIG: &str = "generatorConfig";
}

/// Substitution values for one pipeline run. `Debug` masks the access token.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenSet {
  pub branch: String,
  /// Empty for the default branch, `/<branch>` otherwise.
  pub branch_suffix: String,
  /// `site` for the default branch, `preview` otherwise.
  pub root_segment: String,
  pub owner: String,
  pub repository: String,
  /// Empty when the user has no credential.
  pub access_token: String,
  /// `''` for a default-branch build of a site with a custom domain,
  /// `/<rootSegment>/<owner>/<repository><branchSuffix>` otherwise.
  pub base_url: String,
  pub source_path: String,
  pub destination_path: String,
  pub publish_path: String,
  pub generator_config: String,
}

impl TokenSet {
  /// Derive the tokens for `request`.
  ///
  /// `credential` is the result of the user lookup; `None` builds unauthenticated.
  pub fn resolve(request: &BuildRequest, credential: Option<&Credential>, config: &BuildConfig) -> Self {
    let default_branch = request.is_default_branch();

    let site = &request.site;
    let branch = request.branch.clone();
    let owner = site.owner.clone();
    let repository = site.repository.clone();

    let (root_segment, branch_suffix) = if default_branch {
      (SITE_ROOT.to_string(), String::new())
    } else {
      (PREVIEW_ROOT.to_string(), format!("/{}", branch))
    };

    let base_url = if site.has_custom_domain() && default_branch {
      EMPTY_BASE_URL.to_string()
    } else {
      format!("/{}/{}/{}{}", root_segment, owner, repository, branch_suffix)
    };

    let temp_dir = path_text(&config.temp_dir);
    let source_path = normalize_relative(&format!("{}/source/{}/{}/{}", temp_dir, owner, repository, branch));
    let destination_path = normalize_relative(&format!("{}/destination/{}/{}/{}", temp_dir, owner, repository, branch));
    let publish_path = normalize_relative(&format!(
      "{}/{}/{}/{}{}",
      path_text(&config.publish_dir),
      root_segment,
      owner,
      repository,
      branch_suffix
    ));

    Self {
      branch,
      branch_suffix,
      root_segment,
      owner,
      repository,
      access_token: credential.map(|c| c.access_token().to_string()).unwrap_or_default(),
      base_url,
      source_path,
      destination_path,
      publish_path,
      generator_config: site.config.clone(),
    }
  }

  /// The base URL without the quoted-empty sentinel, for argument vectors
  /// where no shell strips the quotes.
  pub fn base_url_value(&self) -> &str {
    if self.base_url == EMPTY_BASE_URL { "" } else { &self.base_url }
  }

  /// `<rootSegment>/<owner>/<repository><branchSuffix>`, the remote sync prefix.
  pub fn site_prefix(&self) -> String {
    format!(
      "{}/{}/{}{}",
      self.root_segment, self.owner, self.repository, self.branch_suffix
    )
  }

  /// Look up a token by its template name.
  pub fn get(&self, name: &str) -> Option<&str> {
    let value = match name {
      keys::BRANCH => &self.branch,
      keys::BRANCH_SUFFIX => &self.branch_suffix,
      keys::ROOT_SEGMENT => &self.root_segment,
      keys::OWNER => &self.owner,
      keys::REPOSITORY => &self.repository,
      keys::ACCESS_TOKEN => &self.access_token,
      keys::BASE_URL => &self.base_url,
      keys::BASE_URL_VALUE => return Some(self.base_url_value()),
      keys::SOURCE_PATH => &self.source_path,
      keys::DESTINATION_PATH => &self.destination_path,
      keys::PUBLISH_PATH => &self.publish_path,
      keys::GENERATOR_CONFIG => &self.generator_config,
      _ => return None,
    };
    Some(value.as_str())
  }
}

impl Resolver for TokenSet {
  fn resolve(&self, name: &str) -> Option<&str> {
    self.get(name)
  }
}

impl fmt::Debug for TokenSet {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let access_token = if self.access_token.is_empty() { "" } else { REDACTED };
    f.debug_struct("TokenSet")
      .field("branch", &self.branch)
      .field("branch_suffix", &self.branch_suffix)
      .field("root_segment", &self.root_segment)
      .field("owner", &self.owner)
      .field("repository", &self.repository)
      .field("access_token", &access_token)
      .field("base_url", &self.base_url)
      .field("source_path", &self.source_path)
      .field("destination_path", &self.destination_path)
      .field("publish_path", &self.publish_path)
      .field("generator_config", &self.generator_config)
      .finish()
  }
}

fn path_text(path: &Path) -> String {
  path.to_string_lossy().into_owned()
}
