/// Application name, used as the binary name.
pub const APP_NAME: &str = "sitebuild";

/// Environment variable overriding the temporary build root.
pub const ENV_TEMP_DIR: &str = "SITEBUILD_TEMP_DIR";

/// Environment variable overriding the publish root.
pub const ENV_PUBLISH_DIR: &str = "SITEBUILD_PUBLISH_DIR";

/// Environment variable overriding the working directory steps run in.
pub const ENV_WORKING_DIR: &str = "SITEBUILD_WORKING_DIR";

/// Root segment for builds of a site's default branch.
pub const SITE_ROOT: &str = "site";

/// Root segment for builds of any other branch.
pub const PREVIEW_ROOT: &str = "preview";

/// Base URL written when a custom domain serves the default branch.
///
/// It is an empty YAML string, so generators fall back to the domain root.
pub const EMPTY_BASE_URL: &str = "''";

/// Mask shown in place of secrets in rendered steps.
pub const REDACTED: &str = "***";
