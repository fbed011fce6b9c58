//! End-to-end builds for each engine.

use std::sync::Arc;

use sitebuild_lib::process::SequenceError;
use sitebuild_lib::{BuildError, Engine};

use super::common::{FixtureRunner, TOKEN, TestEnv, request};

#[tokio::test]
async fn static_build_publishes_repository_without_git_dir() {
  let env = TestEnv::new();
  let runner = Arc::new(FixtureRunner::new(env.root()));

  let result = env.builder(runner.clone()).static_site(request("main")).await;

  assert!(result.is_success(), "{:?}", result.error());
  assert_eq!(runner.programs(), vec!["git"]);

  let published = env.path("public/site/acme/site1");
  assert_eq!(std::fs::read_to_string(published.join("index.html")).unwrap(), "<h1>acme</h1>");
  assert!(published.join("css/site.css").is_file());
  assert!(!published.join(".git").exists());

  assert!(!env.path("tmp/source/acme/site1/main").exists());
  assert!(env.path("tmp/destination/acme/site1/main/index.html").is_file());
}

#[tokio::test]
async fn preview_branch_publishes_under_preview_root() {
  let env = TestEnv::new();
  let runner = Arc::new(FixtureRunner::new(env.root()));

  let result = env.builder(runner).static_site(request("feature-x")).await;

  assert!(result.is_success(), "{:?}", result.error());
  assert!(env.path("public/preview/acme/site1/feature-x/index.html").is_file());
  assert!(!env.path("public/site").exists());
}

#[tokio::test]
async fn jekyll_build_writes_base_config_then_publishes_site_dir() {
  let env = TestEnv::new();
  let runner = Arc::new(FixtureRunner::new(env.root()));

  let result = env.builder(runner.clone()).jekyll(request("feature-x")).await;

  assert!(result.is_success(), "{:?}", result.error());
  assert_eq!(runner.programs(), vec!["git", "jekyll"]);
  assert_eq!(
    std::fs::read_to_string(env.path("public/preview/acme/site1/feature-x/index.html")).unwrap(),
    "<h1>jekyll</h1>"
  );
  assert!(!env.path("tmp/source/acme/site1/feature-x").exists());
}

#[tokio::test]
async fn hugo_build_publishes_public_dir() {
  let env = TestEnv::new();
  let runner = Arc::new(FixtureRunner::new(env.root()));

  let result = env.builder(runner.clone()).hugo(request("main")).await;

  assert!(result.is_success(), "{:?}", result.error());
  assert_eq!(runner.programs(), vec!["git", "hugo"]);
  assert_eq!(
    std::fs::read_to_string(env.path("public/site/acme/site1/index.html")).unwrap(),
    "<h1>hugo</h1>"
  );
}

#[tokio::test]
async fn generator_failure_leaves_publish_tree_untouched() {
  let env = TestEnv::new();
  let runner = Arc::new(FixtureRunner::new(env.root()).failing("hugo"));

  let result = env.builder(runner).build(Engine::Hugo, request("main")).await;

  let (error, request) = result.into_parts();
  assert_eq!(request.branch, "main");
  let message = format!("{:?}", error);
  assert!(!message.contains(TOKEN), "token leaked: {}", message);
  match error {
    Some(BuildError::Step(SequenceError { index, .. })) => assert_eq!(index, 3),
    other => panic!("unexpected error: {:?}", other),
  }

  // the clone is left behind for inspection; the next run cleans it first
  assert!(env.path("tmp/source/acme/site1/main/index.html").is_file());
  assert!(!env.path("tmp/destination/acme/site1/main").exists());
  assert!(!env.path("public").exists());
}

#[tokio::test]
async fn rebuild_replaces_previous_output() {
  let env = TestEnv::new();
  let runner = Arc::new(FixtureRunner::new(env.root()));
  let builder = env.builder(runner);

  assert!(builder.static_site(request("main")).await.is_success());
  std::fs::write(env.path("public/site/acme/site1/stale.html"), "old").unwrap();

  assert!(builder.static_site(request("main")).await.is_success());

  assert!(env.path("public/site/acme/site1/index.html").is_file());
  assert!(!env.path("public/site/acme/site1/stale.html").exists());
}

#[tokio::test]
async fn concurrent_builds_of_different_branches() {
  let env = TestEnv::new();
  let runner = Arc::new(FixtureRunner::new(env.root()));
  let builder = env.builder(runner);

  let (main, preview) = tokio::join!(builder.static_site(request("main")), builder.hugo(request("feature-x")));

  assert!(main.is_success(), "{:?}", main.error());
  assert!(preview.is_success(), "{:?}", preview.error());
  assert!(env.path("public/site/acme/site1/index.html").is_file());
  assert!(env.path("public/preview/acme/site1/feature-x/index.html").is_file());
}
