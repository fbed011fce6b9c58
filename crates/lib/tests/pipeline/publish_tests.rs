//! Publishing through a remote sync command.

use std::sync::Arc;

use sitebuild_lib::{BuildError, CommandSync, PublishError, Publisher, RemoteTarget};

use super::common::{FixtureRunner, TestEnv, request};

#[cfg(unix)]
fn shell_target(script: &str) -> RemoteTarget {
  RemoteTarget {
    name: "mirror".to_string(),
    program: "/bin/sh".to_string(),
    args: vec![
      "-c".to_string(),
      script.to_string(),
      "${directory}".to_string(),
      "remote/${prefix}".to_string(),
    ],
  }
}

#[tokio::test]
#[cfg(unix)]
async fn remote_sync_uploads_destination_under_prefix() {
  let env = TestEnv::new();
  let runner = Arc::new(FixtureRunner::new(env.root()));
  let sync = CommandSync::new(shell_target("mkdir -p \"$1\" && cp -R \"$0/.\" \"$1\""), env.root());
  let builder = env.builder(runner).with_publisher(Publisher::remote("mirror", Arc::new(sync)));

  let result = builder.static_site(request("feature-x")).await;

  assert!(result.is_success(), "{:?}", result.error());
  assert!(env.path("remote/preview/acme/site1/feature-x/index.html").is_file());
  assert!(!env.path("public").exists());
}

#[tokio::test]
#[cfg(unix)]
async fn remote_sync_failure_keeps_destination() {
  let env = TestEnv::new();
  let runner = Arc::new(FixtureRunner::new(env.root()));
  let sync = CommandSync::new(shell_target("exit 23"), env.root());
  let builder = env.builder(runner).with_publisher(Publisher::remote("mirror", Arc::new(sync)));

  let result = builder.static_site(request("main")).await;

  let (error, _) = result.into_parts();
  match error {
    Some(BuildError::Publish(PublishError::Sync { target, .. })) => assert_eq!(target, "mirror"),
    other => panic!("unexpected error: {:?}", other),
  }
  assert!(env.path("tmp/destination/acme/site1/main/index.html").is_file());
  assert!(!env.path("public").exists());
}
