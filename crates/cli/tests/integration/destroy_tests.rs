//! Destroy command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn destroy_removes_resources() {
  if cfg!(windows) {
    return;
  }

  let env = TestEnv::from_fixture("file_resource.toml");
  env.cmd().arg("apply").assert().success();
  assert!(env.path("greeting.txt").exists(), "file should exist after apply");

  env
    .cmd()
    .arg("destroy")
    .assert()
    .success()
    .stdout(predicate::str::contains("Destroy complete"));

  assert!(!env.path("greeting.txt").exists(), "file should be removed after destroy");
  assert!(env.state()["resources"].as_object().unwrap().is_empty());
}

#[test]
fn destroy_with_no_state_succeeds() {
  let env = TestEnv::from_fixture("file_resource.toml");

  env
    .cmd()
    .arg("destroy")
    .assert()
    .success()
    .stdout(predicate::str::contains("Nothing to destroy"));
}

#[test]
fn destroy_is_idempotent() {
  if cfg!(windows) {
    return;
  }

  let env = TestEnv::from_fixture("file_resource.toml");
  env.cmd().arg("apply").assert().success();
  env.cmd().arg("destroy").assert().success();

  env
    .cmd()
    .arg("destroy")
    .assert()
    .success()
    .stdout(predicate::str::contains("Nothing to destroy"));
}

#[test]
fn destroy_skips_delete_after_failed_read() {
  if cfg!(windows) {
    return;
  }

  let env = TestEnv::from_fixture("read_fails.toml");
  env.cmd().arg("apply").assert().success();
  env.cmd().arg("refresh").assert().failure();
  assert!(env.state()["resources"]["flaky"]["read_error"].is_string());

  env
    .cmd()
    .arg("destroy")
    .assert()
    .success()
    .stderr(predicate::str::contains("without running delete"));

  assert!(!env.path("deleted.marker").exists());
  assert!(env.state()["resources"].as_object().unwrap().is_empty());
}
