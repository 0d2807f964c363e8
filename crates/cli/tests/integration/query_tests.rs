//! Query command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn query_prints_data_source_output() {
  if cfg!(windows) {
    return;
  }

  let env = TestEnv::from_fixture("data_source.toml");

  let assert = env.cmd().arg("query").arg("region").assert().success();

  let output: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
  assert_eq!(output["region"], "eu-west-1");
  assert_eq!(output["zones"], "3");
  assert!(!env.state_path().exists(), "query must not write state");
}

#[test]
fn query_masks_sensitive_data_source() {
  if cfg!(windows) {
    return;
  }

  let env = TestEnv::from_fixture("sensitive_output.toml");

  let assert = env
    .cmd()
    .arg("query")
    .arg("password")
    .assert()
    .success()
    .stdout(predicate::str::contains("correct-horse").not());

  let output: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
  assert_eq!(output["password"], "******");
}

#[test]
fn query_show_sensitive_prints_values() {
  if cfg!(windows) {
    return;
  }

  let env = TestEnv::from_fixture("sensitive_output.toml");

  let assert = env
    .cmd()
    .arg("query")
    .arg("password")
    .arg("--show-sensitive")
    .assert()
    .success();

  let output: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
  assert_eq!(output["password"], "correct-horse");
}

#[test]
fn query_without_state_fails() {
  if cfg!(windows) {
    return;
  }

  let env = TestEnv::from_fixture("data_source.toml");

  env
    .cmd()
    .arg("query")
    .arg("silent")
    .assert()
    .failure()
    .stderr(predicate::str::contains("produced no state"));
}

#[test]
fn query_unknown_data_source_fails() {
  let env = TestEnv::from_fixture("data_source.toml");

  env
    .cmd()
    .arg("query")
    .arg("missing")
    .assert()
    .failure()
    .stderr(predicate::str::contains("Unknown data source 'missing'"))
    .stderr(predicate::str::contains("region, silent"));
}
