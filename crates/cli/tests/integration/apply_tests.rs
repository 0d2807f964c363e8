//! Apply command integration tests.

use predicates::prelude::*;

use super::common::{TestEnv, fixture_content};

#[test]
fn apply_creates_resource() {
  if cfg!(windows) {
    return;
  }

  let env = TestEnv::from_fixture("file_resource.toml");

  env
    .cmd()
    .arg("apply")
    .assert()
    .success()
    .stdout(predicate::str::contains("Apply complete"))
    .stdout(predicate::str::contains("Created: 1"));

  assert_eq!(env.read_file("greeting.txt"), "hello");
  let state = env.state();
  let record = &state["resources"]["greeting"];
  assert_eq!(record["output"]["message"], "hello");
  assert_eq!(record["id"].as_str().map(str::len), Some(64));
}

#[test]
fn apply_twice_is_noop() {
  if cfg!(windows) {
    return;
  }

  let env = TestEnv::from_fixture("file_resource.toml");
  env.cmd().arg("apply").assert().success();
  let id = env.state()["resources"]["greeting"]["id"].clone();

  env
    .cmd()
    .arg("apply")
    .assert()
    .success()
    .stdout(predicate::str::contains("Unchanged: 1"));

  assert_eq!(env.state()["resources"]["greeting"]["id"], id);
}

#[test]
fn apply_repairs_drift_by_replacing() {
  if cfg!(windows) {
    return;
  }

  let env = TestEnv::from_fixture("file_resource.toml");
  env.cmd().arg("apply").assert().success();
  let id = env.state()["resources"]["greeting"]["id"].clone();
  std::fs::write(env.path("greeting.txt"), "tampered").unwrap();

  env
    .cmd()
    .arg("apply")
    .assert()
    .success()
    .stdout(predicate::str::contains("Updated: 1"));

  assert_eq!(env.read_file("greeting.txt"), "hello");
  let state = env.state();
  assert_ne!(state["resources"]["greeting"]["id"], id);
  assert_eq!(state["resources"]["greeting"]["dirty"], false);
}

#[test]
fn apply_runs_update_with_previous_output() {
  if cfg!(windows) {
    return;
  }

  let env = TestEnv::from_fixture("with_update.toml");
  env.cmd().arg("apply").assert().success();
  let id = env.state()["resources"]["greeting"]["id"].clone();

  env.write_config(&fixture_content("with_update.toml").replace("MESSAGE = \"hello\"", "MESSAGE = \"goodbye\""));
  env
    .cmd()
    .arg("apply")
    .assert()
    .success()
    .stdout(predicate::str::contains("Updated: 1"));

  assert_eq!(env.read_file("greeting.txt"), "goodbye");
  assert_eq!(env.read_file("previous.json"), r#"{"message":"hello"}"#);
  let state = env.state();
  assert_eq!(state["resources"]["greeting"]["id"], id);
  assert_eq!(state["resources"]["greeting"]["output"]["message"], "goodbye");
}

#[test]
fn apply_recreates_externally_deleted_resource() {
  if cfg!(windows) {
    return;
  }

  let env = TestEnv::from_fixture("file_resource.toml");
  env.cmd().arg("apply").assert().success();
  std::fs::remove_file(env.path("greeting.txt")).unwrap();

  env
    .cmd()
    .arg("apply")
    .assert()
    .success()
    .stdout(predicate::str::contains("Created: 1"));

  assert!(env.path("greeting.txt").exists());
}

#[test]
fn apply_deletes_undeclared_resources() {
  if cfg!(windows) {
    return;
  }

  let env = TestEnv::from_fixture("file_resource.toml");
  env.cmd().arg("apply").assert().success();

  env.write_config("");
  env
    .cmd()
    .arg("apply")
    .assert()
    .success()
    .stdout(predicate::str::contains("Deleted: 1"));

  assert!(!env.path("greeting.txt").exists());
  assert!(env.state()["resources"].as_object().unwrap().is_empty());
}

#[test]
fn apply_adopts_command_change_without_running_it() {
  if cfg!(windows) {
    return;
  }

  let env = TestEnv::from_fixture("file_resource.toml");
  env.cmd().arg("apply").assert().success();

  env.write_config(&fixture_content("file_resource.toml").replace("rm -f greeting.txt", "rm greeting.txt"));
  env
    .cmd()
    .arg("apply")
    .assert()
    .success()
    .stdout(predicate::str::contains("Adopted: 1"));

  let state = env.state();
  assert_eq!(
    state["resources"]["greeting"]["config"]["lifecycle_commands"]["delete"],
    "rm greeting.txt"
  );
}

#[test]
fn apply_rejects_command_and_environment_change_together() {
  if cfg!(windows) {
    return;
  }

  let env = TestEnv::from_fixture("file_resource.toml");
  env.cmd().arg("apply").assert().success();

  let changed = fixture_content("file_resource.toml")
    .replace("rm -f greeting.txt", "rm greeting.txt")
    .replace("MESSAGE = \"hello\"", "MESSAGE = \"goodbye\"");
  env.write_config(&changed);

  env
    .cmd()
    .arg("apply")
    .assert()
    .failure()
    .stderr(predicate::str::contains("invalid transition"));

  assert_eq!(env.read_file("greeting.txt"), "hello");
}

#[test]
fn apply_failure_reports_redacted_context() {
  if cfg!(windows) {
    return;
  }

  let env = TestEnv::from_fixture("failing.toml");

  env
    .cmd()
    .arg("apply")
    .assert()
    .failure()
    .stderr(predicate::str::contains("Failed to apply resource 'broken'"))
    .stderr(predicate::str::contains("exit code 3"))
    .stderr(predicate::str::contains("oops"));

  assert!(env.state()["resources"].as_object().unwrap().is_empty());
}

#[test]
fn apply_masks_sensitive_values_in_output() {
  if cfg!(windows) {
    return;
  }

  let env = TestEnv::from_fixture("sensitive.toml");
  env.cmd().arg("apply").assert().success();

  let state = env.state();
  assert_eq!(state["resources"]["credential"]["output"]["token"], "******");
  assert_eq!(state["resources"]["credential"]["output"]["kind"], "api");
}

#[test]
fn show_masks_sensitive_output() {
  if cfg!(windows) {
    return;
  }

  let env = TestEnv::from_fixture("sensitive_output.toml");
  env.cmd().arg("apply").assert().success();

  // The stored state keeps the real values; only the display is masked.
  assert_eq!(env.state()["resources"]["keypair"]["output"]["private"], "KEYMATERIAL");

  env
    .cmd()
    .arg("show")
    .assert()
    .success()
    .stdout(predicate::str::contains("visible"))
    .stdout(predicate::str::contains("KEYMATERIAL").not())
    .stdout(predicate::str::contains("ssh-ed25519").not());

  let assert = env.cmd().arg("show").arg("--json").assert().success();
  let shown: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
  assert_eq!(shown["resources"]["keypair"]["output"]["private"], "******");
  assert_eq!(shown["resources"]["keypair"]["output"]["public"], "******");
  assert_eq!(shown["resources"]["label"]["output"]["name"], "visible");
}
