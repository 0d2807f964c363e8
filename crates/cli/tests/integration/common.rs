//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Get path to a fixture file.
pub fn fixture_path(name: &str) -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    .join("tests")
    .join("fixtures")
    .join(name)
}

/// Read fixture content.
pub fn fixture_content(name: &str) -> String {
  std::fs::read_to_string(fixture_path(name)).unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", name, e))
}

/// Isolated test environment.
///
/// Each test gets its own temporary directory holding the config, the state
/// file and whatever the scripts create.
pub struct TestEnv {
  pub temp: TempDir,
  pub config_path: PathBuf,
}

impl TestEnv {
  /// Create from a fixture file, copied to `shellstate.toml`.
  pub fn from_fixture(name: &str) -> Self {
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join("shellstate.toml");
    std::fs::write(&config_path, fixture_content(name)).unwrap();
    Self { temp, config_path }
  }

  /// Replace the config file.
  pub fn write_config(&self, content: &str) {
    std::fs::write(&self.config_path, content).unwrap();
  }

  /// Path of a file relative to the temp directory.
  pub fn path(&self, relative_path: &str) -> PathBuf {
    self.temp.path().join(relative_path)
  }

  pub fn read_file(&self, relative_path: &str) -> String {
    std::fs::read_to_string(self.path(relative_path)).unwrap()
  }

  pub fn state_path(&self) -> PathBuf {
    self.path("shellstate.state.json")
  }

  /// Parsed state file.
  pub fn state(&self) -> serde_json::Value {
    serde_json::from_str(&self.read_file("shellstate.state.json")).unwrap()
  }

  /// Get a Command for the shellstate binary, run from the temp directory so
  /// the default config and state paths apply.
  pub fn cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("shellstate");
    cmd.current_dir(self.temp.path());
    cmd.env_remove("RUST_LOG");
    cmd
  }
}
