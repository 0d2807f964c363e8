//! Provider and execution settings.
//!
//! These are the already-parsed inputs the lifecycle engine works from. The
//! CLI deserializes them from TOML; library users can build them directly.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::execute::Interpreter;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
  #[error("interpreter must name a program")]
  EmptyInterpreter,

  #[error("{name} command must not be empty")]
  EmptyCommand { name: &'static str },
}

/// Provider-wide defaults applied to every resource and data source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
  #[serde(default)]
  pub environment: BTreeMap<String, String>,

  #[serde(default)]
  pub sensitive_environment: BTreeMap<String, String>,

  /// Program and flags used when a resource has no override.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub interpreter: Option<Vec<String>>,

  /// Disable the concurrency gate so commands may run in parallel.
  #[serde(default)]
  pub enable_parallelism: bool,
}

impl ProviderConfig {
  pub fn interpreter(&self) -> Result<Option<Interpreter>, ConfigError> {
    parse_interpreter(self.interpreter.as_deref())
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    self.interpreter().map(|_| ())
  }
}

/// How a command is run: environment, interpreter and working directory.
///
/// Shared by resources and data sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionSettings {
  #[serde(default)]
  pub environment: BTreeMap<String, String>,

  #[serde(default)]
  pub sensitive_environment: BTreeMap<String, String>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub interpreter: Option<Vec<String>>,

  #[serde(default = "default_working_directory")]
  pub working_directory: PathBuf,
}

impl ExecutionSettings {
  pub fn interpreter(&self) -> Result<Option<Interpreter>, ConfigError> {
    parse_interpreter(self.interpreter.as_deref())
  }

  /// True if anything that shapes the command's inputs differs.
  pub fn inputs_differ(&self, other: &ExecutionSettings) -> bool {
    self.environment != other.environment
      || self.sensitive_environment != other.sensitive_environment
      || self.working_directory != other.working_directory
  }
}

impl Default for ExecutionSettings {
  fn default() -> Self {
    Self {
      environment: BTreeMap::new(),
      sensitive_environment: BTreeMap::new(),
      interpreter: None,
      working_directory: default_working_directory(),
    }
  }
}

fn default_working_directory() -> PathBuf {
  PathBuf::from(".")
}

fn parse_interpreter(parts: Option<&[String]>) -> Result<Option<Interpreter>, ConfigError> {
  match parts {
    None => Ok(None),
    Some(parts) => Interpreter::from_parts(parts)
      .map(Some)
      .ok_or(ConfigError::EmptyInterpreter),
  }
}

/// Layer `overrides` on top of `base`; `overrides` wins on shared keys.
pub(crate) fn merge_env(base: &BTreeMap<String, String>, overrides: &BTreeMap<String, String>) -> BTreeMap<String, String> {
  let mut merged = base.clone();
  merged.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
  merged
}
