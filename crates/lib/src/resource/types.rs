//! Resource types.
//!
//! A [`ResourceRecord`] is what gets persisted between runs: the
//! configuration that produced it plus the last accepted [`Output`], the
//! dirty flag, and the text of the last failed read.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ConfigError, ExecutionSettings};
use crate::execute::{Action, ExecuteError};
use crate::output::Output;

/// The scripts run for each lifecycle step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleCommands {
  pub create: String,

  /// Without a read command the output from create is never refreshed.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub read: Option<String>,

  /// Without an update command every update replaces the resource.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub update: Option<String>,

  pub delete: String,
}

/// Declared configuration of a script-backed resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceConfig {
  pub lifecycle_commands: LifecycleCommands,

  /// Output values are secret and are masked wherever they are displayed.
  #[serde(default)]
  pub sensitive_output: bool,

  #[serde(flatten)]
  pub settings: ExecutionSettings,
}

impl ResourceConfig {
  pub fn new(lifecycle_commands: LifecycleCommands) -> Self {
    Self {
      lifecycle_commands,
      sensitive_output: false,
      settings: ExecutionSettings::default(),
    }
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    let commands = &self.lifecycle_commands;
    require_command("create", Some(&commands.create))?;
    require_command("delete", Some(&commands.delete))?;
    require_command("read", commands.read.as_ref())?;
    require_command("update", commands.update.as_ref())?;
    self.settings.interpreter().map(|_| ())
  }
}

/// Declared configuration of a read-only data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSourceConfig {
  pub read: String,

  #[serde(default)]
  pub sensitive_output: bool,

  #[serde(flatten)]
  pub settings: ExecutionSettings,
}

impl DataSourceConfig {
  pub fn validate(&self) -> Result<(), ConfigError> {
    require_command("read", Some(&self.read))?;
    self.settings.interpreter().map(|_| ())
  }
}

fn require_command(name: &'static str, command: Option<&String>) -> Result<(), ConfigError> {
  match command {
    Some(command) if command.trim().is_empty() => Err(ConfigError::EmptyCommand { name }),
    _ => Ok(()),
  }
}

/// Reconciliation state of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceState {
  /// No identifier: needs Create.
  Absent,
  Clean,
  /// Drift detected: needs Update.
  Dirty,
}

/// Persisted state of one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id: Option<String>,

  pub config: ResourceConfig,

  #[serde(default)]
  pub output: Output,

  #[serde(default)]
  pub dirty: bool,

  /// Redacted error from the last failed read, if any.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub read_error: Option<String>,
}

impl ResourceRecord {
  /// A record that has not been created yet.
  pub fn new(config: ResourceConfig) -> Self {
    Self {
      id: None,
      config,
      output: Output::new(),
      dirty: false,
      read_error: None,
    }
  }

  pub fn state(&self) -> ResourceState {
    match (&self.id, self.dirty) {
      (None, _) => ResourceState::Absent,
      (Some(_), true) => ResourceState::Dirty,
      (Some(_), false) => ResourceState::Clean,
    }
  }

  pub fn is_present(&self) -> bool {
    self.id.is_some()
  }
}

/// What a read concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
  /// No read command is configured; nothing ran.
  Skipped,
  /// The new output was accepted.
  Clean,
  /// The output differs from the stored one; the record is now dirty.
  Drifted,
  /// The script reported no state; the identifier was cleared.
  Gone,
}

#[derive(Debug, Error)]
pub enum LifecycleError {
  #[error(transparent)]
  Execute(#[from] ExecuteError),

  /// The action needed state but the script printed none.
  #[error("{action} command produced no state: the script must print a JSON object as the last thing on stdout")]
  MissingState { action: Action },

  /// Command or interpreter changes combined with input changes.
  #[error("invalid transition: {0}")]
  InvalidTransition(String),

  #[error("invalid configuration: {0}")]
  Config(#[from] ConfigError),
}
