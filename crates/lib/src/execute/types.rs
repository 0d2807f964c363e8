//! Types for command execution.
//!
//! This module defines the invocation handed to the process runner, the
//! interpreter model, and the error types produced while running a command.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::output::Output;
use crate::redact::Redactor;

/// The lifecycle step a command is run for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
  Create,
  Read,
  Update,
  Delete,
}

impl Action {
  pub fn as_str(self) -> &'static str {
    match self {
      Action::Create => "create",
      Action::Read => "read",
      Action::Update => "update",
      Action::Delete => "delete",
    }
  }

  /// Whether the previous output is written to the child's stdin.
  ///
  /// Create runs before any state exists, so it always gets an empty stdin.
  pub fn pipes_previous_output(self) -> bool {
    !matches!(self, Action::Create)
  }
}

impl std::fmt::Display for Action {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// The program used to run command text, plus the flags placed before it.
///
/// A command is run as `<program> <args...> "<command>"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interpreter {
  pub program: String,
  pub args: Vec<String>,
}

impl Interpreter {
  pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
    Self {
      program: program.into(),
      args,
    }
  }

  /// `/bin/sh -c` on Unix, `cmd /C` on Windows.
  pub fn platform_default() -> Self {
    #[cfg(windows)]
    {
      Self::new("cmd", vec!["/C".to_string()])
    }

    #[cfg(not(windows))]
    {
      Self::new("/bin/sh", vec!["-c".to_string()])
    }
  }

  /// Build an interpreter from a configured argument list.
  ///
  /// The first element is the program and the rest are its flags. A single
  /// element gets the command flag for that kind of shell inferred. Returns
  /// `None` for an empty list.
  pub fn from_parts(parts: &[String]) -> Option<Self> {
    let (program, flags) = parts.split_first()?;
    if program.is_empty() {
      return None;
    }

    let args = if flags.is_empty() {
      infer_flags(program)
    } else {
      flags.to_vec()
    };

    Some(Self::new(program.clone(), args))
  }

  /// Pick the interpreter for a call: resource override, then provider
  /// default, then the platform default.
  pub fn resolve(resource: Option<&Interpreter>, provider: Option<&Interpreter>) -> Interpreter {
    resource
      .or(provider)
      .cloned()
      .unwrap_or_else(Interpreter::platform_default)
  }
}

/// Command flag for a shell given only by name.
fn infer_flags(program: &str) -> Vec<String> {
  let name = program.to_ascii_lowercase();
  if name.contains("powershell") || name.contains("pwsh") {
    vec!["-NoProfile".to_string(), "-Command".to_string()]
  } else if name.ends_with("cmd") || name.ends_with("cmd.exe") {
    vec!["/C".to_string()]
  } else {
    // Assume Unix-style shell (bash, sh, zsh, etc.)
    vec!["-c".to_string()]
  }
}

/// Everything needed to run one lifecycle command.
///
/// Built fresh for every step and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandInvocation {
  pub command: String,
  pub interpreter: Interpreter,
  pub working_directory: PathBuf,
  /// Ordinary variables, layered over the host environment.
  pub environment: BTreeMap<String, String>,
  /// Secret variables, layered over `environment`. Their values are redacted
  /// from every log line, error and output value.
  pub sensitive_environment: BTreeMap<String, String>,
  pub action: Action,
  pub previous_output: Output,
}

impl CommandInvocation {
  /// Redactor for this invocation's sensitive values.
  pub fn redactor(&self) -> Redactor {
    Redactor::new(self.sensitive_environment.values().cloned())
  }

  /// JSON written to stdin, or `None` for Create.
  pub fn stdin_payload(&self) -> Result<Option<String>, serde_json::Error> {
    if !self.action.pipes_previous_output() {
      return Ok(None);
    }
    serde_json::to_string(&self.previous_output).map(Some)
  }

  /// Names of every variable this invocation sets, sensitive ones included.
  pub fn env_keys(&self) -> Vec<String> {
    let mut keys: Vec<String> = self
      .environment
      .keys()
      .chain(self.sensitive_environment.keys())
      .cloned()
      .collect();
    keys.sort();
    keys.dedup();
    keys
  }
}

/// Redacted diagnostics for a command that exited unsuccessfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReport {
  pub action: Action,
  pub code: Option<i32>,
  pub command: String,
  pub stdout: String,
  pub stderr: String,
  pub env_keys: Vec<String>,
  /// Serialized previous output; absent for Create.
  pub stdin: Option<String>,
}

impl std::fmt::Display for FailureReport {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self.code {
      Some(code) => writeln!(f, "{} command failed with exit code {}", self.action, code)?,
      None => writeln!(f, "{} command terminated by signal", self.action)?,
    }
    writeln!(f)?;
    writeln!(f, "Command:\n{}\n", self.command)?;
    writeln!(f, "StdOut:\n{}\n", self.stdout)?;
    writeln!(f, "StdErr:\n{}\n", self.stderr)?;
    write!(f, "Env:\n{:?}", self.env_keys)?;
    if let Some(stdin) = &self.stdin {
      write!(f, "\n\nStdIn:\n'{}'", stdin)?;
    }
    Ok(())
  }
}

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum ExecuteError {
  /// The interpreter could not be started.
  #[error("failed to start {program} for {action} command: {source}\nCommand:\n{cmd}")]
  Spawn {
    action: Action,
    program: String,
    /// Redacted command text.
    cmd: String,
    #[source]
    source: std::io::Error,
  },

  /// The command ran and exited unsuccessfully.
  #[error("{0}")]
  CmdFailed(Box<FailureReport>),

  /// Previous output could not be serialized for stdin.
  #[error("failed to serialize previous output: {0}")]
  Stdin(#[from] serde_json::Error),

  /// An output reader task panicked or was cancelled.
  #[error("output reader failed: {0}")]
  Drain(#[from] tokio::task::JoinError),

  /// I/O error while talking to the child process.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}
