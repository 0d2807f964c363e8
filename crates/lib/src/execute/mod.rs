//! Command execution.
//!
//! # Submodules
//!
//! - [`cmd`] - Spawns one command and extracts its output
//! - [`types`] - Invocation, interpreter and error types
//!
//! The lifecycle engine talks to the process layer through the
//! [`CommandRunner`] trait so tests can substitute a scripted runner.

use std::future::Future;

pub mod cmd;
pub mod types;

pub use cmd::execute_cmd;
pub use types::{Action, CommandInvocation, ExecuteError, FailureReport, Interpreter};

use crate::output::Output;

/// Runs a [`CommandInvocation`] and returns the state it printed.
pub trait CommandRunner: Send + Sync {
  fn run(&self, invocation: &CommandInvocation) -> impl Future<Output = Result<Option<Output>, ExecuteError>> + Send;
}

/// Runs invocations as real child processes via [`execute_cmd`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
  async fn run(&self, invocation: &CommandInvocation) -> Result<Option<Output>, ExecuteError> {
    execute_cmd(invocation).await
  }
}
