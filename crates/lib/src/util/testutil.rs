//! Test utilities for shellstate-lib.
//!
//! [`StubRunner`] stands in for the process layer so lifecycle tests can
//! script exactly what each command "prints" and inspect what was run.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::execute::{Action, CommandInvocation, CommandRunner, ExecuteError, FailureReport};
use crate::output::Output;

type Handler = dyn Fn(&CommandInvocation) -> Result<Option<Output>, ExecuteError> + Send + Sync;

/// A [`CommandRunner`] that answers from a closure and records every call.
pub struct StubRunner {
  handler: Box<Handler>,
  delay: Option<Duration>,
  calls: Mutex<Vec<CommandInvocation>>,
  windows: Mutex<Vec<(Instant, Instant)>>,
}

impl StubRunner {
  pub fn new<F>(handler: F) -> Self
  where
    F: Fn(&CommandInvocation) -> Result<Option<Output>, ExecuteError> + Send + Sync + 'static,
  {
    Self {
      handler: Box::new(handler),
      delay: None,
      calls: Mutex::new(Vec::new()),
      windows: Mutex::new(Vec::new()),
    }
  }

  /// Answer calls with `results` in order. Panics when they run out.
  pub fn sequence(results: Vec<Option<Output>>) -> Self {
    let queue = Mutex::new(VecDeque::from(results));
    Self::new(move |inv| {
      let next = queue.lock().unwrap().pop_front();
      Ok(next.unwrap_or_else(|| panic!("unexpected {} call: {}", inv.action, inv.command)))
    })
  }

  /// Sleep for `delay` inside every call, to widen execution windows.
  pub fn with_delay(mut self, delay: Duration) -> Self {
    self.delay = Some(delay);
    self
  }

  pub fn calls(&self) -> Vec<CommandInvocation> {
    self.calls.lock().unwrap().clone()
  }

  pub fn actions(&self) -> Vec<Action> {
    self.calls().iter().map(|c| c.action).collect()
  }

  /// Start and end instants of every call, in completion order.
  pub fn windows(&self) -> Vec<(Instant, Instant)> {
    self.windows.lock().unwrap().clone()
  }
}

impl CommandRunner for StubRunner {
  async fn run(&self, invocation: &CommandInvocation) -> Result<Option<Output>, ExecuteError> {
    let start = Instant::now();
    self.calls.lock().unwrap().push(invocation.clone());
    if let Some(delay) = self.delay {
      tokio::time::sleep(delay).await;
    }
    let result = (self.handler)(invocation);
    self.windows.lock().unwrap().push((start, Instant::now()));
    result
  }
}

/// Build an [`Output`] from pairs.
pub fn output(pairs: &[(&str, &str)]) -> Output {
  pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

/// A non-zero exit error for `invocation`.
pub fn failure(invocation: &CommandInvocation) -> ExecuteError {
  ExecuteError::CmdFailed(Box::new(FailureReport {
    action: invocation.action,
    code: Some(1),
    command: invocation.command.clone(),
    stdout: String::new(),
    stderr: "boom".to_string(),
    env_keys: invocation.env_keys(),
    stdin: invocation.stdin_payload().ok().flatten(),
  }))
}
