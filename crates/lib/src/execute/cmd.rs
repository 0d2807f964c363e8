//! Cmd execution.
//!
//! This module runs a single lifecycle command. The child inherits the host
//! environment with the invocation's variables layered on top, receives the
//! previous output as JSON on stdin (except for Create), and has its stdout
//! and stderr drained concurrently. Each line is logged redacted while the raw
//! text is buffered; the buffered stdout is then handed to the state
//! extractor.

use std::io;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tracing::{Instrument, debug, info};

use crate::execute::types::{CommandInvocation, ExecuteError, FailureReport};
use crate::output::{Output, extract};
use crate::redact::Redactor;

/// Which pipe a line was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
  Stdout,
  Stderr,
}

impl Stream {
  fn as_str(self) -> &'static str {
    match self {
      Stream::Stdout => "stdout",
      Stream::Stderr => "stderr",
    }
  }
}

/// Execute a lifecycle command.
///
/// Environment precedence, lowest to highest: host environment,
/// `invocation.environment`, `invocation.sensitive_environment`.
///
/// # Returns
///
/// The output extracted from stdout, or `None` if the command printed no
/// trailing JSON object.
pub async fn execute_cmd(invocation: &CommandInvocation) -> Result<Option<Output>, ExecuteError> {
  let redactor = invocation.redactor();
  let interpreter = &invocation.interpreter;
  let stdin_payload = invocation.stdin_payload()?;

  info!(action = %invocation.action, "executing command");
  debug!(
    shell = %interpreter.program,
    args = ?interpreter.args,
    working_dir = %invocation.working_directory.display(),
    env_keys = ?invocation.env_keys(),
    "spawning process"
  );
  for line in redactor.redact(&invocation.command).lines() {
    debug!("   {}", line);
  }

  let mut command = Command::new(&interpreter.program);
  command
    .args(&interpreter.args)
    .arg(&invocation.command)
    .current_dir(&invocation.working_directory)
    .envs(&invocation.environment)
    .envs(&invocation.sensitive_environment)
    .stdin(if stdin_payload.is_some() {
      Stdio::piped()
    } else {
      Stdio::null()
    })
    .stdout(Stdio::piped())
    .stderr(Stdio::piped());

  let mut child = command.spawn().map_err(|source| ExecuteError::Spawn {
    action: invocation.action,
    program: interpreter.program.clone(),
    cmd: redactor.redact(&invocation.command),
    source,
  })?;

  let stdout = child
    .stdout
    .take()
    .ok_or_else(|| io::Error::other("child stdout was not captured"))?;
  let stderr = child
    .stderr
    .take()
    .ok_or_else(|| io::Error::other("child stderr was not captured"))?;

  let line_redactor = redactor.for_lines();
  let stdout_task = tokio::spawn(drain_lines(stdout, Stream::Stdout, line_redactor.clone()).in_current_span());
  let stderr_task = tokio::spawn(drain_lines(stderr, Stream::Stderr, line_redactor).in_current_span());

  let stdin_result = match (stdin_payload.as_deref(), child.stdin.take()) {
    (Some(payload), Some(stdin)) => write_stdin(stdin, payload).await,
    _ => Ok(()),
  };

  // Both readers must reach EOF before returning, whatever the exit status.
  let status = child.wait().await;
  let (stdout_result, stderr_result) = tokio::join!(stdout_task, stderr_task);
  let stdout_buf = stdout_result??;
  let stderr_buf = stderr_result??;
  let status = status?;
  stdin_result?;

  if !status.success() {
    let report = FailureReport {
      action: invocation.action,
      code: status.code(),
      command: redactor.redact(&invocation.command),
      stdout: redactor.redact(&stdout_buf),
      stderr: redactor.redact(&stderr_buf),
      env_keys: invocation.env_keys(),
      stdin: stdin_payload.as_deref().map(|s| redactor.redact(s)),
    };
    debug!(code = ?report.code, "command failed");
    return Err(ExecuteError::CmdFailed(Box::new(report)));
  }

  info!(action = %invocation.action, "command completed");
  Ok(extract(&stdout_buf, &redactor))
}

/// Write the previous output to the child and close its stdin.
///
/// A child that exits without reading stdin closes the pipe early; that is
/// not an error.
async fn write_stdin(mut stdin: tokio::process::ChildStdin, payload: &str) -> io::Result<()> {
  let result = match stdin.write_all(payload.as_bytes()).await {
    Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
      debug!("child closed stdin before reading previous output");
      Ok(())
    }
    other => other,
  };
  drop(stdin);
  result
}

/// Read `reader` to EOF line by line, logging each line redacted and
/// returning the raw text.
async fn drain_lines<R>(reader: R, stream: Stream, redactor: Redactor) -> io::Result<String>
where
  R: AsyncRead + Unpin,
{
  let mut reader = BufReader::new(reader);
  let mut buffer = String::new();
  let mut line = Vec::new();

  loop {
    line.clear();
    if reader.read_until(b'\n', &mut line).await? == 0 {
      break;
    }

    let text = String::from_utf8_lossy(&line);
    let trimmed = text.trim_end_matches(['\n', '\r']);
    info!(stream = stream.as_str(), "  {}", redactor.redact(trimmed));
    buffer.push_str(trimmed);
    buffer.push('\n');
  }

  Ok(buffer)
}
