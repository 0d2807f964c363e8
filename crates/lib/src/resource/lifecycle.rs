//! The lifecycle engine.
//!
//! [`Lifecycle`] drives one [`ResourceRecord`] through create, read, update
//! and delete. Every command runs under the [`ConcurrencyGate`], and what it
//! prints decides the record's next state:
//!
//! - Create stores the printed output and assigns an identifier. A create
//!   that prints nothing falls back to read.
//! - Read accepts unchanged output, clears the identifier when nothing is
//!   printed, and marks the record dirty when the output drifted.
//! - Update replaces the output, or falls back to read when nothing is
//!   printed. Resources without an update command are deleted and created
//!   again.
//! - Delete clears the identifier.

use tracing::{debug, info, warn};

use crate::config::{ConfigError, ExecutionSettings, ProviderConfig, merge_env};
use crate::execute::{Action, CommandInvocation, CommandRunner, Interpreter, ShellRunner};
use crate::gate::{ConcurrencyGate, DEFAULT_GATE_KEY};
use crate::output::Output;
use crate::resource::transition::{Step, Transition, plan_transition, update_steps};
use crate::resource::types::{DataSourceConfig, LifecycleError, ReadOutcome, ResourceConfig, ResourceRecord};
use crate::util::hash::new_identifier;

/// Why a read is being run. Reads that follow a create or update, or that
/// use a changed read command, accept whatever they observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadContext {
  Refresh,
  AfterCreate,
  AfterUpdate,
  OutputWillChange,
}

impl ReadContext {
  fn accepts_changes(self) -> bool {
    !matches!(self, ReadContext::Refresh)
  }
}

/// Runs lifecycle commands for script-backed resources.
pub struct Lifecycle<R: CommandRunner = ShellRunner> {
  provider: ProviderConfig,
  provider_interpreter: Option<Interpreter>,
  gate: ConcurrencyGate,
  runner: R,
}

impl Lifecycle<ShellRunner> {
  /// Engine that runs real processes, gated per `provider.enable_parallelism`.
  pub fn new(provider: ProviderConfig) -> Result<Self, ConfigError> {
    let gate = ConcurrencyGate::new(provider.enable_parallelism);
    Self::with_runner(provider, gate, ShellRunner)
  }
}

impl<R: CommandRunner> Lifecycle<R> {
  pub fn with_runner(provider: ProviderConfig, gate: ConcurrencyGate, runner: R) -> Result<Self, ConfigError> {
    let provider_interpreter = provider.interpreter()?;
    Ok(Self {
      provider,
      provider_interpreter,
      gate,
      runner,
    })
  }

  pub fn runner(&self) -> &R {
    &self.runner
  }

  pub fn gate(&self) -> &ConcurrencyGate {
    &self.gate
  }

  /// Create the resource.
  ///
  /// On success the record holds the new output and a fresh identifier. If
  /// neither create nor the fallback read produce state, the record stays
  /// absent and [`LifecycleError::MissingState`] is returned.
  pub async fn create(&self, record: &mut ResourceRecord) -> Result<(), LifecycleError> {
    info!("creating resource");
    let command = record.config.lifecycle_commands.create.clone();
    let invocation = self.invocation(&record.config.settings, Action::Create, &command, Output::new())?;

    match self.execute(invocation).await? {
      Some(output) => record.output = output,
      None => {
        debug!("create produced no state, falling back to read");
        record.output = Output::new();
        if self.read_in(record, ReadContext::AfterCreate).await? != ReadOutcome::Clean {
          record.id = None;
          return Err(LifecycleError::MissingState { action: Action::Create });
        }
      }
    }

    let id = new_identifier();
    info!(id = %id, output_count = record.output.len(), "resource created");
    record.id = Some(id);
    record.dirty = false;
    record.read_error = None;
    Ok(())
  }

  /// Refresh the resource from its read command.
  ///
  /// A changed output is not stored; the record is marked dirty instead so
  /// the next reconciliation runs an update.
  pub async fn read(&self, record: &mut ResourceRecord) -> Result<ReadOutcome, LifecycleError> {
    self.read_in(record, ReadContext::Refresh).await
  }

  /// Bring the resource in line with its configuration.
  ///
  /// Clears the dirty flag whether or not the update succeeds.
  pub async fn update(&self, record: &mut ResourceRecord) -> Result<(), LifecycleError> {
    record.dirty = false;

    let steps = update_steps(&record.config.lifecycle_commands);
    if steps.len() > 1 {
      info!("no update command, replacing resource");
    }

    for step in steps {
      match step {
        Step::Delete => self.delete(record).await?,
        Step::Create => self.create(record).await?,
        Step::Update => self.update_in_place(record).await?,
      }
    }
    Ok(())
  }

  /// Delete the resource.
  ///
  /// If the last read failed the resource is assumed to be gone already and
  /// no command runs.
  pub async fn delete(&self, record: &mut ResourceRecord) -> Result<(), LifecycleError> {
    if let Some(error) = record.read_error.take() {
      warn!(error = %error, "last read failed, skipping delete and assuming the resource is gone");
      record.id = None;
      record.dirty = false;
      return Ok(());
    }

    info!(id = ?record.id, "deleting resource");
    let command = record.config.lifecycle_commands.delete.clone();
    let invocation = self.invocation(&record.config.settings, Action::Delete, &command, record.output.clone())?;
    self.execute(invocation).await?;

    record.id = None;
    record.dirty = false;
    info!("resource deleted");
    Ok(())
  }

  /// Move `record` to the `desired` configuration.
  ///
  /// Returns the transition that was applied.
  pub async fn reconcile(&self, record: &mut ResourceRecord, desired: ResourceConfig) -> Result<Transition, LifecycleError> {
    desired.validate()?;
    let transition = plan_transition(record, &desired)?;
    debug!(transition = ?transition, "planned transition");

    match transition {
      Transition::NoChange => record.config.sensitive_output = desired.sensitive_output,
      Transition::Create => {
        record.config = desired;
        self.create(record).await?;
      }
      Transition::Adopt { output_will_change } => {
        record.config = desired;
        if output_will_change {
          self.read_in(record, ReadContext::OutputWillChange).await?;
        }
      }
      Transition::Update => {
        record.config = desired;
        self.update(record).await?;
      }
    }

    Ok(transition)
  }

  /// Run a data source's read command. Printing no state is an error.
  pub async fn read_data_source(&self, source: &DataSourceConfig) -> Result<Output, LifecycleError> {
    source.validate()?;
    let invocation = self.invocation(&source.settings, Action::Read, &source.read, Output::new())?;
    self
      .execute(invocation)
      .await?
      .ok_or(LifecycleError::MissingState { action: Action::Read })
  }

  async fn update_in_place(&self, record: &mut ResourceRecord) -> Result<(), LifecycleError> {
    let command = record
      .config
      .lifecycle_commands
      .update
      .clone()
      .ok_or(ConfigError::EmptyCommand { name: "update" })?;
    info!(id = ?record.id, "updating resource");
    let invocation = self.invocation(&record.config.settings, Action::Update, &command, record.output.clone())?;

    match self.execute(invocation).await? {
      Some(output) => {
        record.output = output;
        info!("resource updated");
      }
      None => {
        debug!("update produced no state, falling back to read");
        self.read_in(record, ReadContext::AfterUpdate).await?;
      }
    }
    Ok(())
  }

  async fn read_in(&self, record: &mut ResourceRecord, context: ReadContext) -> Result<ReadOutcome, LifecycleError> {
    let Some(command) = record.config.lifecycle_commands.read.clone() else {
      debug!("no read command, keeping stored output");
      return Ok(ReadOutcome::Skipped);
    };

    let invocation = self.invocation(&record.config.settings, Action::Read, &command, record.output.clone())?;
    let result = match self.execute(invocation).await {
      Ok(result) => result,
      Err(err) => {
        record.read_error = Some(err.to_string());
        return Err(err);
      }
    };
    record.read_error = None;

    let Some(output) = result else {
      info!(id = ?record.id, "read produced no state, resource is gone");
      record.id = None;
      return Ok(ReadOutcome::Gone);
    };

    if output == record.output || context.accepts_changes() {
      record.output = output;
      record.dirty = false;
      return Ok(ReadOutcome::Clean);
    }

    warn!(
      id = ?record.id,
      stored = ?record.output,
      observed = ?output,
      "output drifted, marking resource dirty"
    );
    record.dirty = true;
    Ok(ReadOutcome::Drifted)
  }

  fn invocation(
    &self,
    settings: &ExecutionSettings,
    action: Action,
    command: &str,
    previous_output: Output,
  ) -> Result<CommandInvocation, LifecycleError> {
    let resource_interpreter = settings.interpreter()?;

    Ok(CommandInvocation {
      command: command.to_string(),
      interpreter: Interpreter::resolve(resource_interpreter.as_ref(), self.provider_interpreter.as_ref()),
      working_directory: settings.working_directory.clone(),
      environment: merge_env(&self.provider.environment, &settings.environment),
      sensitive_environment: merge_env(&self.provider.sensitive_environment, &settings.sensitive_environment),
      action,
      previous_output,
    })
  }

  async fn execute(&self, invocation: CommandInvocation) -> Result<Option<Output>, LifecycleError> {
    let _permit = self.gate.acquire(DEFAULT_GATE_KEY).await;
    Ok(self.runner.run(&invocation).await?)
  }
}
