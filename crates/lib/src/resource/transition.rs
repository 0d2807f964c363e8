//! Transition planning between a stored record and its desired configuration.
//!
//! The engine cannot tell whether stored output was produced by the old or
//! the new commands if both the commands and their inputs change at once, so
//! that combination is rejected before anything runs.

use crate::resource::types::{LifecycleCommands, LifecycleError, ResourceConfig, ResourceRecord};

/// What reconciliation has to do to bring a record to its desired config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
  /// The record has no identifier yet.
  Create,
  /// Configuration is unchanged and the record is clean.
  NoChange,
  /// Only commands or the interpreter changed. The new configuration is
  /// stored without running anything; if the read command changed the
  /// output is expected to change and is refreshed.
  Adopt { output_will_change: bool },
  /// Inputs changed or drift was detected: run the update path.
  Update,
}

/// A single lifecycle step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
  Create,
  Update,
  Delete,
}

/// Steps taken for an update. Resources without an update command are
/// tainted and get replaced.
pub fn update_steps(commands: &LifecycleCommands) -> &'static [Step] {
  if commands.update.is_some() {
    &[Step::Update]
  } else {
    &[Step::Delete, Step::Create]
  }
}

/// Plan the transition from `current` to `desired`.
pub fn plan_transition(current: &ResourceRecord, desired: &ResourceConfig) -> Result<Transition, LifecycleError> {
  if !current.is_present() {
    return Ok(Transition::Create);
  }

  let stored = &current.config;
  let commands_changed = stored.lifecycle_commands != desired.lifecycle_commands
    || stored.settings.interpreter != desired.settings.interpreter;
  let inputs_changed = stored.settings.inputs_differ(&desired.settings);

  if commands_changed && inputs_changed {
    return Err(LifecycleError::InvalidTransition(
      "changes to lifecycle commands or interpreter must not be combined with changes to environment, \
       sensitive environment or working directory; apply them separately"
        .to_string(),
    ));
  }

  if inputs_changed {
    return Ok(Transition::Update);
  }

  if commands_changed {
    let output_will_change = stored.lifecycle_commands.read != desired.lifecycle_commands.read;
    return Ok(Transition::Adopt { output_will_change });
  }

  if current.dirty {
    return Ok(Transition::Update);
  }

  Ok(Transition::NoChange)
}
