//! Implementation of the `shellstate show` command.

use std::path::Path;

use anyhow::{Context, Result};

use shellstate_lib::resource::ResourceState;

use crate::output::{self, print_info, print_json, print_stat, truncate_id};
use crate::state::StateFile;

/// Print the stored records. Sensitive environment values and the output of
/// sensitive resources are masked.
pub fn cmd_show(state_path: &Path, verbose: bool, json: bool) -> Result<()> {
  let state = StateFile::load(state_path).context("Failed to load state")?.masked();

  if json {
    return print_json(&state);
  }

  if state.resources.is_empty() {
    print_info("No resources in state.");
    return Ok(());
  }

  for (name, record) in &state.resources {
    let status = match record.state() {
      ResourceState::Absent => "absent",
      ResourceState::Clean => "clean",
      ResourceState::Dirty => "dirty",
    };
    println!("{} {}", output::symbols::INFO, name);
    print_stat("Id", record.id.as_deref().map(truncate_id).unwrap_or("-"));
    print_stat("State", status);
    if let Some(error) = &record.read_error {
      print_stat("Last read failed", error.lines().next().unwrap_or_default());
    }
    for (key, value) in &record.output {
      print_stat(key, value);
    }

    if verbose {
      let settings = &record.config.settings;
      print_stat("Working directory", &settings.working_directory.display().to_string());
      for (key, value) in settings.environment.iter().chain(&settings.sensitive_environment) {
        print_stat(&format!("env {}", key), value);
      }
    }
    println!();
  }

  Ok(())
}
