//! Implementation of the `shellstate destroy` command.
//!
//! Deletes every resource recorded in the state file.

use std::path::Path;

use anyhow::{Context, Result};

use shellstate_lib::resource::Lifecycle;

use crate::config::Config;
use crate::output::{print_change, print_warning, symbols};
use crate::state::StateFile;

/// Execute the destroy command.
///
/// Each resource's delete command runs with its stored output on stdin.
/// Resources whose last read failed are dropped without running delete.
/// State is saved after every resource.
pub fn cmd_destroy(config_path: &Path, state_path: &Path) -> Result<()> {
  let config = Config::load(config_path)?;
  let mut state = StateFile::load(state_path).context("Failed to load state")?;

  if state.resources.is_empty() {
    println!("Nothing to destroy.");
    return Ok(());
  }

  let engine = Lifecycle::new(config.provider).context("Invalid provider config")?;
  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;

  let names: Vec<String> = state.resources.keys().cloned().collect();
  let mut destroyed = 0;
  for name in names {
    let Some(record) = state.resources.get_mut(&name) else {
      continue;
    };
    if record.read_error.is_some() {
      print_warning(&format!("last read of '{}' failed, dropping it without running delete", name));
    }

    let result = rt.block_on(engine.delete(record));
    state.retain_present(&name);
    state.save(state_path).context("Failed to save state")?;
    result.with_context(|| format!("Failed to delete resource '{}'", name))?;

    print_change(symbols::REMOVE, &name, "deleted");
    destroyed += 1;
  }

  println!();
  println!("Destroy complete!");
  println!("  Deleted: {}", destroyed);

  Ok(())
}
