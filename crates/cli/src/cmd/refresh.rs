//! Implementation of the `shellstate refresh` command.
//!
//! Runs every stored resource's read command and reports drift. Drifted
//! resources are marked dirty so the next `apply` updates them.

use std::path::Path;

use anyhow::{Context, Result};

use shellstate_lib::resource::{Lifecycle, ReadOutcome};

use crate::config::Config;
use crate::output::{print_info, print_success, print_warning};
use crate::state::StateFile;

pub fn cmd_refresh(config_path: &Path, state_path: &Path) -> Result<()> {
  let config = Config::load(config_path)?;
  let mut state = StateFile::load(state_path).context("Failed to load state")?;

  if state.resources.is_empty() {
    print_info("No resources in state. Run 'shellstate apply' first.");
    return Ok(());
  }

  let engine = Lifecycle::new(config.provider).context("Invalid provider config")?;
  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;

  let names: Vec<String> = state.resources.keys().cloned().collect();
  let mut drifted = 0;
  for name in names {
    let Some(record) = state.resources.get_mut(&name) else {
      continue;
    };
    let result = rt.block_on(engine.read(record));
    state.retain_present(&name);
    state.save(state_path).context("Failed to save state")?;

    match result.with_context(|| format!("Failed to read resource '{}'", name))? {
      ReadOutcome::Clean => print_success(&format!("{}: up to date", name)),
      ReadOutcome::Skipped => print_info(&format!("{}: no read command", name)),
      ReadOutcome::Drifted => {
        drifted += 1;
        print_warning(&format!("{}: drifted, will be updated on next apply", name));
      }
      ReadOutcome::Gone => print_warning(&format!("{}: gone, will be created on next apply", name)),
    }
  }

  println!();
  println!("Refresh complete!");
  println!("  Drifted: {}", drifted);

  Ok(())
}
