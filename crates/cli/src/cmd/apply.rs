//! Implementation of the `shellstate apply` command.
//!
//! Brings every declared resource in line with the config and deletes
//! resources that are no longer declared.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use shellstate_lib::resource::{Lifecycle, LifecycleError, ResourceConfig, ResourceRecord, Transition};

use crate::config::Config;
use crate::output::{describe_transition, print_change, symbols};
use crate::state::StateFile;

#[derive(Debug, Default)]
struct ApplySummary {
  created: usize,
  updated: usize,
  adopted: usize,
  unchanged: usize,
  deleted: usize,
}

impl ApplySummary {
  fn record(&mut self, transition: &Transition) {
    match transition {
      Transition::Create => self.created += 1,
      Transition::Update => self.updated += 1,
      Transition::Adopt { .. } => self.adopted += 1,
      Transition::NoChange => self.unchanged += 1,
    }
  }
}

/// Execute the apply command.
///
/// - Deletes resources in state that are no longer declared
/// - Creates declared resources that are absent
/// - Refreshes present resources, then updates or adopts as planned
///
/// State is saved after every resource, so a failure keeps earlier progress.
pub fn cmd_apply(config_path: &Path, state_path: &Path) -> Result<()> {
  let config = Config::load(config_path)?;
  let mut state = StateFile::load(state_path).context("Failed to load state")?;
  let engine = Lifecycle::new(config.provider.clone()).context("Invalid provider config")?;

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let summary = rt.block_on(apply(&engine, &config, &mut state, state_path))?;

  println!();
  println!("Apply complete!");
  println!("  Created: {}", summary.created);
  println!("  Updated: {}", summary.updated);
  println!("  Adopted: {}", summary.adopted);
  println!("  Unchanged: {}", summary.unchanged);
  println!("  Deleted: {}", summary.deleted);

  info!(path = %state_path.display(), "apply finished");
  Ok(())
}

async fn apply(engine: &Lifecycle, config: &Config, state: &mut StateFile, state_path: &Path) -> Result<ApplySummary> {
  let mut summary = ApplySummary::default();

  let removed: Vec<String> = state
    .resources
    .keys()
    .filter(|name| !config.resource.contains_key(*name))
    .cloned()
    .collect();

  for name in removed {
    let Some(record) = state.resources.get_mut(&name) else {
      continue;
    };
    let result = engine.delete(record).await;
    state.retain_present(&name);
    state.save(state_path).context("Failed to save state")?;
    result.with_context(|| format!("Failed to delete resource '{}'", name))?;

    print_change(symbols::REMOVE, &name, "deleted");
    summary.deleted += 1;
  }

  for (name, desired) in &config.resource {
    let record = state
      .resources
      .entry(name.clone())
      .or_insert_with(|| ResourceRecord::new(desired.clone()));
    let result = reconcile(engine, record, desired).await;
    state.retain_present(name);
    state.save(state_path).context("Failed to save state")?;
    let transition = result.with_context(|| format!("Failed to apply resource '{}'", name))?;

    if let Some((symbol, detail)) = describe_transition(&transition) {
      print_change(symbol, name, detail);
    }
    summary.record(&transition);
  }

  // An apply with nothing to do still leaves a state file behind.
  state.save(state_path).context("Failed to save state")?;
  Ok(summary)
}

async fn reconcile(
  engine: &Lifecycle,
  record: &mut ResourceRecord,
  desired: &ResourceConfig,
) -> Result<Transition, LifecycleError> {
  if record.is_present() {
    engine.read(record).await?;
  }
  engine.reconcile(record, desired.clone()).await
}
