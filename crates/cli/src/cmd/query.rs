//! Implementation of the `shellstate query` command.

use std::path::Path;

use anyhow::{Context, Result, bail};

use shellstate_lib::resource::Lifecycle;

use crate::config::Config;
use crate::output::{mask_values, print_json};

/// Run the data source `name` and print its output as JSON.
///
/// Values of a `sensitive_output` data source are masked unless
/// `show_sensitive` is set.
pub fn cmd_query(config_path: &Path, name: &str, show_sensitive: bool) -> Result<()> {
  let config = Config::load(config_path)?;
  let Some(source) = config.data.get(name) else {
    let known: Vec<&str> = config.data.keys().map(String::as_str).collect();
    bail!("Unknown data source '{}' (declared: {})", name, known.join(", "));
  };

  let engine = Lifecycle::new(config.provider.clone()).context("Invalid provider config")?;
  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let mut output = rt
    .block_on(engine.read_data_source(source))
    .with_context(|| format!("Failed to read data source '{}'", name))?;

  if source.sensitive_output && !show_sensitive {
    mask_values(&mut output);
  }
  print_json(&output)
}
