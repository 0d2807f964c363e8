//! Loading `shellstate.toml`.
//!
//! ```toml
//! [provider]
//! environment = { REGION = "eu-west-1" }
//!
//! [resource.greeting]
//! environment = { NAME = "world" }
//!
//! [resource.greeting.lifecycle_commands]
//! create = "./greeting.sh create"
//! read = "./greeting.sh read"
//! delete = "./greeting.sh delete"
//!
//! [data.region]
//! read = "printf '{\"region\": \"%s\"}' \"$REGION\""
//! ```
//!
//! Relative working directories are resolved against the directory holding
//! the config file.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use shellstate_lib::config::{ExecutionSettings, ProviderConfig};
use shellstate_lib::resource::{DataSourceConfig, ResourceConfig};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
  #[serde(default)]
  pub provider: ProviderConfig,

  #[serde(default)]
  pub resource: BTreeMap<String, ResourceConfig>,

  #[serde(default)]
  pub data: BTreeMap<String, DataSourceConfig>,
}

impl Config {
  pub fn load(path: &Path) -> Result<Self> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read config {}", path.display()))?;
    let mut config = Self::parse(&content).with_context(|| format!("Invalid config {}", path.display()))?;

    let base = path.parent().unwrap_or(Path::new("."));
    config.resolve_paths(base);
    debug!(
      path = %path.display(),
      resources = config.resource.len(),
      data_sources = config.data.len(),
      "config loaded"
    );
    Ok(config)
  }

  pub fn parse(content: &str) -> Result<Self> {
    let config: Config = toml::from_str(content).context("Failed to parse TOML")?;
    config.validate()?;
    Ok(config)
  }

  fn validate(&self) -> Result<()> {
    self.provider.validate().context("provider")?;
    for (name, resource) in &self.resource {
      resource.validate().with_context(|| format!("resource '{}'", name))?;
    }
    for (name, source) in &self.data {
      source.validate().with_context(|| format!("data source '{}'", name))?;
    }
    Ok(())
  }

  fn resolve_paths(&mut self, base: &Path) {
    let settings = self
      .resource
      .values_mut()
      .map(|r| &mut r.settings)
      .chain(self.data.values_mut().map(|d| &mut d.settings));
    for settings in settings {
      resolve_working_directory(settings, base);
    }
  }
}

fn resolve_working_directory(settings: &mut ExecutionSettings, base: &Path) {
  if settings.working_directory.is_relative() {
    settings.working_directory = base.join(&settings.working_directory);
  }
}
