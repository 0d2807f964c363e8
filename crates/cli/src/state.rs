//! State file persistence.
//!
//! Records are stored by resource name in a single JSON file next to the
//! config:
//!
//! ```json
//! {
//!   "version": 1,
//!   "resources": {
//!     "greeting": {
//!       "id": "9f2c...",
//!       "config": { "lifecycle_commands": { "create": "...", "delete": "..." } },
//!       "output": { "message": "hello" },
//!       "dirty": false
//!     }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use shellstate_lib::redact::MASK;
use shellstate_lib::resource::ResourceRecord;

use crate::output::mask_values;

pub const STATE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum StateError {
  #[error("failed to read state file: {0}")]
  Read(#[source] io::Error),

  #[error("failed to write state file: {0}")]
  Write(#[source] io::Error),

  #[error("failed to parse state file: {0}")]
  Parse(#[source] serde_json::Error),

  #[error("failed to serialize state: {0}")]
  Serialize(#[source] serde_json::Error),

  #[error("unsupported state file version {found}")]
  Version { found: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateFile {
  pub version: u32,

  #[serde(default)]
  pub resources: BTreeMap<String, ResourceRecord>,
}

impl Default for StateFile {
  fn default() -> Self {
    Self {
      version: STATE_VERSION,
      resources: BTreeMap::new(),
    }
  }
}

impl StateFile {
  /// Load state from `path`. A missing file is an empty state.
  pub fn load(path: &Path) -> Result<Self, StateError> {
    let content = match fs::read_to_string(path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => {
        debug!(path = %path.display(), "state file not found, starting empty");
        return Ok(Self::default());
      }
      Err(e) => return Err(StateError::Read(e)),
    };

    let state: StateFile = serde_json::from_str(&content).map_err(StateError::Parse)?;
    if state.version != STATE_VERSION {
      return Err(StateError::Version { found: state.version });
    }
    debug!(path = %path.display(), resources = state.resources.len(), "state loaded");
    Ok(state)
  }

  /// Write state to `path` atomically: write to a temp file, then rename.
  pub fn save(&self, path: &Path) -> Result<(), StateError> {
    let content = serde_json::to_string_pretty(self).map_err(StateError::Serialize)?;

    let mut temp_path = path.as_os_str().to_owned();
    temp_path.push(".tmp");
    fs::write(&temp_path, content).map_err(StateError::Write)?;
    fs::rename(&temp_path, path).map_err(StateError::Write)?;

    info!(path = %path.display(), resources = self.resources.len(), "state saved");
    Ok(())
  }

  /// Keep `name` only while its record is present.
  pub fn retain_present(&mut self, name: &str) {
    if self.resources.get(name).is_some_and(|r| !r.is_present()) {
      self.resources.remove(name);
    }
  }

  /// A copy safe to display, with sensitive environment values and the
  /// output of `sensitive_output` resources masked.
  pub fn masked(&self) -> Self {
    let mut masked = self.clone();
    for record in masked.resources.values_mut() {
      for value in record.config.settings.sensitive_environment.values_mut() {
        *value = MASK.to_string();
      }
      if record.config.sensitive_output {
        mask_values(&mut record.output);
      }
    }
    masked
  }
}
