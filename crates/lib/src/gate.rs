//! In-process mutual exclusion for command execution.
//!
//! The gate hands out one async mutex per key. The lifecycle engine always
//! locks [`DEFAULT_GATE_KEY`], so with the gate enabled at most one lifecycle
//! command runs at a time. A disabled gate never blocks; scripts run
//! concurrently and are responsible for their own exclusion.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;

/// Key every lifecycle command is serialized under.
pub const DEFAULT_GATE_KEY: &str = "shell-script";

type KeyedLocks = HashMap<String, Arc<AsyncMutex<()>>>;

#[derive(Debug, Clone)]
pub struct ConcurrencyGate {
  /// `None` when parallelism is enabled.
  locks: Option<Arc<Mutex<KeyedLocks>>>,
}

/// Held for the duration of one command. Releases the key on drop.
#[derive(Debug)]
pub struct GatePermit {
  _guard: Option<OwnedMutexGuard<()>>,
}

impl ConcurrencyGate {
  /// Gate for the given provider setting.
  pub fn new(enable_parallelism: bool) -> Self {
    if enable_parallelism {
      Self::disabled()
    } else {
      Self::serialized()
    }
  }

  /// A gate that serializes acquisitions of the same key.
  pub fn serialized() -> Self {
    Self {
      locks: Some(Arc::new(Mutex::new(HashMap::new()))),
    }
  }

  /// A gate whose permits never block.
  pub fn disabled() -> Self {
    Self { locks: None }
  }

  pub fn is_enabled(&self) -> bool {
    self.locks.is_some()
  }

  /// Wait for exclusive access to `key`.
  pub async fn acquire(&self, key: &str) -> GatePermit {
    let Some(locks) = &self.locks else {
      return GatePermit { _guard: None };
    };

    let lock = {
      let mut locks = locks.lock().unwrap_or_else(PoisonError::into_inner);
      Arc::clone(locks.entry(key.to_string()).or_default())
    };

    debug!(key = %key, "parallelism disabled, locking");
    let guard = lock.lock_owned().await;
    debug!(key = %key, "lock acquired");

    GatePermit { _guard: Some(guard) }
  }
}

impl Default for ConcurrencyGate {
  fn default() -> Self {
    Self::serialized()
  }
}
