//! Identifier generation.
//!
//! Resource identifiers carry no meaning beyond uniqueness: changes to a
//! resource's inputs drive update or replacement, never a new identifier.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use sha2::{Digest, Sha256};

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a new 64-character hex identifier.
///
/// The digest covers the process id, the current time and a process-wide
/// counter, so identifiers are unique within and across runs.
pub fn new_identifier() -> String {
  let nanos = SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .unwrap_or_default()
    .as_nanos();
  let count = COUNTER.fetch_add(1, Ordering::Relaxed);

  let mut hasher = Sha256::new();
  hasher.update(std::process::id().to_le_bytes());
  hasher.update(nanos.to_le_bytes());
  hasher.update(count.to_le_bytes());
  format!("{:x}", hasher.finalize())
}
