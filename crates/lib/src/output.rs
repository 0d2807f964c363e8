//! State extraction from command output.
//!
//! Lifecycle scripts are free to print diagnostics, but must end their stdout
//! with a single JSON object describing the resource. This module recovers
//! that object and flattens it into an [`Output`] map.
//!
//! # Extraction rule
//!
//! Every substring running from an opening brace to the end of the text is a
//! candidate. Candidates are tried right to left and the first one that parses
//! as a JSON object wins. Trailing whitespace after the object is allowed;
//! any other trailing text rejects that candidate.
//!
//! # Value coercion
//!
//! | JSON value        | Output string                 |
//! |-------------------|-------------------------------|
//! | string            | the string itself             |
//! | `true` / `false`  | `"true"` / `"false"`          |
//! | number            | its source text, e.g. `"1e2"` |
//! | `null`            | `""`                          |
//! | array / object    | compact JSON text             |

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::debug;

use crate::redact::Redactor;

/// Externally observed state of a resource.
pub type Output = BTreeMap<String, String>;

/// Extract the trailing JSON object from `raw` as an [`Output`].
///
/// Returns `None` if no candidate parses. Values are redacted with
/// `redactor` before they are returned.
pub fn extract(raw: &str, redactor: &Redactor) -> Option<Output> {
  let object = raw
    .match_indices('{')
    .rev()
    .find_map(|(idx, _)| serde_json::from_str::<Map<String, Value>>(&raw[idx..]).ok());

  let Some(object) = object else {
    debug!(raw = %redactor.redact(raw), "no valid JSON object found at end of output");
    return None;
  };

  let output: Output = object
    .into_iter()
    .map(|(key, value)| (key, redactor.redact(&coerce(&value))))
    .collect();

  debug!(output = ?output, "extracted output");
  Some(output)
}

/// Render a JSON value as an output string.
fn coerce(value: &Value) -> String {
  match value {
    Value::Null => String::new(),
    Value::String(s) => s.clone(),
    Value::Bool(b) => b.to_string(),
    Value::Number(n) => n.to_string(),
    Value::Array(_) | Value::Object(_) => value.to_string(),
  }
}
