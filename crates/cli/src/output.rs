//! CLI output formatting utilities.
//!
//! Colored status lines, the symbols used for planned transitions, and JSON
//! printing.

use anyhow::Context;
use owo_colors::{OwoColorize, Stream};

use shellstate_lib::output::Output;
use shellstate_lib::redact::MASK;
use shellstate_lib::resource::Transition;

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
  pub const ADD: &str = "+";
  pub const MODIFY: &str = "~";
  pub const REMOVE: &str = "-";
}

/// Resource identifiers are long hex digests; show the first 12 characters.
pub fn truncate_id(id: &str) -> &str {
  match id.char_indices().nth(12) {
    Some((idx, _)) => &id[..idx],
    None => id,
  }
}

/// Replace every value of a sensitive output with the mask, keeping the keys.
pub fn mask_values(output: &mut Output) {
  for value in output.values_mut() {
    *value = MASK.to_string();
  }
}

pub fn print_success(message: &str) {
  println!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    message
  );
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_warning(message: &str) {
  eprintln!(
    "{} {}",
    symbols::WARNING.if_supports_color(Stream::Stderr, |s| s.yellow()),
    message.if_supports_color(Stream::Stderr, |s| s.yellow())
  );
}

pub fn print_info(message: &str) {
  println!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    message
  );
}

pub fn print_stat(label: &str, value: &str) {
  println!(
    "  {}: {}",
    label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}

/// One line per applied change, e.g. `+ greeting (created)`.
pub fn print_change(symbol: &str, name: &str, detail: &str) {
  let symbol = match symbol {
    symbols::ADD => symbol.if_supports_color(Stream::Stdout, |s| s.green()).to_string(),
    symbols::REMOVE => symbol.if_supports_color(Stream::Stdout, |s| s.red()).to_string(),
    _ => symbol.if_supports_color(Stream::Stdout, |s| s.yellow()).to_string(),
  };
  println!(
    "  {} {} {}",
    symbol,
    name,
    format!("({})", detail).if_supports_color(Stream::Stdout, |s| s.dimmed())
  );
}

/// Symbol and description for a transition, or `None` when nothing changed.
pub fn describe_transition(transition: &Transition) -> Option<(&'static str, &'static str)> {
  match transition {
    Transition::NoChange => None,
    Transition::Create => Some((symbols::ADD, "created")),
    Transition::Update => Some((symbols::MODIFY, "updated")),
    Transition::Adopt {
      output_will_change: true,
    } => Some((symbols::MODIFY, "commands changed, refreshed")),
    Transition::Adopt {
      output_will_change: false,
    } => Some((symbols::MODIFY, "commands changed")),
  }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}
