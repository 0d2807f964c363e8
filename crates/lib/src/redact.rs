//! Secret redaction for log lines, error messages and computed outputs.
//!
//! Every string that leaves the process-execution layer (a streamed output
//! line, a failure report, an extracted output value) is passed through a
//! [`Redactor`] built from the sensitive environment values of the
//! invocation. Each occurrence of a secret is replaced by [`MASK`].

/// Token substituted for every occurrence of a secret value.
pub const MASK: &str = "******";

/// Replaces configured secret values with [`MASK`].
///
/// Matching is a single left-to-right pass. At each position the longest
/// secret that matches is consumed, so overlapping secrets such as `abc` and
/// `abcdef` never leave a partial secret behind, and the number of masks in
/// the result equals the number of occurrences removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Redactor {
  /// Non-empty secrets, longest first.
  secrets: Vec<String>,
}

impl Redactor {
  /// Build a redactor from secret values. Empty values are ignored.
  pub fn new<I, S>(secrets: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let mut secrets: Vec<String> = secrets.into_iter().map(Into::into).filter(|s| !s.is_empty()).collect();
    secrets.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    secrets.dedup();
    Self { secrets }
  }

  /// A redactor for text that is split into lines before redaction.
  ///
  /// A secret spanning several lines never appears whole on one line, so
  /// each non-empty line of such a secret is registered as well.
  pub fn for_lines(&self) -> Self {
    let fragments = self
      .secrets
      .iter()
      .filter(|secret| secret.contains('\n'))
      .flat_map(|secret| secret.lines())
      .map(str::trim)
      .filter(|line| !line.is_empty())
      .map(str::to_string);
    Self::new(self.secrets.iter().cloned().chain(fragments))
  }

  /// Returns true if there is nothing to redact.
  pub fn is_empty(&self) -> bool {
    self.secrets.is_empty()
  }

  /// Redact every secret occurrence in `text`.
  pub fn redact(&self, text: &str) -> String {
    if self.secrets.is_empty() {
      return text.to_string();
    }

    let mut result = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(ch) = rest.chars().next() {
      match self.secrets.iter().find(|secret| rest.starts_with(secret.as_str())) {
        Some(secret) => {
          result.push_str(MASK);
          rest = &rest[secret.len()..];
        }
        None => {
          result.push(ch);
          rest = &rest[ch.len_utf8()..];
        }
      }
    }

    result
  }
}

/// Redact `secrets` from `text` without keeping a [`Redactor`] around.
pub fn redact<S: AsRef<str>>(text: &str, secrets: &[S]) -> String {
  Redactor::new(secrets.iter().map(|s| s.as_ref().to_string())).redact(text)
}
