//! Error types for the analyzer.

use thiserror::Error;

/// A failed changelog fetch for one issue. The analyzer skips the issue and
/// continues; this type exists so sources can report what went wrong.
#[derive(Debug, Clone, Error)]
#[error("changelog fetch: {0}")]
pub struct FetchError(pub String);

impl FetchError {
  pub fn new(msg: impl Into<String>) -> Self {
    Self(msg.into())
  }
}
