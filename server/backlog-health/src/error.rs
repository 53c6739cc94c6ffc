//! Structured error types for the health engine.
//!
//! Scoring itself never fails (every division guards its denominator and
//! malformed field values resolve to zero); errors only arise at the
//! parse/validate boundary in front of the engine.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
  #[error("config: {0}")]
  Config(String),

  #[error("json: {0}")]
  Json(#[from] serde_json::Error),

  #[error("io: {0}")]
  Io(#[from] std::io::Error),
}

impl EngineError {
  pub fn config(msg: impl Into<String>) -> Self {
    Self::Config(msg.into())
  }
}
