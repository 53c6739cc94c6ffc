//! Scoring configuration with sane defaults.

use std::collections::HashSet;

use serde::Deserialize;

use crate::error::EngineError;

/// Tunable thresholds and field ids for backlog scoring.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScoringConfig {
  /// Days without an update before an issue counts as stale.
  pub stale_days: i64,
  /// Days without creation or update activity before an issue is a zombie.
  pub zombie_days: i64,
  /// Custom field id holding the estimate (numeric or T-shirt label).
  pub estimate_field: String,
  /// Custom field id linking an issue to a strategic initiative. When absent,
  /// the strategic dimension scores a neutral 50 and readiness drops its
  /// initiative condition.
  pub initiative_field: Option<String>,
  /// Status names whose issues count as sprint-ready. When empty, the
  /// field-completion readiness set is used instead.
  pub ready_statuses: Vec<String>,
  /// Average completed points per sprint, from the historical snapshot store.
  /// Absent or zero velocity degrades sprint coverage to a neutral 50.
  pub avg_velocity: Option<f64>,
  /// Parent (epic) keys known to be linked to an initiative via the parent
  /// chain. An issue whose parent is in this set counts as initiative-linked
  /// even without the custom field populated.
  pub initiative_linked_parents: HashSet<String>,
}

impl Default for ScoringConfig {
  fn default() -> Self {
    Self {
      stale_days: 60,
      zombie_days: 90,
      estimate_field: "customfield_10016".to_string(),
      initiative_field: None,
      ready_statuses: Vec::new(),
      avg_velocity: None,
      initiative_linked_parents: HashSet::new(),
    }
  }
}

impl ScoringConfig {
  pub fn validate(&self) -> Result<(), EngineError> {
    if self.stale_days <= 0 {
      return Err(EngineError::config("staleDays must be positive"));
    }
    if self.zombie_days <= 0 {
      return Err(EngineError::config("zombieDays must be positive"));
    }
    if self.estimate_field.is_empty() {
      return Err(EngineError::config("estimateField must not be empty"));
    }
    if let Some(v) = self.avg_velocity {
      if v < 0.0 || !v.is_finite() {
        return Err(EngineError::config("avgVelocity must be finite and non-negative"));
      }
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_validate() {
    assert!(ScoringConfig::default().validate().is_ok());
  }

  #[test]
  fn rejects_non_positive_thresholds() {
    let config = ScoringConfig {
      stale_days: 0,
      ..ScoringConfig::default()
    };
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("staleDays"));
  }

  #[test]
  fn rejects_negative_velocity() {
    let config = ScoringConfig {
      avg_velocity: Some(-5.0),
      ..ScoringConfig::default()
    };
    assert!(config.validate().is_err());
  }

  #[test]
  fn deserializes_camel_case_with_defaults() {
    let config: ScoringConfig =
      serde_json::from_str(r#"{"staleDays": 30, "initiativeField": "customfield_10501"}"#).unwrap();
    assert_eq!(config.stale_days, 30);
    assert_eq!(config.zombie_days, 90);
    assert_eq!(config.initiative_field.as_deref(), Some("customfield_10501"));
    assert!(config.ready_statuses.is_empty());
  }
}
