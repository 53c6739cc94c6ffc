//! Changelog and duration types (JSON contracts).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One changelog history entry: a timestamped batch of field changes.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangelogEntry {
  pub created: DateTime<Utc>,
  #[serde(default)]
  pub items: Vec<ChangeItem>,
}

/// One field change within a history entry. Only `field == "status"` items
/// matter here; `to` is the human-readable target label.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangeItem {
  pub field: String,
  #[serde(default)]
  pub to: Option<String>,
}

/// Cycle-time record for one completed issue.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleTimeEntry {
  pub issue_key: String,
  pub issue_type: String,
  pub start_date: DateTime<Utc>,
  pub end_date: DateTime<Utc>,
  pub cycle_days: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleTimeSummary {
  /// Mean cycle days over qualifying issues; absent when none qualify.
  pub avg_cycle_time: Option<f64>,
  /// Mean lead days over issues with a done transition; absent when none.
  pub avg_lead_time: Option<f64>,
  pub entries: Vec<CycleTimeEntry>,
}
