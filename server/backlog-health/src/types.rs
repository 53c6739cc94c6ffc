//! Core types for the health engine (JSON contracts + internal models).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ScoringConfig;

// ---------------------------------------------------------------------------
// Inbound types (JSON contract, caller side)
// ---------------------------------------------------------------------------

/// Coarse status bucket underlying an issue's specific status name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCategory {
  #[serde(alias = "to_do", alias = "todo", alias = "open")]
  New,
  #[serde(alias = "indeterminate", alias = "in-progress", alias = "inProgress")]
  InProgress,
  #[serde(alias = "closed", alias = "complete")]
  Done,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Status {
  pub name: String,
  pub category: StatusCategory,
}

/// A typed link from one issue to another. Links whose type name contains
/// "block" and carry an inward issue mark the holder as blocked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueLink {
  #[serde(rename = "type")]
  pub link_type: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub inward: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub outward: Option<String>,
}

/// One backlog issue as supplied by the tracker collaborator. Custom fields
/// (estimate, initiative, anything deployment-specific) arrive under their
/// raw field ids and are collected into `custom`; `serde_json::Map` keeps
/// insertion order so pass-through serialization stays deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
  pub key: String,
  #[serde(default)]
  pub summary: String,
  pub status: Status,
  pub created: DateTime<Utc>,
  pub updated: DateTime<Utc>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub assignee: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub priority: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub issue_type: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<serde_json::Value>,
  #[serde(default)]
  pub flagged: bool,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub links: Vec<IssueLink>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub parent: Option<String>,
  #[serde(flatten)]
  pub custom: serde_json::Map<String, serde_json::Value>,
}

/// One scoring request from stdin.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRequest {
  pub issues: Vec<Issue>,
  #[serde(default)]
  pub config: ScoringConfig,
  /// Evaluation instant; defaults to the wall clock. Fixing it makes the
  /// engine fully reproducible.
  #[serde(default)]
  pub now: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Output types (JSON contract, result side)
// ---------------------------------------------------------------------------

/// One weighted scoring dimension. `weighted_score` is rounded from the
/// unrounded raw score times the weight; the composite sums these already-
/// rounded values (two-stage rounding, kept for score continuity).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimension {
  pub name: String,
  pub weight: f64,
  pub score: u8,
  pub weighted_score: u8,
  pub detail: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
  Stale,
  Zombie,
  Unestimated,
  PriorityInflation,
  Blocked,
  LowReadiness,
  NoInitiative,
  LowSprintCoverage,
}

/// A threshold warning. At most one alert per type per invocation; `issues`
/// holds up to 20 representative keys in input order.
#[derive(Debug, Clone, Serialize)]
pub struct Alert {
  #[serde(rename = "type")]
  pub alert_type: AlertType,
  pub message: String,
  pub count: usize,
  pub issues: Vec<String>,
}

/// The full scoring result: issue pass-through, composite score, dimension
/// breakdown, alerts, and summary counters.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BacklogHealth {
  pub issues: Vec<Issue>,
  pub health_score: u8,
  pub dimensions: Vec<Dimension>,
  pub alerts: Vec<Alert>,
  pub total_items: usize,
  pub ready_items: usize,
  pub blocked_items: usize,
  pub strategic_allocation_pct: u8,
  pub stale_items: usize,
  pub zombie_items: usize,
}
