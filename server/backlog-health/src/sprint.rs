//! Sprint aggregation: point bucketing by status category, WIP per assignee,
//! blocker detection, burndown, and scope change for one sprint's issues.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ScoringConfig;
use crate::points;
use crate::types::{Issue, StatusCategory};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sprint {
  pub id: i64,
  pub name: String,
  #[serde(default)]
  pub state: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub start_date: Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub end_date: Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub goal: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BurndownPoint {
  pub date: NaiveDate,
  pub ideal: f64,
  pub actual: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WipLoad {
  pub count: usize,
  pub points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScopeChange {
  pub added: usize,
  pub removed: usize,
  pub net: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintSnapshot {
  pub sprint: Sprint,
  pub total_points: f64,
  pub completed_points: f64,
  pub in_progress_points: f64,
  pub todo_points: f64,
  pub completion_rate: f64,
  pub burndown: Vec<BurndownPoint>,
  /// Keys of flagged issues or issues sitting in a blocked-looking status.
  pub blockers: Vec<String>,
  pub wip_per_assignee: BTreeMap<String, WipLoad>,
  pub unassigned_count: usize,
  pub scope_change: ScopeChange,
}

/// Aggregate one sprint's issues into the snapshot the dashboard renders.
pub fn aggregate_sprint(
  sprint: &Sprint,
  issues: &[Issue],
  config: &ScoringConfig,
  now: DateTime<Utc>,
) -> SprintSnapshot {
  let mut total_points = 0.0;
  let mut completed_points = 0.0;
  let mut in_progress_points = 0.0;
  let mut todo_points = 0.0;
  let mut blockers: Vec<String> = Vec::new();
  let mut wip: BTreeMap<String, WipLoad> = BTreeMap::new();
  let mut unassigned_count = 0;

  for issue in issues {
    let pts = points::estimate(issue, &config.estimate_field);
    total_points += pts;

    match issue.status.category {
      StatusCategory::Done => completed_points += pts,
      StatusCategory::InProgress => {
        in_progress_points += pts;
        let assignee = issue.assignee.clone().unwrap_or_else(|| "Unassigned".to_string());
        let load = wip.entry(assignee).or_default();
        load.count += 1;
        load.points += pts;
      }
      StatusCategory::New => todo_points += pts,
    }

    if issue.flagged || issue.status.name.to_lowercase().contains("block") {
      blockers.push(issue.key.clone());
    }

    if issue.assignee.is_none() && issue.status.category != StatusCategory::Done {
      unassigned_count += 1;
    }
  }

  let completion_rate = if total_points > 0.0 {
    completed_points / total_points
  } else {
    0.0
  };

  SprintSnapshot {
    sprint: sprint.clone(),
    total_points,
    completed_points,
    in_progress_points,
    todo_points,
    completion_rate,
    burndown: compute_burndown(sprint, issues, config, total_points, now),
    blockers,
    wip_per_assignee: wip,
    unassigned_count,
    scope_change: compute_scope_change(sprint, issues),
  }
}

/// Daily ideal-vs-actual remaining points from sprint start through
/// min(now, sprint end). Actual burns a done issue's points on its last
/// update day.
fn compute_burndown(
  sprint: &Sprint,
  issues: &[Issue],
  config: &ScoringConfig,
  total_points: f64,
  now: DateTime<Utc>,
) -> Vec<BurndownPoint> {
  let (start, end) = match (sprint.start_date, sprint.end_date) {
    (Some(s), Some(e)) => (s, e),
    _ => return Vec::new(),
  };
  let total_days = ((end - start).num_seconds() as f64 / 86_400.0).ceil();
  if total_days <= 0.0 {
    return Vec::new();
  }
  let effective_end = if now < end { now } else { end };

  let mut out = Vec::new();
  let mut day_index: i64 = 0;
  loop {
    let day = start + Duration::days(day_index);
    if day > effective_end {
      break;
    }

    let ideal = (total_points - total_points / total_days * day_index as f64).max(0.0);

    let completed_by_day: f64 = issues
      .iter()
      .filter(|i| i.status.category == StatusCategory::Done && i.updated <= day)
      .map(|i| points::estimate(i, &config.estimate_field))
      .sum();

    out.push(BurndownPoint {
      date: day.date_naive(),
      ideal: round1(ideal),
      actual: round1(total_points - completed_by_day),
    });
    day_index += 1;
  }
  out
}

/// Scope change without changelog access: issues created after sprint start
/// count as added; removals need changelog analysis and stay at zero.
fn compute_scope_change(sprint: &Sprint, issues: &[Issue]) -> ScopeChange {
  let start = match sprint.start_date {
    Some(s) => s,
    None => {
      return ScopeChange {
        added: 0,
        removed: 0,
        net: 0,
      }
    }
  };
  let added = issues.iter().filter(|i| i.created > start).count();
  ScopeChange {
    added,
    removed: 0,
    net: added as i64,
  }
}

fn round1(x: f64) -> f64 {
  (x * 10.0).round() / 10.0
}
