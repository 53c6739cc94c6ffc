//! Threshold alerts derived from the raw issue set.
//!
//! Alerts are independent of dimension scoring (the engine passes in the
//! already-derived readiness/blocked masks to avoid rescanning, but every
//! rule here is a plain threshold over the same inputs). At most one alert
//! per type per invocation, emitted in a fixed order, each listing up to 20
//! representative keys in input order.

use chrono::{DateTime, Duration, Utc};

use crate::config::ScoringConfig;
use crate::dimensions::{has_initiative, Coverage};
use crate::points;
use crate::types::{Alert, AlertType, Issue};

/// Max representative issue keys per alert.
const MAX_ALERT_KEYS: usize = 20;

/// High-urgency priority labels counted toward the inflation alert.
const INFLATED_PRIORITIES: &[&str] = &["highest", "critical", "blocker"];

/// Derived per-issue facts the engine already computed for the dimensions.
pub struct ScanInputs<'a> {
  pub strategic_ratio: f64,
  pub ready: &'a [bool],
  pub blocked: &'a [bool],
  pub priority_counts: &'a [(String, usize)],
  pub coverage: Option<Coverage>,
}

/// Alert output plus the stale/zombie counts reused by the summary.
pub struct AlertScan {
  pub alerts: Vec<Alert>,
  pub stale_items: usize,
  pub zombie_items: usize,
}

fn keys(issues: &[&Issue]) -> Vec<String> {
  issues
    .iter()
    .take(MAX_ALERT_KEYS)
    .map(|i| i.key.clone())
    .collect()
}

fn pct(ratio: f64) -> i64 {
  (ratio * 100.0).round() as i64
}

pub fn scan(
  issues: &[Issue],
  config: &ScoringConfig,
  now: DateTime<Utc>,
  inputs: &ScanInputs<'_>,
) -> AlertScan {
  let mut alerts: Vec<Alert> = Vec::new();

  // Strategic allocation below 30% (only meaningful with a field configured).
  if let Some(field) = &config.initiative_field {
    if inputs.strategic_ratio < 0.3 {
      let unlinked: Vec<&Issue> = issues
        .iter()
        .filter(|i| {
          !has_initiative(i, field, config) && points::estimate(i, &config.estimate_field) > 0.0
        })
        .collect();
      alerts.push(Alert {
        alert_type: AlertType::NoInitiative,
        message: format!(
          "{}% strategic allocation; {} estimated items not linked to an initiative",
          pct(inputs.strategic_ratio),
          unlinked.len()
        ),
        count: unlinked.len(),
        issues: keys(&unlinked),
      });
    }
  }

  // Readiness below 30%.
  let ready_count = inputs.ready.iter().filter(|r| **r).count();
  if !issues.is_empty() {
    let ratio = ready_count as f64 / issues.len() as f64;
    if ratio < 0.3 {
      alerts.push(Alert {
        alert_type: AlertType::LowReadiness,
        message: format!("Only {}% of backlog items are fully defined", pct(ratio)),
        count: issues.len() - ready_count,
        issues: Vec::new(),
      });
    }
  }

  // Any blocked work.
  let blocked: Vec<&Issue> = issues
    .iter()
    .zip(inputs.blocked)
    .filter(|(_, b)| **b)
    .map(|(i, _)| i)
    .collect();
  if !blocked.is_empty() {
    alerts.push(Alert {
      alert_type: AlertType::Blocked,
      message: format!("{} items currently blocked", blocked.len()),
      count: blocked.len(),
      issues: keys(&blocked),
    });
  }

  // More than half the backlog at top urgency.
  let inflated: usize = inputs
    .priority_counts
    .iter()
    .filter(|(label, _)| INFLATED_PRIORITIES.contains(&label.to_lowercase().as_str()))
    .map(|(_, count)| *count)
    .sum();
  if !issues.is_empty() && inflated as f64 / issues.len() as f64 > 0.5 {
    alerts.push(Alert {
      alert_type: AlertType::PriorityInflation,
      message: format!(
        "{}% of issues marked Highest/Critical",
        pct(inflated as f64 / issues.len() as f64)
      ),
      count: inflated,
      issues: Vec::new(),
    });
  }

  // Under half of two sprints' capacity ready (requires velocity data).
  if let Some(coverage) = inputs.coverage {
    if coverage.score < 50.0 {
      alerts.push(Alert {
        alert_type: AlertType::LowSprintCoverage,
        message: format!(
          "Only {}% of 2-sprint capacity has ready work",
          pct(coverage.ratio)
        ),
        count: 0,
        issues: Vec::new(),
      });
    }
  }

  // Stale: no update inside the configured window.
  let stale_cutoff = now - Duration::days(config.stale_days);
  let stale: Vec<&Issue> = issues.iter().filter(|i| i.updated < stale_cutoff).collect();
  if !stale.is_empty() {
    alerts.push(Alert {
      alert_type: AlertType::Stale,
      message: format!(
        "{} items not updated in {}+ days",
        stale.len(),
        config.stale_days
      ),
      count: stale.len(),
      issues: keys(&stale),
    });
  }

  // Zombie: created long ago and never touched since.
  let zombie_cutoff = now - Duration::days(config.zombie_days);
  let zombies: Vec<&Issue> = issues
    .iter()
    .filter(|i| i.created < zombie_cutoff && i.updated < zombie_cutoff)
    .collect();
  if !zombies.is_empty() {
    alerts.push(Alert {
      alert_type: AlertType::Zombie,
      message: format!(
        "{} zombie issues ({}+ days, no activity)",
        zombies.len(),
        config.zombie_days
      ),
      count: zombies.len(),
      issues: keys(&zombies),
    });
  }

  // Unestimated work.
  let unestimated: Vec<&Issue> = issues
    .iter()
    .filter(|i| points::estimate(i, &config.estimate_field) == 0.0)
    .collect();
  if !unestimated.is_empty() {
    alerts.push(Alert {
      alert_type: AlertType::Unestimated,
      message: format!("{} stories without estimates", unestimated.len()),
      count: unestimated.len(),
      issues: keys(&unestimated),
    });
  }

  AlertScan {
    alerts,
    stale_items: stale.len(),
    zombie_items: zombies.len(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  use crate::types::{Status, StatusCategory};

  fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
  }

  fn issue(key: &str, created_days_ago: i64, updated_days_ago: i64) -> Issue {
    Issue {
      key: key.to_string(),
      summary: String::new(),
      status: Status {
        name: "Backlog".into(),
        category: StatusCategory::New,
      },
      created: now() - Duration::days(created_days_ago),
      updated: now() - Duration::days(updated_days_ago),
      assignee: None,
      priority: Some("Medium".into()),
      issue_type: None,
      description: None,
      flagged: false,
      links: Vec::new(),
      parent: None,
      custom: serde_json::Map::new(),
    }
  }

  fn scan_simple(issues: &[Issue], config: &ScoringConfig) -> AlertScan {
    let ready = vec![true; issues.len()];
    let blocked = vec![false; issues.len()];
    let inputs = ScanInputs {
      strategic_ratio: 1.0,
      ready: &ready,
      blocked: &blocked,
      priority_counts: &[],
      coverage: None,
    };
    scan(issues, config, now(), &inputs)
  }

  fn find(scan: &AlertScan, ty: AlertType) -> Option<&Alert> {
    scan.alerts.iter().find(|a| a.alert_type == ty)
  }

  #[test]
  fn stale_alert_lists_matching_keys() {
    let config = ScoringConfig {
      stale_days: 60,
      ..ScoringConfig::default()
    };
    let issues = vec![issue("ENG-1", 70, 61), issue("ENG-2", 70, 5)];
    let result = scan_simple(&issues, &config);
    let stale = find(&result, AlertType::Stale).expect("stale alert");
    assert_eq!(stale.count, 1);
    assert_eq!(stale.issues, vec!["ENG-1"]);
    assert_eq!(result.stale_items, 1);
  }

  #[test]
  fn zombie_requires_both_timestamps_past_cutoff() {
    let config = ScoringConfig {
      zombie_days: 90,
      ..ScoringConfig::default()
    };
    // Created 100d ago, updated 95d ago: zombie. Created 100d ago but touched
    // recently: not a zombie.
    let issues = vec![issue("ENG-1", 100, 95), issue("ENG-2", 100, 10)];
    let result = scan_simple(&issues, &config);
    let zombie = find(&result, AlertType::Zombie).expect("zombie alert");
    assert_eq!(zombie.issues, vec!["ENG-1"]);
    assert_eq!(result.zombie_items, 1);
  }

  #[test]
  fn unestimated_counts_every_zero_estimate() {
    let config = ScoringConfig::default();
    let mut issues = vec![issue("ENG-1", 5, 1), issue("ENG-2", 5, 1)];
    issues[0]
      .custom
      .insert("customfield_10016".into(), serde_json::json!(5));
    let result = scan_simple(&issues, &config);
    let alert = find(&result, AlertType::Unestimated).expect("unestimated alert");
    assert_eq!(alert.count, 1);
    assert_eq!(alert.issues, vec!["ENG-2"]);
  }

  #[test]
  fn priority_inflation_over_half_highest() {
    let config = ScoringConfig::default();
    let issues: Vec<Issue> = (0..4).map(|n| issue(&format!("ENG-{}", n), 5, 1)).collect();
    let counts = vec![("Highest".to_string(), 3), ("Low".to_string(), 1)];
    let ready = vec![true; 4];
    let blocked = vec![false; 4];
    let inputs = ScanInputs {
      strategic_ratio: 1.0,
      ready: &ready,
      blocked: &blocked,
      priority_counts: &counts,
      coverage: None,
    };
    let result = scan(&issues, &config, now(), &inputs);
    let alert = find(&result, AlertType::PriorityInflation).expect("inflation alert");
    assert_eq!(alert.count, 3);
    assert!(alert.message.starts_with("75%"));
  }

  #[test]
  fn low_coverage_fires_only_below_half() {
    let config = ScoringConfig::default();
    let issues = vec![issue("ENG-1", 5, 1)];
    let ready = vec![true];
    let blocked = vec![false];
    let mut inputs = ScanInputs {
      strategic_ratio: 1.0,
      ready: &ready,
      blocked: &blocked,
      priority_counts: &[],
      coverage: Some(Coverage {
        ratio: 0.75,
        score: 75.0,
      }),
    };
    let result = scan(&issues, &config, now(), &inputs);
    assert!(find(&result, AlertType::LowSprintCoverage).is_none());

    inputs.coverage = Some(Coverage {
      ratio: 0.3,
      score: 30.0,
    });
    let result = scan(&issues, &config, now(), &inputs);
    let alert = find(&result, AlertType::LowSprintCoverage).expect("coverage alert");
    assert_eq!(alert.count, 0);
    assert!(alert.message.contains("30%"));
  }

  #[test]
  fn no_initiative_lists_estimated_unlinked_items() {
    let config = ScoringConfig {
      initiative_field: Some("customfield_10501".into()),
      ..ScoringConfig::default()
    };
    let mut issues = vec![issue("ENG-1", 5, 1), issue("ENG-2", 5, 1)];
    issues[0]
      .custom
      .insert("customfield_10016".into(), serde_json::json!(5));
    let ready = vec![false, false];
    let blocked = vec![false, false];
    let inputs = ScanInputs {
      strategic_ratio: 0.1,
      ready: &ready,
      blocked: &blocked,
      priority_counts: &[],
      coverage: None,
    };
    let result = scan(&issues, &config, now(), &inputs);
    let alert = find(&result, AlertType::NoInitiative).expect("no_initiative alert");
    // Only the estimated, unlinked issue is listed.
    assert_eq!(alert.count, 1);
    assert_eq!(alert.issues, vec!["ENG-1"]);
  }

  #[test]
  fn alert_keys_capped_at_twenty() {
    let config = ScoringConfig {
      stale_days: 10,
      ..ScoringConfig::default()
    };
    let issues: Vec<Issue> = (0..30)
      .map(|n| issue(&format!("ENG-{}", n), 40, 20))
      .collect();
    let result = scan_simple(&issues, &config);
    let stale = find(&result, AlertType::Stale).expect("stale alert");
    assert_eq!(stale.count, 30);
    assert_eq!(stale.issues.len(), 20);
    assert_eq!(stale.issues[0], "ENG-0");
  }

  #[test]
  fn empty_backlog_produces_no_alerts() {
    let result = scan_simple(&[], &ScoringConfig::default());
    assert!(result.alerts.is_empty());
    assert_eq!(result.stale_items, 0);
    assert_eq!(result.zombie_items, 0);
  }
}
