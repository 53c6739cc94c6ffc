//! The eight scoring dimensions.
//!
//! Each scorer is a pure function of the issue set and config, independent of
//! the others, returning a 0-100 score clamped by its own formula. Every
//! ratio guards a zero denominator and falls back to 0 (or the documented
//! neutral score) instead of NaN.

use chrono::{DateTime, Duration, Utc};

use crate::config::ScoringConfig;
use crate::points;
use crate::types::{Dimension, Issue};

pub const STRATEGIC_WEIGHT: f64 = 0.15;
pub const READINESS_WEIGHT: f64 = 0.20;
pub const DEPENDENCIES_WEIGHT: f64 = 0.10;
pub const BLOCKED_DURATION_WEIGHT: f64 = 0.05;
pub const PRIORITY_WEIGHT: f64 = 0.10;
pub const AGE_WEIGHT: f64 = 0.10;
pub const GROOMING_WEIGHT: f64 = 0.15;
pub const COVERAGE_WEIGHT: f64 = 0.15;

/// Sprint-coverage outcome, kept unrounded for the low-coverage alert.
#[derive(Debug, Clone, Copy)]
pub struct Coverage {
  pub ratio: f64,
  pub score: f64,
}

fn dimension(name: &str, weight: f64, raw: f64, detail: String) -> Dimension {
  Dimension {
    name: name.to_string(),
    weight,
    score: raw.round() as u8,
    // Weighted from the unrounded score, then rounded; the composite sums
    // these already-rounded values.
    weighted_score: (raw * weight).round() as u8,
    detail,
  }
}

fn pct(ratio: f64) -> i64 {
  (ratio * 100.0).round() as i64
}

fn days_since(now: DateTime<Utc>, then: DateTime<Utc>) -> f64 {
  (now - then).num_seconds() as f64 / 86_400.0
}

// ---------------------------------------------------------------------------
// Shared predicates
// ---------------------------------------------------------------------------

/// Initiative linkage: custom field populated, or parent key resolved through
/// the epic chain.
pub fn has_initiative(issue: &Issue, field_id: &str, config: &ScoringConfig) -> bool {
  if points::has_custom_field(issue, field_id) {
    return true;
  }
  issue
    .parent
    .as_ref()
    .is_some_and(|p| config.initiative_linked_parents.contains(p))
}

/// An issue is ready when it has a substantial description (>100 chars once
/// rich text is serialized), a non-zero estimate, a real priority, and (if an
/// initiative field is configured) an initiative link.
pub fn is_ready(issue: &Issue, config: &ScoringConfig) -> bool {
  let described = match &issue.description {
    None => false,
    Some(serde_json::Value::String(s)) => s.len() > 100,
    Some(rich) => serde_json::to_string(rich).map(|s| s.len() > 100).unwrap_or(false),
  };
  let estimated = points::estimate(issue, &config.estimate_field) > 0.0;
  let prioritized = issue
    .priority
    .as_deref()
    .is_some_and(|p| !p.is_empty() && p != "None");
  let aligned = match &config.initiative_field {
    Some(field) => has_initiative(issue, field, config),
    None => true,
  };
  described && estimated && prioritized && aligned
}

/// An issue is blocked when flagged, or when any inward link of a blocking
/// type points at it.
pub fn is_blocked(issue: &Issue) -> bool {
  if issue.flagged {
    return true;
  }
  issue
    .links
    .iter()
    .any(|l| l.link_type.to_lowercase().contains("block") && l.inward.is_some())
}

// ---------------------------------------------------------------------------
// Dimension scorers
// ---------------------------------------------------------------------------

/// 1. Strategic Allocation: share of story points tied to an initiative.
/// 70% allocation scores 100. Returns the raw ratio alongside the dimension
/// for the no_initiative alert and the summary percentage.
pub fn strategic_allocation(issues: &[Issue], config: &ScoringConfig) -> (Dimension, f64) {
  let field = match &config.initiative_field {
    Some(f) => f,
    None => {
      let dim = dimension(
        "Strategic Allocation",
        STRATEGIC_WEIGHT,
        50.0,
        "No initiative field configured; score neutral".to_string(),
      );
      return (dim, 0.0);
    }
  };

  let mut total_points = 0.0;
  let mut aligned_points = 0.0;
  for issue in issues {
    let pts = points::estimate(issue, &config.estimate_field);
    total_points += pts;
    if pts > 0.0 && has_initiative(issue, field, config) {
      aligned_points += pts;
    }
  }

  let ratio = if total_points > 0.0 {
    aligned_points / total_points
  } else {
    0.0
  };
  let raw = (ratio / 0.7 * 100.0).min(100.0);
  let detail = format!("{}% of story points tied to initiatives", pct(ratio));
  (dimension("Strategic Allocation", STRATEGIC_WEIGHT, raw, detail), ratio)
}

/// 2. Backlog Readiness: share of fully-defined items. 70% ready scores 100.
pub fn backlog_readiness(issues: &[Issue], ready: &[bool]) -> Dimension {
  let ready_count = ready.iter().filter(|r| **r).count();
  let ratio = if issues.is_empty() {
    0.0
  } else {
    ready_count as f64 / issues.len() as f64
  };
  let raw = (ratio / 0.7 * 100.0).min(100.0);
  let detail = format!(
    "{}/{} items fully defined ({}%)",
    ready_count,
    issues.len(),
    pct(ratio)
  );
  dimension("Backlog Readiness", READINESS_WEIGHT, raw, detail)
}

/// 3. Dependencies: blocked share; 15% blocked drives the score to 0.
pub fn dependencies(issues: &[Issue], blocked: &[bool]) -> Dimension {
  let blocked_count = blocked.iter().filter(|b| **b).count();
  let ratio = if issues.is_empty() {
    0.0
  } else {
    blocked_count as f64 / issues.len() as f64
  };
  let raw = (100.0 - ratio / 0.15 * 100.0).clamp(0.0, 100.0);
  let detail = if blocked_count > 0 {
    format!(
      "{}/{} items blocked ({}%)",
      blocked_count,
      issues.len(),
      pct(ratio)
    )
  } else {
    "No blocked items".to_string()
  };
  dimension("Dependencies", DEPENDENCIES_WEIGHT, raw, detail)
}

/// 4. Avg Blocked Duration: mean days since last update across blocked items,
/// 14 days average drives the score to 0. The update timestamp is a proxy;
/// tracking the actual flagged-at transition needs changelog access.
pub fn blocked_duration(issues: &[Issue], blocked: &[bool], now: DateTime<Utc>) -> Dimension {
  let blocked_issues: Vec<&Issue> = issues
    .iter()
    .zip(blocked)
    .filter(|(_, b)| **b)
    .map(|(i, _)| i)
    .collect();

  if blocked_issues.is_empty() {
    return dimension(
      "Avg Blocked Duration",
      BLOCKED_DURATION_WEIGHT,
      100.0,
      "No blocked items".to_string(),
    );
  }

  let total_days: f64 = blocked_issues.iter().map(|i| days_since(now, i.updated)).sum();
  let avg_days = total_days / blocked_issues.len() as f64;
  let raw = (100.0 - avg_days / 14.0 * 100.0).clamp(0.0, 100.0);
  let detail = format!("{:.1} days avg blocked duration", avg_days);
  dimension("Avg Blocked Duration", BLOCKED_DURATION_WEIGHT, raw, detail)
}

/// 5. Priority Distribution: concentration above 50% in one label is
/// penalized sharply; otherwise normalized Shannon entropy (100 = even).
/// Returns the per-label counts (first-seen order) for the inflation alert.
pub fn priority_distribution(issues: &[Issue]) -> (Dimension, Vec<(String, usize)>) {
  let mut counts: Vec<(String, usize)> = Vec::new();
  for issue in issues {
    let label = match issue.priority.as_deref() {
      Some(p) if !p.is_empty() => p,
      _ => "None",
    };
    match counts.iter_mut().find(|(l, _)| l == label) {
      Some((_, c)) => *c += 1,
      None => counts.push((label.to_string(), 1)),
    }
  }

  let raw = distribution_score(&counts, issues.len());
  let detail = counts
    .iter()
    .map(|(label, count)| format!("{}: {}", label, count))
    .collect::<Vec<_>>()
    .join(", ");
  (dimension("Priority Distribution", PRIORITY_WEIGHT, raw, detail), counts)
}

fn distribution_score(counts: &[(String, usize)], total: usize) -> f64 {
  if total == 0 {
    return 100.0;
  }
  let total_f = total as f64;
  let max_share = counts
    .iter()
    .map(|(_, c)| *c as f64 / total_f)
    .fold(0.0, f64::max);

  if max_share > 0.5 {
    return ((1.0 - max_share) * 200.0).max(0.0);
  }

  let entropy: f64 = counts
    .iter()
    .filter(|(_, c)| *c > 0)
    .map(|(_, c)| {
      let p = *c as f64 / total_f;
      -p * p.log2()
    })
    .sum();
  let max_entropy = (counts.len() as f64).log2();
  if max_entropy > 0.0 {
    // The entropy branch rounds before weighting; the concentration branch
    // does not. Kept asymmetric for score continuity with history.
    (entropy / max_entropy * 100.0).round()
  } else {
    100.0
  }
}

/// 6. Age Distribution: share created more than 90 days ago; 10% old drives
/// the score to 0.
pub fn age_distribution(issues: &[Issue], now: DateTime<Utc>) -> Dimension {
  let cutoff = now - Duration::days(90);
  let old_count = issues.iter().filter(|i| i.created < cutoff).count();
  let ratio = if issues.is_empty() {
    0.0
  } else {
    old_count as f64 / issues.len() as f64
  };
  let raw = (100.0 - ratio / 0.10 * 100.0).clamp(0.0, 100.0);
  let detail = format!(
    "{}/{} older than 90d ({}%)",
    old_count,
    issues.len(),
    pct(ratio)
  );
  dimension("Age Distribution", AGE_WEIGHT, raw, detail)
}

/// 7. Grooming Freshness: share updated in the last 45 days; 80% fresh
/// scores 100.
pub fn grooming_freshness(issues: &[Issue], now: DateTime<Utc>) -> Dimension {
  let cutoff = now - Duration::days(45);
  let fresh_count = issues.iter().filter(|i| i.updated >= cutoff).count();
  let ratio = if issues.is_empty() {
    0.0
  } else {
    fresh_count as f64 / issues.len() as f64
  };
  let raw = (ratio / 0.8 * 100.0).min(100.0);
  let detail = format!(
    "{}/{} updated in last 45d ({}%)",
    fresh_count,
    issues.len(),
    pct(ratio)
  );
  dimension("Grooming Freshness", GROOMING_WEIGHT, raw, detail)
}

/// 8. 2-Sprint Readiness: ready story points against two sprints of average
/// velocity. Without velocity data the score is a neutral 50. Ready points
/// come from the configured ready statuses when present, otherwise from the
/// field-completion readiness set.
pub fn sprint_coverage(
  issues: &[Issue],
  config: &ScoringConfig,
  ready: &[bool],
) -> (Dimension, Option<Coverage>) {
  let velocity = match config.avg_velocity {
    Some(v) if v > 0.0 => v,
    _ => {
      let dim = dimension(
        "2-Sprint Readiness",
        COVERAGE_WEIGHT,
        50.0,
        "No velocity data; score neutral".to_string(),
      );
      return (dim, None);
    }
  };

  let ready_points: f64 = if !config.ready_statuses.is_empty() {
    let names: Vec<String> = config.ready_statuses.iter().map(|s| s.to_lowercase()).collect();
    issues
      .iter()
      .filter(|i| names.contains(&i.status.name.to_lowercase()))
      .map(|i| points::estimate(i, &config.estimate_field))
      .sum()
  } else {
    issues
      .iter()
      .zip(ready)
      .filter(|(_, r)| **r)
      .map(|(i, _)| points::estimate(i, &config.estimate_field))
      .sum()
  };

  let target = velocity * 2.0;
  let ratio = ready_points / target;
  let raw = (ratio * 100.0).min(100.0);
  let detail = format!(
    "{:.0} ready SP / {:.0} target ({}%)",
    ready_points,
    target,
    pct(ratio)
  );
  let dim = dimension("2-Sprint Readiness", COVERAGE_WEIGHT, raw, detail);
  (dim, Some(Coverage { ratio, score: raw }))
}
