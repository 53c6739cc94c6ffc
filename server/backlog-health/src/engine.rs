//! Composite aggregator: runs every dimension and alert rule over one issue
//! set and assembles the final result.

use chrono::{DateTime, Utc};

use crate::alerts::{self, ScanInputs};
use crate::config::ScoringConfig;
use crate::dimensions;
use crate::types::{BacklogHealth, Issue};

/// The backlog health engine. Stateless between invocations: scoring is a
/// pure function of (issues, config, now), so one engine may be shared across
/// callers freely.
pub struct HealthEngine {
  config: ScoringConfig,
}

impl HealthEngine {
  pub fn new(config: ScoringConfig) -> Self {
    Self { config }
  }

  pub fn with_defaults() -> Self {
    Self::new(ScoringConfig::default())
  }

  /// Score one backlog. `now` is the evaluation instant; identical inputs
  /// always produce an identical result.
  pub fn score(&self, issues: Vec<Issue>, now: DateTime<Utc>) -> BacklogHealth {
    let config = &self.config;

    let ready: Vec<bool> = issues.iter().map(|i| dimensions::is_ready(i, config)).collect();
    let blocked: Vec<bool> = issues.iter().map(dimensions::is_blocked).collect();

    let (strategic, strategic_ratio) = dimensions::strategic_allocation(&issues, config);
    let readiness = dimensions::backlog_readiness(&issues, &ready);
    let deps = dimensions::dependencies(&issues, &blocked);
    let blocked_age = dimensions::blocked_duration(&issues, &blocked, now);
    let (priority, priority_counts) = dimensions::priority_distribution(&issues);
    let age = dimensions::age_distribution(&issues, now);
    let grooming = dimensions::grooming_freshness(&issues, now);
    let (coverage_dim, coverage) = dimensions::sprint_coverage(&issues, config, &ready);

    let scan = alerts::scan(
      &issues,
      config,
      now,
      &ScanInputs {
        strategic_ratio,
        ready: &ready,
        blocked: &blocked,
        priority_counts: &priority_counts,
        coverage,
      },
    );

    let dims = vec![
      strategic,
      readiness,
      deps,
      blocked_age,
      priority,
      age,
      grooming,
      coverage_dim,
    ];
    // Weighted scores are already rounded per dimension; the weight
    // vocabulary sums to 1.0, so this stays within 0-100 without clamping.
    let health_score = dims.iter().map(|d| d.weighted_score as u32).sum::<u32>() as u8;

    let ready_items = ready.iter().filter(|r| **r).count();
    let blocked_items = blocked.iter().filter(|b| **b).count();
    let total_items = issues.len();

    BacklogHealth {
      issues,
      health_score,
      dimensions: dims,
      alerts: scan.alerts,
      total_items,
      ready_items,
      blocked_items,
      strategic_allocation_pct: (strategic_ratio * 100.0).round() as u8,
      stale_items: scan.stale_items,
      zombie_items: scan.zombie_items,
    }
  }
}
