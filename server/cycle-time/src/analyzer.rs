//! Cycle/lead time derivation from status-change history.
//!
//! Cycle time runs from the first transition into an in-progress-looking
//! status to the last transition into a done-looking status; lead time runs
//! from issue creation to that same done transition. Status matching is a
//! case-insensitive substring test on the transition's target label, so
//! deployment-specific status names ("In Progress", "Dev in progress",
//! "Done", "Released/Done") all resolve without configuration.

use async_trait::async_trait;
use backlog_health::types::{Issue, StatusCategory};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};

use crate::error::FetchError;
use crate::types::{ChangelogEntry, CycleTimeEntry, CycleTimeSummary};

/// Changelog fetches are bounded per batch to keep load on the upstream API
/// predictable.
pub const MAX_CHANGELOG_FETCHES: usize = 50;
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Per-issue status history provider. One call per issue; failures are
/// isolated to that issue.
#[async_trait]
pub trait ChangelogSource: Sync {
  async fn changelog(&self, issue_key: &str) -> Result<Vec<ChangelogEntry>, FetchError>;
}

/// Compute cycle/lead times over the first `MAX_CHANGELOG_FETCHES` done
/// issues, fetching changelogs with at most `concurrency` requests in
/// flight. A failed fetch skips that issue; results are reassembled in input
/// order so concurrent completion order never shows in the output.
pub async fn compute_cycle_times<S: ChangelogSource>(
  issues: &[Issue],
  source: &S,
  concurrency: usize,
) -> CycleTimeSummary {
  let done: Vec<&Issue> = issues
    .iter()
    .filter(|i| i.status.category == StatusCategory::Done)
    .take(MAX_CHANGELOG_FETCHES)
    .collect();

  let mut fetched: Vec<(usize, &Issue, Vec<ChangelogEntry>)> =
    stream::iter(done.into_iter().enumerate())
      .map(|(idx, issue)| async move {
        match source.changelog(&issue.key).await {
          Ok(log) => Some((idx, issue, log)),
          Err(_) => None,
        }
      })
      .buffer_unordered(concurrency.max(1))
      .filter_map(|fetch| async move { fetch })
      .collect()
      .await;
  fetched.sort_by_key(|(idx, _, _)| *idx);

  let mut entries: Vec<CycleTimeEntry> = Vec::new();
  let mut lead_times: Vec<f64> = Vec::new();

  for (_, issue, mut log) in fetched {
    log.sort_by_key(|entry| entry.created);
    let times = extract_times(issue, &log);
    if let (Some(cycle), Some(start), Some(end)) = (times.cycle_days, times.start, times.end) {
      entries.push(CycleTimeEntry {
        issue_key: issue.key.clone(),
        issue_type: issue.issue_type.clone().unwrap_or_default(),
        start_date: start,
        end_date: end,
        cycle_days: cycle,
      });
    }
    if let Some(lead) = times.lead_days {
      lead_times.push(lead);
    }
  }

  let cycle_times: Vec<f64> = entries.iter().map(|e| e.cycle_days).collect();
  CycleTimeSummary {
    avg_cycle_time: mean(&cycle_times),
    avg_lead_time: mean(&lead_times),
    entries,
  }
}

struct IssueTimes {
  cycle_days: Option<f64>,
  lead_days: Option<f64>,
  start: Option<DateTime<Utc>>,
  end: Option<DateTime<Utc>>,
}

fn extract_times(issue: &Issue, log: &[ChangelogEntry]) -> IssueTimes {
  let mut in_progress_at: Option<DateTime<Utc>> = None;
  let mut done_at: Option<DateTime<Utc>> = None;

  for entry in log {
    for item in &entry.items {
      if item.field != "status" {
        continue;
      }
      let label = item.to.as_deref().unwrap_or("").to_lowercase();
      // First in-progress transition; last done transition.
      if in_progress_at.is_none() && label.contains("progress") {
        in_progress_at = Some(entry.created);
      }
      if label.contains("done") {
        done_at = Some(entry.created);
      }
    }
  }

  let cycle_days = match (in_progress_at, done_at) {
    (Some(start), Some(end)) => Some(round1(days_between(start, end))),
    _ => None,
  };
  let lead_days = done_at.map(|end| round1(days_between(issue.created, end)));

  IssueTimes {
    cycle_days,
    lead_days,
    start: in_progress_at,
    end: done_at,
  }
}

fn days_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
  (end - start).num_seconds() as f64 / 86_400.0
}

fn round1(x: f64) -> f64 {
  (x * 10.0).round() / 10.0
}

fn mean(xs: &[f64]) -> Option<f64> {
  if xs.is_empty() {
    None
  } else {
    Some(xs.iter().sum::<f64>() / xs.len() as f64)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use backlog_health::types::Status;
  use chrono::TimeZone;
  use std::collections::HashMap;

  use crate::types::ChangeItem;

  struct MapSource {
    changelogs: HashMap<String, Vec<ChangelogEntry>>,
  }

  #[async_trait]
  impl ChangelogSource for MapSource {
    async fn changelog(&self, issue_key: &str) -> Result<Vec<ChangelogEntry>, FetchError> {
      self
        .changelogs
        .get(issue_key)
        .cloned()
        .ok_or_else(|| FetchError::new(format!("no changelog for {}", issue_key)))
    }
  }

  fn ts(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, day, hour, 0, 0).unwrap()
  }

  fn done_issue(key: &str, created: DateTime<Utc>) -> Issue {
    Issue {
      key: key.to_string(),
      summary: String::new(),
      status: Status {
        name: "Done".into(),
        category: StatusCategory::Done,
      },
      created,
      updated: ts(20, 0),
      assignee: None,
      priority: None,
      issue_type: Some("Story".into()),
      description: None,
      flagged: false,
      links: Vec::new(),
      parent: None,
      custom: serde_json::Map::new(),
    }
  }

  fn status_change(created: DateTime<Utc>, to: &str) -> ChangelogEntry {
    ChangelogEntry {
      created,
      items: vec![ChangeItem {
        field: "status".into(),
        to: Some(to.to_string()),
      }],
    }
  }

  #[tokio::test]
  async fn cycle_and_lead_from_transitions() {
    let issue = done_issue("ENG-1", ts(1, 0));
    let source = MapSource {
      changelogs: [(
        "ENG-1".to_string(),
        vec![
          status_change(ts(3, 0), "In Progress"),
          status_change(ts(6, 12), "Done"),
        ],
      )]
      .into_iter()
      .collect(),
    };

    let summary = compute_cycle_times(&[issue], &source, DEFAULT_CONCURRENCY).await;
    assert_eq!(summary.entries.len(), 1);
    let entry = &summary.entries[0];
    assert_eq!(entry.cycle_days, 3.5);
    assert_eq!(entry.issue_type, "Story");
    // Lead: created May 1, done May 6 12:00.
    assert_eq!(summary.avg_lead_time, Some(5.5));
    assert_eq!(summary.avg_cycle_time, Some(3.5));
  }

  #[tokio::test]
  async fn last_done_transition_wins() {
    let issue = done_issue("ENG-1", ts(1, 0));
    // Reopened and re-done; the later done transition counts. Entries arrive
    // out of order and are sorted by timestamp first.
    let source = MapSource {
      changelogs: [(
        "ENG-1".to_string(),
        vec![
          status_change(ts(10, 0), "Done"),
          status_change(ts(2, 0), "In Progress"),
          status_change(ts(4, 0), "Done"),
          status_change(ts(6, 0), "In Progress"),
        ],
      )]
      .into_iter()
      .collect(),
    };

    let summary = compute_cycle_times(&[issue], &source, DEFAULT_CONCURRENCY).await;
    // First in-progress May 2, last done May 10.
    assert_eq!(summary.entries[0].cycle_days, 8.0);
    assert_eq!(summary.entries[0].start_date, ts(2, 0));
    assert_eq!(summary.entries[0].end_date, ts(10, 0));
  }

  #[tokio::test]
  async fn missing_transitions_yield_no_entry() {
    let issue = done_issue("ENG-1", ts(1, 0));
    // Went straight to done with no in-progress phase: lead time only.
    let source = MapSource {
      changelogs: [("ENG-1".to_string(), vec![status_change(ts(5, 0), "Done")])]
        .into_iter()
        .collect(),
    };

    let summary = compute_cycle_times(&[issue], &source, DEFAULT_CONCURRENCY).await;
    assert!(summary.entries.is_empty());
    assert_eq!(summary.avg_cycle_time, None);
    assert_eq!(summary.avg_lead_time, Some(4.0));
  }

  #[tokio::test]
  async fn fetch_failures_are_skipped() {
    let issues = vec![done_issue("ENG-1", ts(1, 0)), done_issue("ENG-2", ts(1, 0))];
    // Only ENG-2 has a changelog; ENG-1's fetch fails and is skipped.
    let source = MapSource {
      changelogs: [(
        "ENG-2".to_string(),
        vec![
          status_change(ts(2, 0), "In Progress"),
          status_change(ts(5, 0), "Done"),
        ],
      )]
      .into_iter()
      .collect(),
    };

    let summary = compute_cycle_times(&issues, &source, DEFAULT_CONCURRENCY).await;
    assert_eq!(summary.entries.len(), 1);
    assert_eq!(summary.entries[0].issue_key, "ENG-2");
  }

  #[tokio::test]
  async fn only_done_issues_are_analyzed() {
    let mut open = done_issue("ENG-1", ts(1, 0));
    open.status = Status {
      name: "In Progress".into(),
      category: StatusCategory::InProgress,
    };
    let source = MapSource {
      changelogs: HashMap::new(),
    };

    let summary = compute_cycle_times(&[open], &source, DEFAULT_CONCURRENCY).await;
    assert!(summary.entries.is_empty());
    assert_eq!(summary.avg_cycle_time, None);
    assert_eq!(summary.avg_lead_time, None);
  }

  #[tokio::test]
  async fn entries_keep_input_order() {
    let issues: Vec<Issue> = (0..6).map(|n| done_issue(&format!("ENG-{}", n), ts(1, 0))).collect();
    let changelogs: HashMap<String, Vec<ChangelogEntry>> = issues
      .iter()
      .map(|i| {
        (
          i.key.clone(),
          vec![
            status_change(ts(2, 0), "In Progress"),
            status_change(ts(4, 0), "Done"),
          ],
        )
      })
      .collect();
    let source = MapSource { changelogs };

    let summary = compute_cycle_times(&issues, &source, 3).await;
    let keys: Vec<&str> = summary.entries.iter().map(|e| e.issue_key.as_str()).collect();
    assert_eq!(keys, vec!["ENG-0", "ENG-1", "ENG-2", "ENG-3", "ENG-4", "ENG-5"]);
  }
}
