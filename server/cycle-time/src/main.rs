//! Binary entrypoint: read one JSON request from stdin, write one summary to
//! stdout.
//!
//! The request carries pre-fetched changelogs keyed by issue, so the binary
//! stays pure computation with no network; live deployments implement
//! `ChangelogSource` against their tracker client instead.

use std::collections::HashMap;
use std::io::{self, Read, Write};

use async_trait::async_trait;
use serde::Deserialize;

use cycle_time::{compute_cycle_times, ChangelogEntry, ChangelogSource, FetchError, DEFAULT_CONCURRENCY};

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
  issues: Vec<backlog_health::Issue>,
  #[serde(default)]
  changelogs: HashMap<String, Vec<ChangelogEntry>>,
  #[serde(default)]
  concurrency: Option<usize>,
}

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

#[tokio::main]
async fn main() {
  if let Err(e) = run_binary().await {
    let _ = writeln!(io::stderr(), "cycle-time error: {}", e);
    std::process::exit(1);
  }
}

async fn run_binary() -> Result<(), Box<dyn std::error::Error>> {
  let mut raw = String::new();
  io::stdin().lock().read_to_string(&mut raw)?;
  let request: AnalyzeRequest = serde_json::from_str(&raw)?;

  let source = MapSource {
    changelogs: request.changelogs,
  };
  let concurrency = request.concurrency.unwrap_or(DEFAULT_CONCURRENCY);
  let summary = compute_cycle_times(&request.issues, &source, concurrency).await;

  let json = serde_json::to_vec(&summary)?;
  io::stdout().write_all(&json)?;
  Ok(())
}
