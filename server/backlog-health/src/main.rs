//! Binary entrypoint: read one JSON request from stdin, write one result to
//! stdout.

use backlog_health::{EngineError, HealthEngine, ScoreRequest};
use std::io::{self, Read, Write};

fn main() {
  if let Err(e) = run_binary() {
    let _ = writeln!(io::stderr(), "backlog-health error: {}", e);
    std::process::exit(1);
  }
}

fn run_binary() -> Result<(), EngineError> {
  let mut raw = String::new();
  io::stdin().lock().read_to_string(&mut raw)?;
  let request: ScoreRequest = serde_json::from_str(&raw)?;
  request.config.validate()?;

  let now = request.now.unwrap_or_else(chrono::Utc::now);
  let engine = HealthEngine::new(request.config);
  let result = engine.score(request.issues, now);

  let json = serde_json::to_vec(&result)?;
  io::stdout().write_all(&json)?;
  Ok(())
}
