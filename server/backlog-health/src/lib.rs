//! Deterministic, rule-based backlog health scoring.
//!
//! Converts a materialized backlog issue set plus scoring config into a
//! 0-100 health score across eight weighted dimensions, threshold alerts,
//! and summary counters. Also aggregates sprint snapshots.
//!
//! No AI, no DB, no network; pure computation.

pub mod alerts;
pub mod config;
pub mod dimensions;
pub mod engine;
pub mod error;
pub mod fields;
pub mod points;
pub mod sprint;
pub mod types;

pub use config::ScoringConfig;
pub use engine::HealthEngine;
pub use error::EngineError;
pub use fields::FieldCache;
pub use types::{BacklogHealth, Issue, ScoreRequest};
