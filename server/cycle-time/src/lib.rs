//! Cycle / Lead Time Analyzer.
//!
//! Derives duration metrics for completed issues from their status-change
//! history: cycle time (first in-progress transition to last done
//! transition) and lead time (creation to last done transition). Changelogs
//! come through the `ChangelogSource` seam with bounded concurrency; a fetch
//! failure skips that issue and never aborts the batch.

pub mod analyzer;
pub mod error;
pub mod types;

pub use analyzer::{compute_cycle_times, ChangelogSource, DEFAULT_CONCURRENCY, MAX_CHANGELOG_FETCHES};
pub use error::FetchError;
pub use types::{ChangeItem, ChangelogEntry, CycleTimeEntry, CycleTimeSummary};
