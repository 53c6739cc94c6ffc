//! Process-lifetime cache for a discovered tracker field id.
//!
//! Field discovery is one upstream API call whose answer never changes within
//! a deployment, so callers discover once and reuse. This is an explicit,
//! injectable cache object rather than a hidden module global; `invalidate`
//! forces re-discovery after a tracker schema change.

use std::sync::Mutex;

pub struct FieldCache {
  slot: Mutex<Option<Option<String>>>,
}

impl FieldCache {
  pub const fn new() -> Self {
    Self {
      slot: Mutex::new(None),
    }
  }

  /// Return the cached field id, running `discover` on first use. A failed
  /// discovery is cached as absent (callers fall back to unconfigured
  /// behavior) until `invalidate` is called.
  pub fn get_or_discover<E>(
    &self,
    discover: impl FnOnce() -> Result<Option<String>, E>,
  ) -> Option<String> {
    let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(cached) = slot.as_ref() {
      return cached.clone();
    }
    let value = discover().unwrap_or(None);
    *slot = Some(value.clone());
    value
  }

  pub fn invalidate(&self) {
    let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
    *slot = None;
  }
}

impl Default for FieldCache {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn discovers_once_and_reuses() {
    let cache = FieldCache::new();
    let mut calls = 0;
    let first = cache.get_or_discover(|| -> Result<_, ()> {
      calls += 1;
      Ok(Some("customfield_10501".to_string()))
    });
    let second = cache.get_or_discover(|| -> Result<_, ()> {
      calls += 1;
      Ok(Some("other".to_string()))
    });
    assert_eq!(first.as_deref(), Some("customfield_10501"));
    assert_eq!(second.as_deref(), Some("customfield_10501"));
    assert_eq!(calls, 1);
  }

  #[test]
  fn failed_discovery_cached_as_absent() {
    let cache = FieldCache::new();
    let mut calls = 0;
    let first = cache.get_or_discover(|| -> Result<Option<String>, &str> {
      calls += 1;
      Err("upstream unavailable")
    });
    let second = cache.get_or_discover(|| -> Result<_, ()> {
      calls += 1;
      Ok(Some("customfield_10501".to_string()))
    });
    assert!(first.is_none());
    assert!(second.is_none());
    assert_eq!(calls, 1);
  }

  #[test]
  fn invalidate_forces_rediscovery() {
    let cache = FieldCache::new();
    cache.get_or_discover(|| -> Result<_, ()> { Ok(Some("a".to_string())) });
    cache.invalidate();
    let after = cache.get_or_discover(|| -> Result<_, ()> { Ok(Some("b".to_string())) });
    assert_eq!(after.as_deref(), Some("b"));
  }
}
