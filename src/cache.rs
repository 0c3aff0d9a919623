//! Shared per-configuration stats cache.
//!
//! A [`StatsCache`] is a memoization table keyed by configuration name. Entries are never
//! expired: they are replaced when a resolver forces a re-read while polling, and live as
//! long as the cache itself. One cache is typically created per [`crate::WebpackLoader`] and
//! shared by every resolver it builds.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::stats::Stats;

/// One read of the stats together with the chunk URLs resolved against it.
///
/// URLs are memoized per snapshot, so a fresh read starts with an empty memo.
#[derive(Debug)]
pub struct StatsSnapshot {
  stats: Stats,
  urls: Mutex<HashMap<String, String>>,
}

impl StatsSnapshot {
  /// Wrap freshly read stats.
  pub fn new(stats: Stats) -> Self {
    Self {
      stats,
      urls: Mutex::new(HashMap::new()),
    }
  }

  /// The stats as read.
  pub fn stats(&self) -> &Stats {
    &self.stats
  }

  /// Memoized URL of `chunk`, if one was stored.
  pub fn resolved_url(&self, chunk: &str) -> Option<String> {
    self.urls.lock().get(chunk).cloned()
  }

  /// Store the URL of `chunk`. An existing entry is kept.
  pub fn remember_url(&self, chunk: &str, url: String) -> String {
    self
      .urls
      .lock()
      .entry(chunk.to_string())
      .or_insert(url)
      .clone()
  }
}

/// Process-lifetime table of the last stats read per configuration.
#[derive(Debug, Default)]
pub struct StatsCache {
  entries: RwLock<HashMap<String, Arc<StatsSnapshot>>>,
}

impl StatsCache {
  /// Empty cache.
  pub fn new() -> Self {
    Self::default()
  }

  /// Cached snapshot for `config`.
  pub fn get(&self, config: &str) -> Option<Arc<StatsSnapshot>> {
    self.entries.read().get(config).cloned()
  }

  /// Store `snapshot` for `config`, replacing the previous entry.
  pub fn put(&self, config: &str, snapshot: Arc<StatsSnapshot>) {
    self.entries.write().insert(config.to_string(), snapshot);
  }

  /// Drop the entry for `config` so the next read goes to the source.
  pub fn invalidate(&self, config: &str) {
    self.entries.write().remove(config);
  }

  /// Drop every entry.
  pub fn clear(&self) {
    self.entries.write().clear();
  }
}
