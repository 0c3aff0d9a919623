use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::config::{DEFAULT_LOADER, LoaderConfig};
use crate::error::{LoaderError, StatsReadError};
use crate::stats::Stats;

/// Strategy for obtaining the current stats of a configuration.
///
/// The filesystem reader is the default. Hosts can register alternate sources (a
/// remote manifest, an embedded copy) in a [`LoaderRegistry`] and select them through
/// `LOADER_CLASS`.
pub trait StatsLoader: Send + Sync {
  /// Read and parse the stats. Every call must observe the source afresh.
  fn load(&self, config: &LoaderConfig) -> Result<Stats, LoaderError>;
}

/// Reads the JSON stats file named by `STATS_FILE`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileStatsLoader;

impl StatsLoader for FileStatsLoader {
  fn load(&self, config: &LoaderConfig) -> Result<Stats, LoaderError> {
    debug!("Loading webpack stats file {}", config.stats_file.display());
    read_stats(&config.stats_file)
  }
}

/// Load a stats document from disk.
///
/// A file caught mid-rewrite by the bundler surfaces as a parse failure.
pub fn read_stats(path: &Path) -> Result<Stats, LoaderError> {
  let content = fs::read_to_string(path).map_err(|err| LoaderError::StatsRead {
    path: path.to_path_buf(),
    source: StatsReadError::Io(err),
  })?;

  serde_json::from_str(&content).map_err(|err| LoaderError::StatsRead {
    path: path.to_path_buf(),
    source: StatsReadError::Parse(err),
  })
}

/// Table of stats loader strategies keyed by their `LOADER_CLASS` identifier.
#[derive(Clone)]
pub struct LoaderRegistry {
  loaders: BTreeMap<String, Arc<dyn StatsLoader>>,
}

impl LoaderRegistry {
  /// Registry with no strategies at all.
  pub fn empty() -> Self {
    Self {
      loaders: BTreeMap::new(),
    }
  }

  /// Register `loader` under `id`, replacing any previous entry.
  pub fn register(mut self, id: impl Into<String>, loader: impl StatsLoader + 'static) -> Self {
    self.loaders.insert(id.into(), Arc::new(loader));
    self
  }

  /// Strategy registered under `id`.
  pub fn get(&self, id: &str) -> Option<Arc<dyn StatsLoader>> {
    self.loaders.get(id).cloned()
  }

  /// Whether a strategy is registered under `id`.
  pub fn contains(&self, id: &str) -> bool {
    self.loaders.contains_key(id)
  }
}

impl Default for LoaderRegistry {
  fn default() -> Self {
    Self::empty().register(DEFAULT_LOADER, FileStatsLoader)
  }
}

impl fmt::Debug for LoaderRegistry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_set().entries(self.loaders.keys()).finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[test]
  fn reads_stats_from_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("webpack-stats.json");
    fs::write(&path, r#"{"status": "compile"}"#).unwrap();

    assert_eq!(read_stats(&path).unwrap(), Stats::Compiling);
  }

  #[test]
  fn missing_file_reports_path_and_cause() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("webpack-stats.json");

    let err = read_stats(&path).unwrap_err();
    assert!(matches!(err, LoaderError::StatsRead { source: StatsReadError::Io(_), .. }));
    assert!(err.to_string().contains("webpack-stats.json"));
  }

  #[test]
  fn truncated_file_is_a_parse_failure() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("webpack-stats.json");
    fs::write(&path, r#"{"status": "done", "chunks": {"main": ["#).unwrap();

    let err = read_stats(&path).unwrap_err();
    assert!(matches!(err, LoaderError::StatsRead { source: StatsReadError::Parse(_), .. }));
  }

  #[test]
  fn default_registry_knows_the_file_loader() {
    let registry = LoaderRegistry::default();
    assert!(registry.contains(DEFAULT_LOADER));
    assert!(registry.get("custom").is_none());
    assert!(!LoaderRegistry::empty().contains(DEFAULT_LOADER));
  }
}
