//! Resolution of bundle names into ordered chunk URLs.
//!
//! A [`BundleResolver`] binds one configuration to its stats loader, the shared cache and the
//! host's static URL capability. Resolution is all-or-nothing: a missing bundle or chunk fails
//! the whole call, while chunks matching an ignore pattern are dropped silently.

mod poll;
mod url;

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error};

use crate::cache::{StatsCache, StatsSnapshot};
use crate::config::LoaderConfig;
use crate::error::{LoaderError, Result};
use crate::stats::{BuildFailure, ChunkAsset, CompiledStats, Stats, StatsLoader};

pub use poll::CancellationToken;
pub use url::{StaticFiles, StaticUrlPrefix, resolve_chunk_url};

/// A chunk of a bundle together with its public URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedChunk {
  /// File name relative to the bundle directory.
  pub name: String,
  /// URL to embed in markup.
  pub url: String,
  /// Explicit public path from the stats, if any.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub public_path: Option<String>,
  /// Subresource integrity hash, if any.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub integrity: Option<String>,
  /// On-disk path reported by the bundler, if any.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub path: Option<String>,
}

impl ResolvedChunk {
  /// Pair `asset` with its resolved `url`.
  pub fn new(asset: &ChunkAsset, url: String) -> Self {
    Self {
      name: asset.name.clone(),
      url,
      public_path: asset.public_path.clone(),
      integrity: asset.integrity.clone(),
      path: asset.path.clone(),
    }
  }
}

/// Resolution engine for one named configuration.
pub struct BundleResolver {
  config: Arc<LoaderConfig>,
  loader: Arc<dyn StatsLoader>,
  cache: Arc<StatsCache>,
  static_files: Arc<dyn StaticFiles>,
}

impl BundleResolver {
  /// Bind a configuration to its collaborators.
  pub fn new(
    config: Arc<LoaderConfig>,
    loader: Arc<dyn StatsLoader>,
    cache: Arc<StatsCache>,
    static_files: Arc<dyn StaticFiles>,
  ) -> Self {
    Self {
      config,
      loader,
      cache,
      static_files,
    }
  }

  /// The configuration this resolver serves.
  pub fn config(&self) -> &LoaderConfig {
    &self.config
  }

  /// Current stats, from the cache when enabled.
  ///
  /// `replace_cache` forces a read from the source and stores the result.
  pub fn stats(&self, replace_cache: bool) -> Result<Arc<StatsSnapshot>> {
    let name = self.config.name.as_str();
    if !self.config.cache {
      debug!("Cache disabled, loading stats for '{}'", name);
      return Ok(Arc::new(StatsSnapshot::new(self.loader.load(&self.config)?)));
    }

    if !replace_cache {
      if let Some(snapshot) = self.cache.get(name) {
        debug!("Stats for '{}' found in cache", name);
        return Ok(snapshot);
      }
    }

    debug!("Stats for '{}' not in cache, loading", name);
    let snapshot = Arc::new(StatsSnapshot::new(self.loader.load(&self.config)?));
    self.cache.put(name, Arc::clone(&snapshot));
    Ok(snapshot)
  }

  /// Top-level `publicPath` of compiled stats. Fails unless the build is done.
  pub fn public_path(&self, asset: &str) -> Result<Option<String>> {
    let snapshot = self.stats(false)?;
    match snapshot.stats() {
      Stats::Done(compiled) => Ok(compiled.public_path.clone()),
      Stats::Error(failure) => Err(self.build_failed(failure)),
      pending => Err(self.bad_stats(asset, pending)),
    }
  }

  /// Resolve `bundle` without external cancellation.
  pub fn resolve_bundle(&self, bundle: &str) -> Result<Vec<ResolvedChunk>> {
    self.resolve_bundle_with(bundle, &CancellationToken::new())
  }

  /// Resolve `bundle` into its chunks in stats order, waiting on the build when polling is
  /// configured. `cancel` is honoured between poll iterations.
  pub fn resolve_bundle_with(
    &self,
    bundle: &str,
    cancel: &CancellationToken,
  ) -> Result<Vec<ResolvedChunk>> {
    debug!("Loading bundle '{}' from loader '{}'", bundle, self.config.name);

    let snapshot = self.stats(false)?;
    let snapshot = self.wait_for_build(bundle, snapshot, cancel)?;

    match snapshot.stats() {
      Stats::Done(compiled) => self.collect_chunks(bundle, &snapshot, compiled),
      Stats::Error(failure) => Err(self.build_failed(failure)),
      pending => Err(self.bad_stats(bundle, pending)),
    }
  }

  fn collect_chunks(
    &self,
    bundle: &str,
    snapshot: &StatsSnapshot,
    compiled: &CompiledStats,
  ) -> Result<Vec<ResolvedChunk>> {
    let Some(chunk_names) = compiled.bundle(bundle) else {
      return Err(LoaderError::BundleNotFound {
        config: self.config.name.clone(),
        bundle: bundle.to_string(),
      });
    };

    let mut resolved = Vec::with_capacity(chunk_names.len());
    for chunk_name in chunk_names {
      debug!("Retrieving asset with chunk name '{}'", chunk_name);
      let Some(asset) = compiled.asset(chunk_name) else {
        error!("Could not find asset with chunk name '{}'", chunk_name);
        return Err(LoaderError::ChunkNotFound {
          config: self.config.name.clone(),
          bundle: bundle.to_string(),
          chunk: chunk_name.clone(),
        });
      };

      let url = match snapshot.resolved_url(chunk_name) {
        Some(url) => url,
        None if self.config.is_ignored(chunk_name) => continue,
        None => snapshot.remember_url(
          chunk_name,
          resolve_chunk_url(asset, &self.config, self.static_files.as_ref()),
        ),
      };
      resolved.push(ResolvedChunk::new(asset, url));
    }

    Ok(resolved)
  }

  fn build_failed(&self, failure: &BuildFailure) -> LoaderError {
    error!(
      "Error found in webpack: '{}' - {}",
      failure.error_id(),
      failure.message()
    );
    LoaderError::BuildFailed {
      config: self.config.name.clone(),
      error: failure.error_id().to_string(),
      message: failure.message().to_string(),
    }
  }

  fn bad_stats(&self, request: &str, stats: &Stats) -> LoaderError {
    error!(
      "Webpack stats '{}' has unusable status '{}'",
      self.config.name,
      stats.status()
    );
    LoaderError::BadStats {
      config: self.config.name.clone(),
      bundle: request.to_string(),
      status: stats.status().to_string(),
    }
  }
}
