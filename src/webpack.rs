//! Entry point used by template and handler layers.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::cache::StatsCache;
use crate::config::LoaderConfigs;
use crate::config::checks::{ConfigIssue, run_checks, run_provider_checks};
use crate::error::{ConfigError, LoaderError, Result};
use crate::resolver::{BundleResolver, ResolvedChunk, StaticFiles, StaticUrlPrefix};
use crate::settings::{Settings, SettingsProvider};
use crate::stats::LoaderRegistry;
use crate::tags::{filter_by_extension, render_tags, to_tags};

/// Resolves bundles for every configured name, sharing one stats cache.
///
/// Resolvers are built on first use of a configuration name and reused afterwards.
pub struct WebpackLoader {
  settings: Settings,
  configs: LoaderConfigs,
  loaders: LoaderRegistry,
  cache: Arc<StatsCache>,
  static_files: Arc<dyn StaticFiles>,
  resolvers: Mutex<HashMap<String, Arc<BundleResolver>>>,
}

impl WebpackLoader {
  /// Build a loader from settings, registered stats loaders and the host's static URL service.
  pub fn new(
    settings: Settings,
    loaders: LoaderRegistry,
    static_files: Arc<dyn StaticFiles>,
  ) -> Result<Self, ConfigError> {
    let configs = LoaderConfigs::from_settings(&settings)?;
    Ok(Self {
      settings,
      configs,
      loaders,
      cache: Arc::new(StatsCache::new()),
      static_files,
      resolvers: Mutex::new(HashMap::new()),
    })
  }

  /// Read settings once from `provider` and serve static paths below `STATIC_URL`.
  pub fn from_provider(
    provider: &dyn SettingsProvider,
    loaders: LoaderRegistry,
  ) -> Result<Self, ConfigError> {
    let settings = provider.settings()?;
    let static_files = Arc::new(StaticUrlPrefix::new(settings.static_url.clone()));
    Self::new(settings, loaders, static_files)
  }

  /// Startup self-check of the settings in `provider`, run before building a loader.
  ///
  /// Unlike [`WebpackLoader::from_provider`] this does not stop at the first problem, so
  /// unreadable settings and invalid configurations are all reported.
  pub fn check_provider(provider: &dyn SettingsProvider, loaders: &LoaderRegistry) -> Vec<ConfigIssue> {
    run_provider_checks(provider, loaders)
  }

  /// Startup self-check of the settings this loader was built from.
  pub fn check(&self) -> Vec<ConfigIssue> {
    run_checks(&self.settings, &self.loaders)
  }

  /// The stats cache shared by every resolver.
  pub fn cache(&self) -> &Arc<StatsCache> {
    &self.cache
  }

  /// Resolver for the configuration `config`.
  pub fn resolver(&self, config: &str) -> Result<Arc<BundleResolver>> {
    let mut resolvers = self.resolvers.lock();
    if let Some(resolver) = resolvers.get(config) {
      return Ok(Arc::clone(resolver));
    }

    let loader_config = self.configs.resolve(config)?;
    let loader = self
      .loaders
      .get(&loader_config.loader_class)
      .ok_or_else(|| LoaderError::UnknownLoader {
        config: config.to_string(),
        loader: loader_config.loader_class.clone(),
      })?;

    let resolver = Arc::new(BundleResolver::new(
      loader_config,
      loader,
      Arc::clone(&self.cache),
      Arc::clone(&self.static_files),
    ));
    resolvers.insert(config.to_string(), Arc::clone(&resolver));
    Ok(resolver)
  }

  /// Chunks of `bundle`, optionally restricted to one file extension.
  pub fn get_files(
    &self,
    bundle: &str,
    extension: Option<&str>,
    config: &str,
  ) -> Result<Vec<ResolvedChunk>> {
    let chunks = self.resolver(config)?.resolve_bundle(bundle)?;
    Ok(match extension {
      Some(extension) => filter_by_extension(chunks, extension),
      None => chunks,
    })
  }

  /// Script and stylesheet tags for `bundle`.
  pub fn get_as_tags(
    &self,
    bundle: &str,
    extension: Option<&str>,
    config: &str,
    attrs: &str,
  ) -> Result<Vec<String>> {
    let chunks = self.get_files(bundle, extension, config)?;
    Ok(to_tags(&chunks, attrs))
  }

  /// Tags for `bundle` joined into one markup string.
  pub fn render_bundle(
    &self,
    bundle: &str,
    extension: Option<&str>,
    config: &str,
    attrs: &str,
  ) -> Result<String> {
    let tags = self.get_as_tags(bundle, extension, config, attrs)?;
    Ok(render_tags(&tags))
  }

  /// URL of a webpack-emitted asset: the stats' `publicPath`, or `STATIC_URL`, followed by
  /// `asset`.
  pub fn get_static_url(&self, asset: &str, config: &str) -> Result<String> {
    let public_path = self.resolver(config)?.public_path(asset)?;
    let prefix = public_path.as_deref().unwrap_or(&self.settings.static_url);
    Ok(format!("{prefix}{asset}"))
  }
}
