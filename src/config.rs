//! Named loader configurations merged over the built-in defaults.

pub mod checks;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;

use crate::error::{ConfigError, LoaderError};
use crate::settings::Settings;

/// Name of the configuration used when callers do not pick one.
pub const DEFAULT_CONFIG_NAME: &str = "DEFAULT";

/// Identifier of the built-in filesystem stats loader.
pub const DEFAULT_LOADER: &str = "file";

const DEFAULT_BUNDLE_DIR_NAME: &str = "webpack_bundles/";
const DEFAULT_STATS_FILE: &str = "webpack-stats.json";
// TODO: replace polling with filesystem notifications once a watcher backend is chosen.
const DEFAULT_POLL_INTERVAL_SECS: f64 = 0.1;
const DEFAULT_IGNORE: [&str; 2] = [r".+\.hot-update.js", r".+\.map"];

/// Raw, partially specified configuration as written in the settings document.
///
/// Every field is optional. Missing fields take the default value when the record is
/// resolved into a [`LoaderConfig`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoaderSettings {
  /// Keep the last read stats in the process-wide cache.
  #[serde(rename = "CACHE")]
  pub cache: Option<bool>,
  /// Static path prefix for chunks without an explicit `publicPath`.
  #[serde(rename = "BUNDLE_DIR_NAME")]
  pub bundle_dir_name: Option<String>,
  /// Location of the stats file written by the bundle tracker.
  #[serde(rename = "STATS_FILE")]
  pub stats_file: Option<PathBuf>,
  /// Seconds between stats re-reads while the build is running.
  #[serde(rename = "POLL_INTERVAL")]
  pub poll_interval: Option<f64>,
  /// Seconds to wait for a running build. `0` waits forever, absent disables polling.
  #[serde(rename = "TIMEOUT")]
  pub timeout: Option<f64>,
  /// Regular expressions for chunk names that never produce URLs.
  #[serde(rename = "IGNORE")]
  pub ignore: Option<Vec<String>>,
  /// Identifier of the stats loader strategy.
  #[serde(rename = "LOADER_CLASS")]
  pub loader_class: Option<String>,
}

/// How the resolver waits on an unfinished build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollMode {
  /// Use the stats as read, even mid-compile.
  Disabled,
  /// Poll until the build finishes or the caller cancels.
  Unbounded,
  /// Poll until the build finishes or the timeout elapses.
  Bounded(Duration),
}

/// Fully populated configuration with precompiled ignore patterns.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
  /// Name the configuration is registered under.
  pub name: String,
  /// Whether stats are served from the shared cache.
  pub cache: bool,
  /// Static path prefix for chunks without an explicit `publicPath`.
  pub bundle_dir_name: String,
  /// Location of the stats file.
  pub stats_file: PathBuf,
  /// Delay between re-reads while polling.
  pub poll_interval: Duration,
  /// Polling timeout, see [`PollMode`].
  pub timeout: Option<Duration>,
  /// Ignore patterns as written.
  pub ignore: Vec<String>,
  /// Compiled form of [`LoaderConfig::ignore`].
  pub ignores: Vec<Regex>,
  /// Identifier of the stats loader strategy.
  pub loader_class: String,
}

impl LoaderConfig {
  /// Merge `raw` over the defaults.
  ///
  /// `debug` only feeds the default of the cache flag. The ignore matchers are always
  /// recompiled from whichever list wins the merge.
  pub fn resolve(name: &str, raw: &LoaderSettings, debug: bool) -> Result<Self, ConfigError> {
    let ignore = raw
      .ignore
      .clone()
      .unwrap_or_else(|| DEFAULT_IGNORE.iter().map(|pattern| pattern.to_string()).collect());
    let ignores = ignore
      .iter()
      .map(|pattern| {
        Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
          config: name.to_string(),
          pattern: pattern.clone(),
          source,
        })
      })
      .collect::<Result<Vec<_>, _>>()?;

    let poll_interval = seconds(
      name,
      "POLL_INTERVAL",
      raw.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
    )?;
    let timeout = raw
      .timeout
      .map(|value| seconds(name, "TIMEOUT", value))
      .transpose()?;

    Ok(Self {
      name: name.to_string(),
      cache: raw.cache.unwrap_or(!debug),
      bundle_dir_name: raw
        .bundle_dir_name
        .clone()
        .unwrap_or_else(|| DEFAULT_BUNDLE_DIR_NAME.into()),
      stats_file: raw
        .stats_file
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATS_FILE)),
      poll_interval,
      timeout,
      ignore,
      ignores,
      loader_class: raw
        .loader_class
        .clone()
        .unwrap_or_else(|| DEFAULT_LOADER.into()),
    })
  }

  /// Interpretation of [`LoaderConfig::timeout`].
  pub fn poll_mode(&self) -> PollMode {
    match self.timeout {
      None => PollMode::Disabled,
      Some(timeout) if timeout.is_zero() => PollMode::Unbounded,
      Some(timeout) => PollMode::Bounded(timeout),
    }
  }

  /// Returns `true` when a pattern matches at the start of `chunk_name`.
  pub fn is_ignored(&self, chunk_name: &str) -> bool {
    self
      .ignores
      .iter()
      .any(|pattern| pattern.find(chunk_name).is_some_and(|found| found.start() == 0))
  }
}

fn seconds(config: &str, field: &'static str, value: f64) -> Result<Duration, ConfigError> {
  Duration::try_from_secs_f64(value).map_err(|_| ConfigError::InvalidDuration {
    config: config.to_string(),
    field,
    value,
  })
}

/// Every configuration resolved from the settings, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct LoaderConfigs {
  configs: BTreeMap<String, Arc<LoaderConfig>>,
}

impl LoaderConfigs {
  /// Resolve each raw configuration in the settings.
  pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
    let configs = settings
      .webpack_loader
      .iter()
      .map(|(name, raw)| {
        LoaderConfig::resolve(name, raw, settings.debug).map(|config| (name.clone(), Arc::new(config)))
      })
      .collect::<Result<BTreeMap<_, _>, _>>()?;

    Ok(Self { configs })
  }

  /// Look up a configuration by name.
  pub fn resolve(&self, name: &str) -> Result<Arc<LoaderConfig>, LoaderError> {
    self
      .configs
      .get(name)
      .cloned()
      .ok_or_else(|| LoaderError::ConfigNotFound { name: name.to_string() })
  }

  /// Whether a configuration is registered under `name`.
  pub fn contains(&self, name: &str) -> bool {
    self.configs.contains_key(name)
  }

  /// Iterate over the configurations in name order.
  pub fn iter(&self) -> impl Iterator<Item = &LoaderConfig> {
    self.configs.values().map(Arc::as_ref)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn settings_with(name: &str, raw: LoaderSettings) -> Settings {
    Settings {
      webpack_loader: BTreeMap::from([(name.to_string(), raw)]),
      ..Settings::default()
    }
  }

  #[test]
  fn empty_override_takes_every_default() {
    let config = LoaderConfig::resolve("DEFAULT", &LoaderSettings::default(), false).unwrap();

    assert!(config.cache);
    assert_eq!(config.bundle_dir_name, "webpack_bundles/");
    assert_eq!(config.stats_file, PathBuf::from("webpack-stats.json"));
    assert_eq!(config.poll_interval, Duration::from_millis(100));
    assert_eq!(config.timeout, None);
    assert_eq!(config.ignore, vec![r".+\.hot-update.js", r".+\.map"]);
    assert_eq!(config.ignores.len(), 2);
    assert_eq!(config.loader_class, DEFAULT_LOADER);
  }

  #[test]
  fn cache_default_follows_debug_mode() {
    let config = LoaderConfig::resolve("DEFAULT", &LoaderSettings::default(), true).unwrap();
    assert!(!config.cache);
  }

  #[test]
  fn override_replaces_only_the_given_field() {
    let raw = LoaderSettings {
      bundle_dir_name: Some("bundles/".into()),
      ..LoaderSettings::default()
    };
    let config = LoaderConfig::resolve("DEFAULT", &raw, false).unwrap();

    assert_eq!(config.bundle_dir_name, "bundles/");
    assert_eq!(config.stats_file, PathBuf::from("webpack-stats.json"));
    assert_eq!(config.poll_interval, Duration::from_millis(100));
    assert_eq!(config.ignore.len(), 2);
  }

  #[test]
  fn ignore_matchers_follow_the_winning_list() {
    let raw = LoaderSettings {
      ignore: Some(vec![r".*\.js$".into()]),
      ..LoaderSettings::default()
    };
    let config = LoaderConfig::resolve("DEFAULT", &raw, false).unwrap();

    assert_eq!(config.ignores.len(), 1);
    assert!(config.is_ignored("main.js"));
    assert!(!config.is_ignored("main.css"));
    assert!(!config.is_ignored("main.js.map"));
  }

  #[test]
  fn ignore_patterns_match_from_the_start_of_the_name() {
    let raw = LoaderSettings {
      ignore: Some(vec!["map".into()]),
      ..LoaderSettings::default()
    };
    let config = LoaderConfig::resolve("DEFAULT", &raw, false).unwrap();

    assert!(config.is_ignored("map.js"));
    assert!(!config.is_ignored("main.js.map"));
  }

  #[test]
  fn default_ignores_skip_source_maps_and_hot_updates() {
    let config = LoaderConfig::resolve("DEFAULT", &LoaderSettings::default(), false).unwrap();

    assert!(config.is_ignored("main.js.map"));
    assert!(config.is_ignored("main.0a1b2c.hot-update.js"));
    assert!(!config.is_ignored("main.js"));
  }

  #[test]
  fn rejects_malformed_regex() {
    let raw = LoaderSettings {
      ignore: Some(vec!["(unclosed".into()]),
      ..LoaderSettings::default()
    };

    let err = LoaderConfig::resolve("ADMIN", &raw, false).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidPattern { ref config, .. } if config == "ADMIN"));
  }

  #[test]
  fn rejects_negative_durations() {
    let raw = LoaderSettings {
      poll_interval: Some(-1.0),
      ..LoaderSettings::default()
    };

    let err = LoaderConfig::resolve("DEFAULT", &raw, false).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidDuration { field: "POLL_INTERVAL", .. }));
  }

  #[test]
  fn poll_mode_reflects_timeout() {
    let mut config = LoaderConfig::resolve("DEFAULT", &LoaderSettings::default(), false).unwrap();
    assert_eq!(config.poll_mode(), PollMode::Disabled);

    config.timeout = Some(Duration::ZERO);
    assert_eq!(config.poll_mode(), PollMode::Unbounded);

    config.timeout = Some(Duration::from_secs(2));
    assert_eq!(config.poll_mode(), PollMode::Bounded(Duration::from_secs(2)));
  }

  #[test]
  fn resolves_registered_names_only() {
    let configs = LoaderConfigs::from_settings(&settings_with("DEFAULT", LoaderSettings::default())).unwrap();

    assert_eq!(configs.resolve("DEFAULT").unwrap().name, "DEFAULT");
    let err = configs.resolve("MISSING").unwrap_err();
    assert!(matches!(err, LoaderError::ConfigNotFound { ref name } if name == "MISSING"));
  }

  #[test]
  fn rejects_unknown_keys() {
    let err = serde_json::from_str::<LoaderSettings>(r#"{"STATS_FIEL": "stats.json"}"#).unwrap_err();
    assert!(err.to_string().contains("STATS_FIEL"));
  }
}
