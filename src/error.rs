//! Error types raised while loading settings, reading stats and resolving bundles.

use std::path::PathBuf;

use thiserror::Error;

/// Convenience result alias for bundle resolution.
pub type Result<T, E = LoaderError> = std::result::Result<T, E>;

/// Errors surfaced to callers of the resolution API.
///
/// Every variant is terminal for the current request. None of them are retried internally.
#[derive(Debug, Error)]
pub enum LoaderError {
  /// No configuration is registered under the requested name.
  #[error("webpack loader configuration '{name}' does not exist")]
  ConfigNotFound {
    /// Requested configuration name.
    name: String,
  },

  /// The configuration names a stats loader strategy that was never registered.
  #[error("configuration '{config}' uses unknown LOADER_CLASS '{loader}'")]
  UnknownLoader {
    /// Configuration that referenced the strategy.
    config: String,
    /// Strategy identifier that failed to resolve.
    loader: String,
  },

  /// The stats file could not be read or parsed.
  #[error(
    "error reading {}: {source}. Are you sure webpack has generated the file and the path is correct?",
    .path.display()
  )]
  StatsRead {
    /// Location of the stats file.
    path: PathBuf,
    /// Underlying read or parse failure.
    #[source]
    source: StatsReadError,
  },

  /// The stats file reports a failed build.
  #[error("Error in webpack '{error}': {message}")]
  BuildFailed {
    /// Configuration whose stats reported the failure.
    config: String,
    /// Error identifier reported by the bundler.
    error: String,
    /// Human readable message reported by the bundler.
    message: String,
  },

  /// The stats are not in a state that allows the requested operation.
  #[error(
    "tried to access webpack stats '{config}' for bundle '{bundle}', but it has status '{status}'. \
     Make sure webpack-bundle-tracker is enabled and webpack has finished compiling"
  )]
  BadStats {
    /// Configuration whose stats were inspected.
    config: String,
    /// Bundle or asset that was requested.
    bundle: String,
    /// Status observed in the stats file, as its canonical token (see [`crate::Stats::status`]):
    /// `compiling` is reported as `compile` and `initializing` as `initialization`.
    status: String,
  },

  /// The compiled stats do not list the requested bundle.
  #[error("cannot resolve bundle '{bundle}' in webpack stats '{config}'")]
  BundleNotFound {
    /// Configuration whose stats were searched.
    config: String,
    /// Requested bundle name.
    bundle: String,
  },

  /// A bundle references a chunk missing from the stats assets.
  #[error("the asset name '{chunk}' of bundle '{bundle}' could not be found in webpack stats '{config}'")]
  ChunkNotFound {
    /// Configuration whose stats were searched.
    config: String,
    /// Bundle that referenced the chunk.
    bundle: String,
    /// Chunk name missing from the assets table.
    chunk: String,
  },

  /// Polling gave up before the build finished.
  #[error(
    "timed out: bundle '{bundle}' of configuration '{config}' took more than {timeout_secs} seconds \
     to compile ({elapsed_secs:.3}s elapsed)"
  )]
  Timeout {
    /// Configuration being polled.
    config: String,
    /// Bundle that was requested.
    bundle: String,
    /// Configured timeout in seconds.
    timeout_secs: f64,
    /// Time spent polling in seconds.
    elapsed_secs: f64,
  },

  /// The host cancelled the request while it was waiting on the build.
  #[error("cancelled while waiting for bundle '{bundle}' of configuration '{config}'")]
  Cancelled {
    /// Configuration being polled.
    config: String,
    /// Bundle that was requested.
    bundle: String,
  },
}

/// Underlying cause of a [`LoaderError::StatsRead`].
#[derive(Debug, Error)]
pub enum StatsReadError {
  /// The file could not be opened or read.
  #[error(transparent)]
  Io(#[from] std::io::Error),
  /// The file content is not a valid stats document.
  #[error("invalid stats JSON: {0}")]
  Parse(#[from] serde_json::Error),
  /// A custom stats source failed.
  #[error("{0}")]
  Source(String),
}

/// Errors raised while turning raw settings into resolved configurations.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// The settings document could not be read.
  #[error("failed to read settings {}: {source}", .path.display())]
  Read {
    /// Settings path.
    path: PathBuf,
    /// Source I/O error.
    #[source]
    source: std::io::Error,
  },

  /// The settings document is not valid JSON.
  #[error("failed to parse settings {}: {source}", .path.display())]
  ParseJson {
    /// Settings path.
    path: PathBuf,
    /// Source parse error.
    #[source]
    source: serde_json::Error,
  },

  /// The settings document is not valid YAML.
  #[error("failed to parse settings {}: {source}", .path.display())]
  ParseYaml {
    /// Settings path.
    path: PathBuf,
    /// Source parse error.
    #[source]
    source: serde_yaml::Error,
  },

  /// An IGNORE entry is not a valid regular expression.
  #[error("configuration '{config}' has an invalid IGNORE pattern '{pattern}': {source}")]
  InvalidPattern {
    /// Configuration name.
    config: String,
    /// Offending pattern.
    pattern: String,
    /// Regex compilation error.
    #[source]
    source: regex::Error,
  },

  /// A numeric setting is out of range.
  #[error("configuration '{config}' has an invalid {field}: {value} (expected a non-negative number of seconds)")]
  InvalidDuration {
    /// Configuration name.
    config: String,
    /// Setting key.
    field: &'static str,
    /// Rejected value.
    value: f64,
  },
}
