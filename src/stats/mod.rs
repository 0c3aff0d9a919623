//! Stats documents written by webpack-bundle-tracker and the loaders that read them.

mod loader;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use loader::{FileStatsLoader, LoaderRegistry, StatsLoader, read_stats};

/// Parsed stats file, tagged by the build status it reports.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "status")]
pub enum Stats {
  /// The bundler has started but not begun compiling.
  #[serde(rename = "initialization", alias = "initializing")]
  Initializing,
  /// A compilation is in progress.
  #[serde(rename = "compile", alias = "compiling")]
  Compiling,
  /// The build finished and its outputs are listed.
  #[serde(rename = "done")]
  Done(CompiledStats),
  /// The build failed.
  #[serde(rename = "error")]
  Error(BuildFailure),
}

impl Stats {
  /// Canonical status token.
  ///
  /// Both spellings of a pending status map to one token: `initializing` is reported as
  /// `initialization` and `compiling` as `compile`.
  pub fn status(&self) -> &'static str {
    match self {
      Self::Initializing => "initialization",
      Self::Compiling => "compile",
      Self::Done(_) => "done",
      Self::Error(_) => "error",
    }
  }

  /// Whether the bundler is still working towards a terminal state.
  pub fn is_pending(&self) -> bool {
    matches!(self, Self::Initializing | Self::Compiling)
  }
}

/// Outputs of a finished build.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledStats {
  /// Bundle name to ordered chunk names.
  pub chunks: Option<BTreeMap<String, Vec<String>>>,
  /// Chunk name to asset record.
  pub assets: Option<BTreeMap<String, ChunkAsset>>,
  /// Public path configured in the bundler output.
  pub public_path: Option<String>,
  /// Build start, milliseconds since the epoch. Kept as written, integer or not.
  pub start_time: Option<serde_json::Number>,
  /// Build end, milliseconds since the epoch.
  pub end_time: Option<serde_json::Number>,
}

impl CompiledStats {
  /// Ordered chunk names of `bundle`.
  pub fn bundle(&self, bundle: &str) -> Option<&[String]> {
    self.chunks.as_ref()?.get(bundle).map(Vec::as_slice)
  }

  /// Asset record for `chunk`.
  pub fn asset(&self, chunk: &str) -> Option<&ChunkAsset> {
    self.assets.as_ref()?.get(chunk)
  }
}

/// Failure details of a broken build. Only the first error is reported by the tracker.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BuildFailure {
  /// Error identifier, e.g. `ModuleBuildError`.
  pub error: Option<String>,
  /// Human readable message.
  pub message: Option<String>,
  /// Source file the error was raised for.
  pub file: Option<String>,
}

impl BuildFailure {
  /// Error identifier, defaulting to `Unknown Error`.
  pub fn error_id(&self) -> &str {
    self.error.as_deref().unwrap_or("Unknown Error")
  }

  /// Message, defaulting to an empty string.
  pub fn message(&self) -> &str {
    self.message.as_deref().unwrap_or_default()
  }
}

/// One emitted output file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkAsset {
  /// File name relative to the bundle directory.
  pub name: String,
  /// Explicit public URL. Takes precedence over any computed URL.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub public_path: Option<String>,
  /// Subresource integrity hash.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub integrity: Option<String>,
  /// Absolute path of the file on disk.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub path: Option<String>,
}
