//! Mapping chunk assets to public URLs.

use crate::config::LoaderConfig;
use crate::stats::ChunkAsset;

/// Host capability that maps a logical static path to its served URL.
pub trait StaticFiles: Send + Sync {
  /// URL of `path`. Must not fail for any syntactically valid path.
  fn url(&self, path: &str) -> String;
}

/// Serves static paths below a fixed URL prefix, e.g. `/static/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticUrlPrefix {
  prefix: String,
}

impl StaticUrlPrefix {
  /// Use `prefix` as the static URL root.
  pub fn new(prefix: impl Into<String>) -> Self {
    Self {
      prefix: prefix.into(),
    }
  }
}

impl StaticFiles for StaticUrlPrefix {
  fn url(&self, path: &str) -> String {
    format!(
      "{}/{}",
      self.prefix.trim_end_matches('/'),
      path.trim_start_matches('/')
    )
  }
}

/// Public URL of `chunk`.
///
/// An explicit `publicPath` is returned unchanged. Otherwise `BUNDLE_DIR_NAME` is prefixed
/// onto the chunk name and the result handed to `static_files`.
pub fn resolve_chunk_url(
  chunk: &ChunkAsset,
  config: &LoaderConfig,
  static_files: &dyn StaticFiles,
) -> String {
  if let Some(public_path) = &chunk.public_path {
    return public_path.clone();
  }

  static_files.url(&format!("{}{}", config.bundle_dir_name, chunk.name))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::LoaderSettings;

  fn config() -> LoaderConfig {
    LoaderConfig::resolve("DEFAULT", &LoaderSettings::default(), false).unwrap()
  }

  fn chunk(name: &str, public_path: Option<&str>) -> ChunkAsset {
    ChunkAsset {
      name: name.into(),
      public_path: public_path.map(str::to_string),
      integrity: None,
      path: None,
    }
  }

  #[test]
  fn prefixes_bundle_dir_and_static_url() {
    let url = resolve_chunk_url(&chunk("main.js", None), &config(), &StaticUrlPrefix::new("/static/"));
    assert_eq!(url, "/static/webpack_bundles/main.js");
  }

  #[test]
  fn explicit_public_path_wins() {
    let url = resolve_chunk_url(
      &chunk("main.js", Some("http://localhost:3000/main.js")),
      &config(),
      &StaticUrlPrefix::new("/static/"),
    );
    assert_eq!(url, "http://localhost:3000/main.js");
  }

  #[test]
  fn prefix_join_tolerates_missing_or_doubled_slashes() {
    assert_eq!(StaticUrlPrefix::new("/static").url("a.js"), "/static/a.js");
    assert_eq!(StaticUrlPrefix::new("/static/").url("/a.js"), "/static/a.js");
    assert_eq!(StaticUrlPrefix::new("").url("a.js"), "/a.js");
  }
}
