//! Process settings consumed at startup.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::config::{DEFAULT_CONFIG_NAME, LoaderSettings};
use crate::error::ConfigError;

const DEFAULT_STATIC_URL: &str = "/static/";

/// Host settings relevant to bundle resolution.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
  /// Debug mode flag. Caching defaults to enabled only outside debug mode.
  #[serde(rename = "DEBUG")]
  pub debug: bool,
  /// URL prefix prepended to static paths when the stats carry no `publicPath`.
  #[serde(rename = "STATIC_URL")]
  pub static_url: String,
  /// Raw per-name loader configurations.
  #[serde(rename = "WEBPACK_LOADER")]
  pub webpack_loader: BTreeMap<String, LoaderSettings>,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      debug: false,
      static_url: DEFAULT_STATIC_URL.into(),
      webpack_loader: BTreeMap::from([(DEFAULT_CONFIG_NAME.to_string(), LoaderSettings::default())]),
    }
  }
}

impl Settings {
  /// Read settings from a JSON or YAML file, picking the format from the extension.
  pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;

    if is_yaml(path) {
      serde_yaml::from_str(&content).map_err(|source| ConfigError::ParseYaml {
        path: path.to_path_buf(),
        source,
      })
    } else {
      serde_json::from_str(&content).map_err(|source| ConfigError::ParseJson {
        path: path.to_path_buf(),
        source,
      })
    }
  }
}

fn is_yaml(path: &Path) -> bool {
  path
    .extension()
    .and_then(|ext| ext.to_str())
    .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
}

/// Source of the raw settings, read once when the loader is constructed.
pub trait SettingsProvider {
  /// Produce the settings snapshot.
  fn settings(&self) -> Result<Settings, ConfigError>;
}

impl SettingsProvider for Settings {
  fn settings(&self) -> Result<Settings, ConfigError> {
    Ok(self.clone())
  }
}

/// Settings backed by a file on disk.
#[derive(Debug, Clone)]
pub struct SettingsFile {
  path: PathBuf,
}

impl SettingsFile {
  /// Point at a settings file. Nothing is read until [`SettingsProvider::settings`] is called.
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  /// Location of the settings file.
  pub fn path(&self) -> &Path {
    &self.path
  }
}

impl SettingsProvider for SettingsFile {
  fn settings(&self) -> Result<Settings, ConfigError> {
    Settings::from_path(&self.path)
  }
}
