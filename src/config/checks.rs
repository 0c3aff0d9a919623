//! Startup self-check for the loader settings.
//!
//! Problems are collected rather than raised so a host can report every issue at once
//! before serving requests.

use std::fmt;

use crate::config::{DEFAULT_CONFIG_NAME, DEFAULT_LOADER, LoaderConfig};
use crate::settings::{Settings, SettingsProvider};
use crate::stats::LoaderRegistry;

/// Settings could not be processed (unreadable file, parse error, bad regex, bad value).
pub const INVALID_SETTINGS: &str = "E001";
/// No `DEFAULT` configuration.
pub const MISSING_DEFAULT: &str = "E002";
/// `LOADER_CLASS` names an unregistered strategy.
pub const UNKNOWN_LOADER: &str = "E003";

/// One problem found while checking the settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
  /// Stable issue code.
  pub code: &'static str,
  /// Description of what to fix.
  pub hint: String,
}

impl fmt::Display for ConfigIssue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "Error while parsing WEBPACK_LOADER configuration (webpack_loader.{}): {}",
      self.code, self.hint
    )
  }
}

/// Read the settings from `provider` and validate them.
///
/// A settings document that cannot be read or parsed is reported as a single
/// [`INVALID_SETTINGS`] issue instead of an error.
pub fn run_provider_checks(provider: &dyn SettingsProvider, loaders: &LoaderRegistry) -> Vec<ConfigIssue> {
  match provider.settings() {
    Ok(settings) => run_checks(&settings, loaders),
    Err(err) => vec![ConfigIssue {
      code: INVALID_SETTINGS,
      hint: format!("Got exception: {err}"),
    }],
  }
}

/// Validate every configuration in `settings` against the registered loaders.
pub fn run_checks(settings: &Settings, loaders: &LoaderRegistry) -> Vec<ConfigIssue> {
  let mut issues = Vec::new();

  if !settings.webpack_loader.contains_key(DEFAULT_CONFIG_NAME) {
    issues.push(ConfigIssue {
      code: MISSING_DEFAULT,
      hint: format!("Missing {DEFAULT_CONFIG_NAME} configuration"),
    });
  }

  for (name, raw) in &settings.webpack_loader {
    if let Err(err) = LoaderConfig::resolve(name, raw, settings.debug) {
      issues.push(ConfigIssue {
        code: INVALID_SETTINGS,
        hint: format!("Got exception: {err}"),
      });
    }

    let loader = raw.loader_class.as_deref().unwrap_or(DEFAULT_LOADER);
    if !loaders.contains(loader) {
      issues.push(ConfigIssue {
        code: UNKNOWN_LOADER,
        hint: format!("Could not import LOADER_CLASS \"{loader}\" for configuration '{name}'"),
      });
    }
  }

  issues
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeMap;
  use std::fs;

  use super::*;
  use crate::config::LoaderSettings;
  use crate::settings::SettingsFile;
  use tempfile::tempdir;

  fn settings(entries: Vec<(&str, LoaderSettings)>) -> Settings {
    Settings {
      webpack_loader: entries
        .into_iter()
        .map(|(name, raw)| (name.to_string(), raw))
        .collect::<BTreeMap<_, _>>(),
      ..Settings::default()
    }
  }

  #[test]
  fn default_settings_pass() {
    assert!(run_checks(&Settings::default(), &LoaderRegistry::default()).is_empty());
  }

  #[test]
  fn reports_missing_default() {
    let issues = run_checks(
      &settings(vec![("ADMIN", LoaderSettings::default())]),
      &LoaderRegistry::default(),
    );

    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].code, MISSING_DEFAULT);
  }

  #[test]
  fn reports_unknown_loader_class() {
    let raw = LoaderSettings {
      loader_class: Some("custom.Loader".into()),
      ..LoaderSettings::default()
    };
    let issues = run_checks(&settings(vec![("DEFAULT", raw)]), &LoaderRegistry::default());

    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].code, UNKNOWN_LOADER);
    assert!(issues[0].hint.contains("custom.Loader"));
  }

  #[test]
  fn reports_malformed_patterns() {
    let raw = LoaderSettings {
      ignore: Some(vec!["[".into()]),
      ..LoaderSettings::default()
    };
    let issues = run_checks(&settings(vec![("DEFAULT", raw)]), &LoaderRegistry::default());

    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].code, INVALID_SETTINGS);
    assert!(issues[0].to_string().contains("webpack_loader.E001"));
  }

  #[test]
  fn type_mismatch_in_settings_file_is_one_invalid_settings_issue() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, r#"{"WEBPACK_LOADER": {"DEFAULT": {"CACHE": "yes"}}}"#).unwrap();

    let issues = run_provider_checks(&SettingsFile::new(&path), &LoaderRegistry::default());

    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].code, INVALID_SETTINGS);
    assert!(issues[0].hint.starts_with("Got exception: "));
    assert!(issues[0].to_string().contains("webpack_loader.E001"));
  }

  #[test]
  fn unreadable_or_malformed_settings_files_are_invalid_settings() {
    let dir = tempdir().unwrap();
    let yaml = dir.path().join("settings.yaml");
    fs::write(&yaml, "WEBPACK_LOADER: [\n").unwrap();
    let absent = dir.path().join("absent.json");

    for path in [yaml, absent] {
      let issues = run_provider_checks(&SettingsFile::new(&path), &LoaderRegistry::default());
      assert_eq!(issues.len(), 1, "{}", path.display());
      assert_eq!(issues[0].code, INVALID_SETTINGS);
    }
  }

  #[test]
  fn readable_settings_go_through_the_regular_checks() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, r#"{"WEBPACK_LOADER": {"ADMIN": {"LOADER_CLASS": "custom.Loader"}}}"#).unwrap();

    let codes: Vec<&str> = run_provider_checks(&SettingsFile::new(&path), &LoaderRegistry::default())
      .into_iter()
      .map(|issue| issue.code)
      .collect();

    assert_eq!(codes, vec![MISSING_DEFAULT, UNKNOWN_LOADER]);
  }
}
