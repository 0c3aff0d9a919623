//! Command line access to bundle resolution, mainly for debugging a deployment's stats file.

mod logging;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use webpack_bundle_loader::{
  DEFAULT_CONFIG_NAME, LoaderRegistry, Settings, SettingsFile, SettingsProvider, WebpackLoader,
};

#[derive(Parser)]
#[command(name = "webpack-bundle-loader", version, about = "Resolve webpack bundles into asset URLs")]
struct Cli {
  /// JSON or YAML settings file. Built-in defaults are used when omitted.
  #[arg(long, global = true)]
  settings: Option<PathBuf>,

  /// Name of the loader configuration.
  #[arg(long, global = true, default_value = DEFAULT_CONFIG_NAME)]
  config: String,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Print the chunks of a bundle as JSON.
  Files {
    /// Bundle name.
    bundle: String,
    /// Only keep chunks with this extension, e.g. `js`.
    #[arg(long, short)]
    extension: Option<String>,
  },
  /// Print script and stylesheet tags for a bundle.
  Tags {
    /// Bundle name.
    bundle: String,
    /// Only keep chunks with this extension, e.g. `css`.
    #[arg(long, short)]
    extension: Option<String>,
    /// Extra attributes inserted into every tag.
    #[arg(long, default_value = "")]
    attrs: String,
  },
  /// Print the URL of a webpack-emitted asset.
  Static {
    /// Asset name.
    asset: String,
  },
  /// Validate the settings.
  Check,
}

fn main() -> Result<()> {
  logging::init()?;
  let cli = Cli::parse();
  let settings = cli.settings.as_ref();

  match cli.command {
    Command::Check => check(settings)?,
    Command::Files { bundle, extension } => {
      let files = build_loader(settings)?.get_files(&bundle, extension.as_deref(), &cli.config)?;
      println!("{}", serde_json::to_string_pretty(&files)?);
    }
    Command::Tags {
      bundle,
      extension,
      attrs,
    } => {
      println!(
        "{}",
        build_loader(settings)?.render_bundle(&bundle, extension.as_deref(), &cli.config, &attrs)?
      );
    }
    Command::Static { asset } => {
      println!("{}", build_loader(settings)?.get_static_url(&asset, &cli.config)?);
    }
  }

  Ok(())
}

fn load_settings(path: Option<&PathBuf>) -> Result<Settings> {
  match path {
    Some(path) => SettingsFile::new(path)
      .settings()
      .with_context(|| format!("failed to load settings from {}", path.display())),
    None => Ok(Settings::default()),
  }
}

fn build_loader(path: Option<&PathBuf>) -> Result<WebpackLoader> {
  let settings = load_settings(path)?;
  WebpackLoader::from_provider(&settings, LoaderRegistry::default())
    .context("invalid webpack loader settings")
}

fn check(path: Option<&PathBuf>) -> Result<()> {
  let loaders = LoaderRegistry::default();
  let issues = match path {
    Some(path) => WebpackLoader::check_provider(&SettingsFile::new(path), &loaders),
    None => WebpackLoader::check_provider(&Settings::default(), &loaders),
  };
  for issue in &issues {
    eprintln!("{issue}");
  }

  if !issues.is_empty() {
    bail!("{} configuration issue(s) found", issues.len());
  }

  println!("webpack loader settings OK");
  Ok(())
}
