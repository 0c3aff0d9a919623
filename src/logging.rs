use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize stderr logging for the CLI.
///
/// The level is controlled through `RUST_LOG`, e.g. `RUST_LOG=webpack_bundle_loader=debug`.
pub fn init() -> Result<()> {
  let env_filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new("webpack_bundle_loader=info"));

  tracing_subscriber::registry()
    .with(env_filter)
    .with(
      tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact(),
    )
    .try_init()
    .context("Failed to initialize tracing subscriber")?;

  Ok(())
}
