//! Blocking wait for an unfinished build.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;

use tracing::{debug, error, info};

use crate::cache::StatsSnapshot;
use crate::config::PollMode;
use crate::error::{LoaderError, Result};
use crate::resolver::BundleResolver;

/// Flag a host sets to abort a request blocked on polling.
///
/// Clones share the flag. The resolver checks it after every poll sleep, which is the only
/// way out of a `TIMEOUT = 0` wait.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
  /// Token that has not been cancelled.
  pub fn new() -> Self {
    Self::default()
  }

  /// Request cancellation.
  pub fn cancel(&self) {
    self.0.store(true, Ordering::SeqCst);
  }

  /// Whether cancellation was requested.
  pub fn is_cancelled(&self) -> bool {
    self.0.load(Ordering::SeqCst)
  }
}

impl BundleResolver {
  /// Re-read the stats every poll interval until the build leaves its pending state.
  pub(super) fn wait_for_build(
    &self,
    bundle: &str,
    mut snapshot: Arc<StatsSnapshot>,
    cancel: &CancellationToken,
  ) -> Result<Arc<StatsSnapshot>> {
    let timeout = match self.config.poll_mode() {
      PollMode::Disabled => return Ok(snapshot),
      PollMode::Unbounded => None,
      PollMode::Bounded(timeout) => Some(timeout),
    };

    if !snapshot.stats().is_pending() {
      return Ok(snapshot);
    }

    debug!("Polling enabled, checking for completed stats file");
    let interval = self.config.poll_interval;
    let started = Instant::now();

    while snapshot.stats().is_pending() {
      info!(
        "Stats file for '{}' incomplete, polling every {:.3} seconds",
        self.config.name,
        interval.as_secs_f64()
      );
      thread::sleep(interval);

      if cancel.is_cancelled() {
        info!("Polling for bundle '{}' cancelled", bundle);
        return Err(LoaderError::Cancelled {
          config: self.config.name.clone(),
          bundle: bundle.to_string(),
        });
      }

      snapshot = self.stats(true)?;

      let elapsed = started.elapsed();
      if let Some(timeout) = timeout {
        if snapshot.stats().is_pending() && elapsed > timeout {
          error!(
            "Stats file for '{}' did not finish compiling before we timed out",
            self.config.name
          );
          return Err(LoaderError::Timeout {
            config: self.config.name.clone(),
            bundle: bundle.to_string(),
            timeout_secs: timeout.as_secs_f64(),
            elapsed_secs: elapsed.as_secs_f64(),
          });
        }
      }
    }

    info!("Stats file for '{}' finished compiling", self.config.name);
    Ok(snapshot)
  }
}
