#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod cache;
pub mod config;
pub mod error;
pub mod resolver;
pub mod settings;
pub mod stats;
pub mod tags;
pub mod webpack;

pub use cache::{StatsCache, StatsSnapshot};
pub use config::{DEFAULT_CONFIG_NAME, LoaderConfig, LoaderConfigs, LoaderSettings, PollMode};
pub use error::{ConfigError, LoaderError, StatsReadError};
pub use resolver::{BundleResolver, CancellationToken, ResolvedChunk, StaticFiles, StaticUrlPrefix};
pub use settings::{Settings, SettingsFile, SettingsProvider};
pub use stats::{ChunkAsset, LoaderRegistry, Stats, StatsLoader};
pub use webpack::WebpackLoader;
