//! Configuration management for parkview

pub mod loader;
pub mod settings;
pub mod validation;

pub use loader::{ConfigError, ConfigLoader};
pub use settings::{ChartConfig, Config, LogFormat, LoggingSettings, ReportsConfig, StoreConfig};
