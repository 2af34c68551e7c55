//! TOML configuration for training and serving.

mod defaults;
mod io;
mod types;

pub use io::{
    CONFIG_ENV, DEFAULT_CONFIG_PATH, LoadedConfig, config_path, load_from, load_or_default,
};
pub use types::{
    ConfigError, DataSettings, ModelSettings, PathSettings, PipelineConfig, ServerSettings,
    TrackingSettings,
};
