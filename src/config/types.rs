use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::data::BuiltinDataset;

use super::defaults::{
    default_alpha, default_experiment, default_false, default_host, default_logs_dir,
    default_max_iter, default_metrics_path, default_model_path, default_port,
    default_random_state, default_test_size, default_tracking_root,
};

/// Complete pipeline configuration.
///
/// Config keys (TOML): `[data]`, `[model]`, `[paths]`, `[tracking]`, `[server]`.
/// Every key is optional and falls back to its default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub data: DataSettings,
    #[serde(default)]
    pub model: ModelSettings,
    #[serde(default)]
    pub paths: PathSettings,
    #[serde(default)]
    pub tracking: TrackingSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

impl PipelineConfig {
    /// Check value ranges that TOML types alone cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let test_size = self.data.test_size;
        if !(test_size > 0.0 && test_size < 1.0) {
            return Err(ConfigError::invalid(
                "data.test_size",
                format!("must be in (0, 1), got {test_size}"),
            ));
        }
        if self.model.max_iter == 0 {
            return Err(ConfigError::invalid("model.max_iter", "must be at least 1"));
        }
        if !self.model.alpha.is_finite() || self.model.alpha < 0.0 {
            return Err(ConfigError::invalid(
                "model.alpha",
                format!("must be a finite value >= 0, got {}", self.model.alpha),
            ));
        }
        if self.tracking.enabled && self.tracking.experiment.trim().is_empty() {
            return Err(ConfigError::invalid(
                "tracking.experiment",
                "must not be empty when tracking is enabled",
            ));
        }
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::invalid("server.host", "must not be empty"));
        }
        Ok(())
    }

    /// Apply command-line overrides and validate the result.
    pub fn with_overrides(mut self, apply: impl FnOnce(&mut Self)) -> Result<Self, ConfigError> {
        apply(&mut self);
        self.validate()?;
        Ok(self)
    }
}

/// Dataset choice and split parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSettings {
    #[serde(default)]
    pub dataset: BuiltinDataset,
    #[serde(default = "default_test_size")]
    pub test_size: f64,
    #[serde(default = "default_random_state")]
    pub random_state: u64,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            dataset: BuiltinDataset::default(),
            test_size: default_test_size(),
            random_state: default_random_state(),
        }
    }
}

/// Logistic regression hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSettings {
    #[serde(default = "default_max_iter")]
    pub max_iter: u64,
    /// L2 penalty strength.
    #[serde(default = "default_alpha")]
    pub alpha: f64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            max_iter: default_max_iter(),
            alpha: default_alpha(),
        }
    }
}

/// Output locations. Relative paths are anchored to the project root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSettings {
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,
    #[serde(default = "default_metrics_path")]
    pub metrics_path: PathBuf,
    #[serde(default = "default_logs_dir")]
    pub logs_dir: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            metrics_path: default_metrics_path(),
            logs_dir: default_logs_dir(),
        }
    }
}

/// Local experiment tracker settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingSettings {
    #[serde(default = "default_false")]
    pub enabled: bool,
    #[serde(default = "default_tracking_root")]
    pub root: PathBuf,
    #[serde(default = "default_experiment")]
    pub experiment: String,
}

impl Default for TrackingSettings {
    fn default() -> Self {
        Self {
            enabled: default_false(),
            root: default_tracking_root(),
            experiment: default_experiment(),
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("Unable to resolve config path: {0}")]
    Dir(#[from] crate::app_dirs::AppDirError),
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
