use std::path::{Path, PathBuf};

use crate::app_dirs;

use super::types::{ConfigError, PipelineConfig};

/// Environment variable that points at an alternative config file.
pub const CONFIG_ENV: &str = "LOGIPIPE_CONFIG";
/// Default config location relative to the project root.
pub const DEFAULT_CONFIG_PATH: &str = "configs/config.toml";

/// Resolve the config file path: explicit flag, then `LOGIPIPE_CONFIG`, then the default.
pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => std::env::var(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH)),
    };
    Ok(app_dirs::resolve(&path)?)
}

/// Configuration together with where it was read from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: PipelineConfig,
    /// Resolved config path, whether or not the file existed.
    pub path: PathBuf,
    /// `false` when the file was missing and defaults were used.
    pub from_file: bool,
}

impl LoadedConfig {
    /// Log the config source. Call once a subscriber is installed.
    pub fn log_source(&self) {
        if self.from_file {
            tracing::info!("Loaded config from {}", self.path.display());
        } else {
            tracing::warn!("No config file at {}; using defaults", self.path.display());
        }
    }
}

/// Load configuration from disk, returning defaults if the file is missing.
pub fn load_or_default(explicit: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    let path = config_path(explicit)?;
    if !path.exists() {
        let config = PipelineConfig::default();
        config.validate()?;
        return Ok(LoadedConfig {
            config,
            path,
            from_file: false,
        });
    }
    let config = load_from(&path)?;
    Ok(LoadedConfig {
        config,
        path,
        from_file: true,
    })
}

/// Load and validate configuration from a specific TOML file.
pub fn load_from(path: &Path) -> Result<PipelineConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse(&text).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}

fn parse(text: &str) -> Result<PipelineConfig, toml::de::Error> {
    toml::from_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::BuiltinDataset;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    #[test]
    fn empty_document_yields_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.data.test_size, 0.2);
        assert_eq!(config.data.random_state, 42);
        assert_eq!(config.model.max_iter, 1000);
        assert!(!config.tracking.enabled);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = parse(
            r#"
            [data]
            dataset = "wine_quality"
            test_size = 0.3

            [model]
            max_iter = 200
            "#,
        )
        .unwrap();
        assert_eq!(config.data.dataset, BuiltinDataset::WineQuality);
        assert_eq!(config.data.test_size, 0.3);
        assert_eq!(config.data.random_state, 42);
        assert_eq!(config.model.max_iter, 200);
        assert_eq!(config.model.alpha, 1.0);
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn load_from_rejects_out_of_range_test_size() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[data]\ntest_size = 1.5\n").unwrap();
        let err = load_from(&path).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "data.test_size",
                ..
            }
        ));
    }

    #[test]
    fn load_from_reports_parse_errors_with_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[data\n").unwrap();
        match load_from(&path) {
            Err(ConfigError::ParseToml { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn missing_explicit_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let absent = dir.path().join("absent.toml");
        let loaded = load_or_default(Some(&absent)).unwrap();
        assert_eq!(loaded.config, PipelineConfig::default());
        assert_eq!(loaded.path, absent);
        assert!(!loaded.from_file);
    }

    #[test]
    fn missing_file_warning_reaches_the_subscriber() {
        let dir = tempdir().unwrap();
        let loaded = load_or_default(Some(&dir.path().join("absent.toml"))).unwrap();
        let buffer = SharedBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(buffer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, || loaded.log_source());
        let output = buffer.contents();
        assert!(output.contains("WARN"), "{output}");
        assert!(output.contains("No config file at"), "{output}");
    }

    #[test]
    fn explicit_flag_beats_env_and_default() {
        let dir = tempdir().unwrap();
        let explicit = dir.path().join("flag.toml");
        let env_path = dir.path().join("env.toml");
        let _root = app_dirs::RootOverride::set(dir.path().to_path_buf());
        let previous = std::env::var(CONFIG_ENV).ok();
        unsafe { std::env::set_var(CONFIG_ENV, &env_path) };
        let with_flag = config_path(Some(&explicit));
        let without_flag = config_path(None);
        unsafe { std::env::remove_var(CONFIG_ENV) };
        let fallback = config_path(None);
        if let Some(value) = previous {
            unsafe { std::env::set_var(CONFIG_ENV, value) };
        }
        assert_eq!(with_flag.unwrap(), explicit);
        assert_eq!(without_flag.unwrap(), env_path);
        assert_eq!(fallback.unwrap(), dir.path().join(DEFAULT_CONFIG_PATH));
    }

    #[test]
    fn existing_file_is_marked_as_loaded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[model]\nmax_iter = 50\n").unwrap();
        let loaded = load_or_default(Some(&path)).unwrap();
        assert!(loaded.from_file);
        assert_eq!(loaded.config.model.max_iter, 50);
    }

    #[test]
    fn zero_max_iter_is_rejected() {
        let mut config = PipelineConfig::default();
        config.model.max_iter = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_host_override_is_rejected() {
        let err = PipelineConfig::default()
            .with_overrides(|config| config.server.host = String::new())
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "server.host",
                ..
            }
        ));
    }

    #[test]
    fn valid_overrides_are_applied() {
        let config = PipelineConfig::default()
            .with_overrides(|config| {
                config.server.host = "0.0.0.0".to_string();
                config.server.port = 9000;
            })
            .unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
    }

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl std::io::Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SharedBuffer {
        type Writer = SharedBuffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }
}
