//! Project directory helpers.
//!
//! Relative paths from the configuration (models, metrics, logs, tracker runs)
//! are anchored to a single project root. The root defaults to the process
//! working directory and can be moved with `LOGIPIPE_HOME` for tests or
//! portable setups.

use std::{
    path::{Path, PathBuf},
    sync::{LazyLock, Mutex},
};

use thiserror::Error;

/// Environment variable that overrides the project root.
pub const HOME_ENV: &str = "LOGIPIPE_HOME";

static ROOT_OVERRIDE: LazyLock<Mutex<Option<PathBuf>>> = LazyLock::new(|| Mutex::new(None));

/// Errors that can occur while resolving or preparing project directories.
#[derive(Debug, Error)]
pub enum AppDirError {
    /// The working directory could not be determined.
    #[error("Unable to resolve the current working directory: {0}")]
    NoWorkingDir(std::io::Error),
    /// Failed to create a directory.
    #[error("Failed to create directory at {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Return the project root used to anchor relative paths.
pub fn project_root() -> Result<PathBuf, AppDirError> {
    if let Some(path) = ROOT_OVERRIDE.lock().ok().and_then(|guard| guard.clone()) {
        return Ok(path);
    }
    if let Ok(path) = std::env::var(HOME_ENV) {
        return Ok(PathBuf::from(path));
    }
    std::env::current_dir().map_err(AppDirError::NoWorkingDir)
}

/// Anchor `path` to the project root unless it is already absolute.
pub fn resolve(path: &Path) -> Result<PathBuf, AppDirError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(project_root()?.join(path))
}

/// Create `path` and its parents if they do not exist yet.
pub fn ensure_dir(path: &Path) -> Result<(), AppDirError> {
    std::fs::create_dir_all(path).map_err(|source| AppDirError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

/// Create the parent directory of a file path, if it has one.
pub fn ensure_parent(path: &Path) -> Result<(), AppDirError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}

/// Serializes tests that touch the project root or process environment.
#[cfg(test)]
pub(crate) fn lock_test_env() -> std::sync::MutexGuard<'static, ()> {
    static TEST_ENV: Mutex<()> = Mutex::new(());
    TEST_ENV.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Points the project root at `path` until dropped. Holds the test env lock.
#[cfg(test)]
pub(crate) struct RootOverride {
    _env: std::sync::MutexGuard<'static, ()>,
}

#[cfg(test)]
impl RootOverride {
    pub(crate) fn set(path: PathBuf) -> Self {
        let env = lock_test_env();
        *ROOT_OVERRIDE.lock().expect("root override mutex poisoned") = Some(path);
        Self { _env: env }
    }
}

#[cfg(test)]
impl Drop for RootOverride {
    fn drop(&mut self) {
        if let Ok(mut guard) = ROOT_OVERRIDE.lock() {
            *guard = None;
        }
    }
}
