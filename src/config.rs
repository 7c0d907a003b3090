//! Config loading and persistence.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{Effect, Transience};

pub const DEFAULT_CONFIG_FILE: &str = "proxsync.toml";

/// How to reach the admin interface. Desired state lives in the manifest,
/// not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Client binary used to talk to the admin port.
    pub mysql_binary: PathBuf,
    /// my.cnf-style defaults file carrying host, port and credentials.
    pub defaults_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mysql_binary: PathBuf::from("mysql"),
            defaults_file: None,
        }
    }
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to render config: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    pub fn transience(&self) -> Transience {
        Transience::Permanent
    }

    pub fn effect(&self) -> Effect {
        Effect::None
    }
}

pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config: Config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    apply_env_overrides(&mut config);
    Ok(config)
}

/// Load the given path, or `proxsync.toml` in the working directory if
/// present, falling back to defaults. An explicit path that fails to load is
/// an error; the implicit one only warns.
pub fn load_or_default(path: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(path) = path {
        return load(path);
    }
    let implicit = Path::new(DEFAULT_CONFIG_FILE);
    if implicit.exists() {
        match load(implicit) {
            Ok(config) => return Ok(config),
            Err(e) => tracing::warn!("config load failed, using defaults: {e}"),
        }
    }
    let mut config = Config::default();
    apply_env_overrides(&mut config);
    Ok(config)
}

pub fn apply_env_overrides(config: &mut Config) {
    apply_env_overrides_inner(
        config,
        std::env::var_os("PROXSYNC_MYSQL"),
        std::env::var_os("PROXSYNC_DEFAULTS_FILE"),
    );
}

fn apply_env_overrides_inner(
    config: &mut Config,
    mysql: Option<std::ffi::OsString>,
    defaults_file: Option<std::ffi::OsString>,
) {
    if let Some(binary) = mysql {
        config.mysql_binary = PathBuf::from(binary);
    }
    if let Some(path) = defaults_file {
        config.defaults_file = Some(PathBuf::from(path));
    }
}

pub fn write_config(path: &Path, config: &Config) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir).map_err(|source| ConfigError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
    }
    let contents = toml::to_string_pretty(config)?;
    atomic_write(path, contents.as_bytes())
}

fn atomic_write(path: &Path, data: &[u8]) -> Result<(), ConfigError> {
    let dir = path.parent().filter(|d| !d.as_os_str().is_empty());
    let write_err = |source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };
    let temp = match dir {
        Some(dir) => tempfile::NamedTempFile::new_in(dir),
        None => tempfile::NamedTempFile::new(),
    }
    .map_err(write_err)?;
    fs::write(temp.path(), data).map_err(write_err)?;
    temp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
