//! Server configuration.
//!
//! Sources are layered, later ones winning:
//!
//! 1. built-in defaults
//! 2. a YAML file named by the `CONFIG` environment variable
//! 3. the `LISTEN`, `DIRECTORY` and `WORKERS` environment variables
//! 4. `--directory <path>` on the command line
//!
//! ```yaml
//! listen_addr: "127.0.0.1:4221"
//! directory: /tmp/files
//! workers: 4
//! max_request_bytes: 65536
//! read_timeout_secs: 30
//! ```

use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// Command-line arguments.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "tinyhttp")]
#[command(about = "A small HTTP/1.1 echo and file server", long_about = None)]
pub struct Args {
    /// Base directory for the /files routes
    #[arg(long)]
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen_addr: String,
    /// Base directory for the `/files` routes.
    pub directory: Option<PathBuf>,
    /// Number of independent accept loops.
    pub workers: usize,
    /// Upper bound on a buffered request, head and body together.
    pub max_request_bytes: usize,
    /// Per-read timeout. Unset means a silent client holds its worker forever.
    pub read_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:4221".to_string(),
            directory: None,
            workers: 4,
            max_request_bytes: 64 * 1024,
            read_timeout_secs: None,
        }
    }
}

impl Config {
    /// Loads configuration from the process environment and arguments.
    ///
    /// Exits with clap's usage message when the arguments do not parse.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_sources(|key| std::env::var(key).ok(), Args::parse())
    }

    /// Builds a configuration from an environment lookup and parsed arguments.
    pub fn from_sources<F>(env: F, args: Args) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = match env("CONFIG") {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };

        if let Some(addr) = env("LISTEN") {
            cfg.listen_addr = addr;
        }
        if let Some(dir) = env("DIRECTORY") {
            cfg.directory = Some(PathBuf::from(dir));
        }
        if let Some(workers) = env("WORKERS") {
            cfg.workers = workers.parse().map_err(|_| ConfigError::InvalidValue {
                key: "WORKERS",
                value: workers.clone(),
            })?;
        }

        if let Some(dir) = args.directory {
            cfg.directory = Some(dir);
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::InvalidValue {
                key: "workers",
                value: self.workers.to_string(),
            });
        }
        if self.max_request_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_request_bytes",
                value: self.max_request_bytes.to_string(),
            });
        }
        Ok(())
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_secs.map(Duration::from_secs)
    }
}
