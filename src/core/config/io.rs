use crate::core::config::data::Config;
use directories::ProjectDirs;
use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Errors that can occur when loading configuration from disk or applying
/// its entries.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    Read {
        /// Path to the configuration file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the configuration file as valid TOML.
    Parse {
        /// Path to the configuration file with invalid TOML.
        path: PathBuf,
        /// The TOML deserialization error.
        source: toml::de::Error,
    },

    /// A binding names an action that does not exist.
    UnknownAction { name: String },

    /// A binding or mapping names a view that does not exist.
    UnknownView { name: String },

    /// A key-string could not be used.
    InvalidKeys { keys: String, reason: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "Failed to read config at {}: {}", path.display(), source)
            }
            ConfigError::Parse { path, source } => {
                write!(f, "Failed to parse config at {}: {}", path.display(), source)
            }
            ConfigError::UnknownAction { name } => write!(f, "Unknown action in config: {name}"),
            ConfigError::UnknownView { name } => write!(f, "Unknown view in config: {name}"),
            ConfigError::InvalidKeys { keys, reason } => {
                write!(f, "Invalid key-string '{keys}' in config: {reason}")
            }
        }
    }
}

impl StdError for ConfigError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl Config {
    /// Load configuration from `config_path`.
    ///
    /// Never fails: a missing file yields the defaults, and an unreadable or
    /// malformed file yields the defaults plus the error that explains why.
    pub fn load(config_path: &Path) -> (Config, Vec<ConfigError>) {
        if !config_path.exists() {
            debug!(path = %config_path.display(), "No config file, using defaults");
            return (Config::default(), Vec::new());
        }

        let contents = match fs::read_to_string(config_path) {
            Ok(contents) => contents,
            Err(source) => {
                let err = ConfigError::Read {
                    path: config_path.to_path_buf(),
                    source,
                };
                return (Config::default(), vec![err]);
            }
        };

        match toml::from_str::<Config>(&contents) {
            Ok(config) => {
                info!(path = %config_path.display(), "Loaded config");
                (config, Vec::new())
            }
            Err(source) => {
                let err = ConfigError::Parse {
                    path: config_path.to_path_buf(),
                    source,
                };
                (Config::default(), vec![err])
            }
        }
    }

    /// `config.toml` in the platform configuration directory, when one can
    /// be determined.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "twig", "twig").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
