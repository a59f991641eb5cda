//! # Configuration
//!
//! One TOML file holds everything the binary needs: integrator settings, host
//! pipeline scheduling and logging. Every section falls back to defaults, so
//! a file containing only `[filter]\nscreen_width = 2560` is valid.
//!
//! ```toml
//! [filter]
//! screen_width = 1920
//! screen_height = 1080
//! input_sensitivity = 0.02
//! output_sensitivity = 1.0
//! apply_acceleration = false
//! acceleration_exponent = 2.0
//! apply_acceleration_component_wise = false
//!
//! [pipeline]
//! emission_interval_us = 1000
//! range_timeout_ms = 100
//!
//! [logging]
//! level = "info"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::filter::IntegratorSettings;
use crate::pipeline::PipelineSettings;

const CONFIG_DIR: &str = "cursor-integrate";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,
    pub with_thread_ids: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            with_thread_ids: true,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub filter: IntegratorSettings,
    pub pipeline: PipelineSettings,
    pub logging: LoggingSettings,
}

impl AppConfig {
    /// `<config dir>/cursor-integrate/config.toml`
    ///
    /// Falls back to the home directory, then the working directory.
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| {
                warn!("Could not determine config directory, using current directory");
                PathBuf::from(".")
            });
        path.push(CONFIG_DIR);
        path.push(CONFIG_FILE);
        path
    }

    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!("Loading configuration from {}", path.display());
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;

        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Loads the file if it exists, defaults otherwise
    pub async fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        let exists = tokio::fs::try_exists(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        if exists {
            Self::load(path).await
        } else {
            warn!(
                "Config file {} does not exist, using defaults",
                path.display()
            );
            Ok(Self::default())
        }
    }

    pub async fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| ConfigError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let content = toml::to_string_pretty(self)?;
        tokio::fs::write(path, content)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Writes a default config file unless one already exists.
    ///
    /// Returns `true` when a file was created.
    pub async fn ensure_default(path: &Path) -> Result<bool, ConfigError> {
        let exists = tokio::fs::try_exists(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        if exists {
            debug!("Config file {} already present", path.display());
            return Ok(false);
        }

        info!("Creating default configuration at {}", path.display());
        Self::default().save(path).await?;
        Ok(true)
    }

    /// Rejects values that would make the integrator emit non-finite positions.
    ///
    /// Only applied to loaded files; in-memory setters stay unchecked.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let filter = &self.filter;
        if filter.screen_width == 0 || filter.screen_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "screen size must be non-zero, got {}x{}",
                filter.screen_width, filter.screen_height
            )));
        }

        for (name, value) in [
            ("input_sensitivity", filter.input_sensitivity),
            ("output_sensitivity", filter.output_sensitivity),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }

        if !filter.acceleration_exponent.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "acceleration_exponent must be finite, got {}",
                filter.acceleration_exponent
            )));
        }

        if self.pipeline.emission_interval_us == 0 {
            return Err(ConfigError::Invalid(
                "emission_interval_us must be non-zero".to_string(),
            ));
        }
        if self.pipeline.channel_capacity == 0 {
            return Err(ConfigError::Invalid(
                "channel_capacity must be non-zero".to_string(),
            ));
        }

        Ok(())
    }
}
