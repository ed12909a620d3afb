//! Tool configuration stored in `~/.veilvault/config.toml`.
//!
//! Every key is optional:
//!
//! ```toml
//! width = 256
//! label = "any-file.zip"
//! exclude = [".git", "target"]
//! compression_level = 9
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::archive::{ArchiveOptions, BEST_COMPRESSION};
use crate::{DEFAULT_LABEL, DEFAULT_WIDTH};

/// Errors that can occur when loading or saving the configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config directory not found. Unable to determine home directory.")]
    NoConfigDir,

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Grid width must be at least 1")]
    InvalidWidth,

    #[error("Compression level must be between 0 and 9, got {0}")]
    InvalidCompressionLevel(u8),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),
}

/// Settings shared by the encode and decode commands.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct VaultConfig {
    /// Grid width in pixels.
    pub width: u32,

    /// Label written into the header row.
    pub label: String,

    /// Relative path prefixes left out of the archive.
    pub exclude: Vec<String>,

    /// DEFLATE level for archived files.
    pub compression_level: u8,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            label: DEFAULT_LABEL.to_string(),
            exclude: Vec::new(),
            compression_level: BEST_COMPRESSION,
        }
    }
}

impl VaultConfig {
    /// Loads the configuration from the default location.
    ///
    /// Returns the defaults if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Loads the configuration from an explicit path, which must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config: VaultConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves the configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    /// Saves the configuration to `path`, creating its directory.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms)?;
        }

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(get_config_dir()?.join("config.toml"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 {
            return Err(ConfigError::InvalidWidth);
        }
        if self.compression_level > BEST_COMPRESSION {
            return Err(ConfigError::InvalidCompressionLevel(self.compression_level));
        }
        Ok(())
    }

    /// Archive options derived from this configuration.
    pub fn archive_options(&self) -> ArchiveOptions {
        ArchiveOptions {
            exclude: self.exclude.clone(),
            compression_level: self.compression_level,
        }
    }
}

/// Get the VeilVault config directory (`~/.veilvault`).
pub fn get_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(".veilvault"))
        .ok_or(ConfigError::NoConfigDir)
}
