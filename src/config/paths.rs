//! Path management for ynab-sensors
//!
//! Provides XDG-compliant path resolution for configuration and persisted
//! snapshots.
//!
//! ## Path Resolution Order
//!
//! 1. `YNAB_SENSORS_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/ynab-sensors` or `~/.config/ynab-sensors`
//! 3. Windows: `%APPDATA%\ynab-sensors`

use std::path::PathBuf;

use crate::error::YnabError;

/// Environment variable overriding the base directory
pub const DATA_DIR_ENV: &str = "YNAB_SENSORS_DATA_DIR";

/// Manages all paths used by ynab-sensors
#[derive(Debug, Clone)]
pub struct SensorPaths {
    /// Base directory for all ynab-sensors data
    base_dir: PathBuf,
}

impl SensorPaths {
    /// Create a new SensorPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, YnabError> {
        let base_dir = if let Ok(custom) = std::env::var(DATA_DIR_ENV) {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create SensorPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.config/ynab-sensors/ or equivalent)
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Copy of a settings file that could not be read, kept before overwriting it
    pub fn settings_backup_file(&self) -> PathBuf {
        self.base_dir.join("config.json.bak")
    }

    /// Get the directory holding locally entered per-account values
    pub fn user_values_dir(&self) -> PathBuf {
        self.base_dir.join("user_values")
    }

    /// Get the user values file for one configured instance
    pub fn user_values_file(&self, instance: &str) -> PathBuf {
        self.user_values_dir().join(format!("{}.json", instance))
    }

    /// Get the directory holding persisted snapshots
    pub fn snapshot_dir(&self) -> PathBuf {
        self.base_dir.join("snapshots")
    }

    /// Get the persisted snapshot file for one configured instance
    pub fn snapshot_file(&self, instance: &str) -> PathBuf {
        self.snapshot_dir().join(format!("{}.json", instance))
    }

    /// Ensure all required directories exist
    pub fn ensure_directories(&self) -> Result<(), YnabError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| YnabError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.snapshot_dir())
            .map_err(|e| YnabError::Io(format!("Failed to create snapshot directory: {}", e)))?;

        Ok(())
    }

    /// Check if setup has been run (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

/// Resolve the default data directory path based on platform
#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, YnabError> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(xdg).join("ynab-sensors"));
    }
    let home = std::env::var("HOME")
        .map_err(|_| YnabError::Config("Could not determine HOME directory".into()))?;
    Ok(PathBuf::from(home).join(".config").join("ynab-sensors"))
}

/// Resolve the default data directory path based on platform
#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, YnabError> {
    let appdata = std::env::var("APPDATA")
        .map_err(|_| YnabError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("ynab-sensors"))
}
