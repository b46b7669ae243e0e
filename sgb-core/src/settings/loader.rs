//! Settings file discovery and loading

use super::schema::Settings;
use crate::error::{CoreError, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub struct SettingsLoader;

impl SettingsLoader {
    /// Find the user settings file by checking environment and standard locations
    pub fn find_user_settings() -> Option<PathBuf> {
        // 1. $SGB_CONFIG
        if let Ok(path) = env::var("SGB_CONFIG") {
            let p = PathBuf::from(path);
            if p.exists() {
                return Some(p);
            }
        }

        // 2. $XDG_CONFIG_HOME/sgb/config.toml
        if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
            let p = PathBuf::from(xdg).join("sgb/config.toml");
            if p.exists() {
                return Some(p);
            }
        }

        // 3. ~/.config/sgb/config.toml
        if let Ok(home) = env::var("HOME") {
            let p = PathBuf::from(home).join(".config/sgb/config.toml");
            if p.exists() {
                return Some(p);
            }
        }

        None
    }

    /// Load settings from a file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Settings> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| CoreError::SettingsLoad {
            path: path.to_path_buf(),
            source,
        })?;

        let settings: Settings = toml::from_str(&contents)?;
        Ok(settings)
    }

    /// Load settings from an explicit path, the standard locations, or defaults
    /// Priority: Explicit path > User settings > Built-in defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Settings> {
        if let Some(p) = path {
            return Self::load_from_file(p);
        }

        match Self::find_user_settings() {
            Some(p) => {
                tracing::debug!("Loading settings from {:?}", p);
                Self::load_from_file(&p)
            }
            None => {
                tracing::debug!("No settings file found, using built-in defaults");
                Ok(Settings::default())
            }
        }
    }
}
