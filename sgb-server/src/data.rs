//! Data directory bootstrap

use crate::error::{Result, ServerError};
use sgb_core::ServerSettings;
use std::fs;
use std::path::Path;

/// Create the data directory and seed any missing configuration files
pub fn prepare_data_dir(settings: &ServerSettings) -> Result<()> {
    fs::create_dir_all(&settings.data_dir).map_err(|source| ServerError::ConfigRead {
        path: settings.data_dir.clone(),
        source,
    })?;

    seed_if_missing(&settings.commands_path(), &settings.seed_commands)?;
    seed_if_missing(&settings.whitelist_path(), &settings.seed_whitelist)?;
    Ok(())
}

fn seed_if_missing(path: &Path, contents: &str) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    tracing::info!("Creating {:?}", path);
    fs::write(path, contents)?;
    Ok(())
}
