use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory, the cache subdirectory and an initial
/// `config.json` file pointing at `script_url`.
///
/// # Arguments
/// - `ekas_home` - The directory that will be the root of the data directory,
///   e.g. `$HOME/ekas`.
/// - `script_url` - The URL of the deployed Google Apps Script web app that
///   backs the ledger, e.g. https://script.google.com/macros/s/AKfycb.../exec
///
/// # Errors
/// - Returns an error if the URL is invalid or any file operation fails.
pub async fn init(ekas_home: &Path, script_url: &str) -> Result<Out<()>> {
    let _config = Config::create(ekas_home, script_url)
        .await
        .context("Unable to create the data directory and config")?;
    Ok("Successfully created the ekas directory and config".into())
}
