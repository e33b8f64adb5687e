//! Configuration file handling for ekas.
//!
//! The configuration file is stored at `$EKAS_HOME/config.json` and holds the
//! URL of the deployed Google Apps Script web app that backs the ledger. The
//! offline cache slots live under `$EKAS_HOME/cache/`.

use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;
use url::Url;

const APP_NAME: &str = "ekas";
const CONFIG_VERSION: u8 = 1;
const CACHE: &str = "cache";
const CONFIG_JSON: &str = "config.json";

/// Represents the `$EKAS_HOME` data directory: the config file plus the paths
/// of the four offline cache slots.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    cache: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the data directory and an initial `config.json` pointing at
    /// `script_url`.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of the data directory,
    ///   e.g. `$HOME/ekas`.
    /// - `script_url` - The URL of the deployed Apps Script web app, e.g.
    ///   https://script.google.com/macros/s/AKfycb.../exec
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or any file operation fails.
    pub async fn create(dir: impl Into<PathBuf>, script_url: &str) -> Result<Self> {
        validate_script_url(script_url)?;

        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the ekas home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let cache = root.join(CACHE);
        utils::make_dir(&cache).await?;

        let config_path = root.join(CONFIG_JSON);
        let config_file = ConfigFile {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            script_url: script_url.to_string(),
        };
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            cache,
            config_path,
            config_file,
        })
    }

    /// Validates that `ekas_home` and its config file exist, loads the config
    /// file, and returns the loaded configuration object.
    pub async fn load(ekas_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = ekas_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("Ekas home is missing; run 'ekas init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let cache = root.join(CACHE);
        // The cache directory can be missing if it was cleaned out by hand.
        utils::make_dir(&cache).await?;

        Ok(Self {
            root,
            cache,
            config_path,
            config_file,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn script_url(&self) -> &str {
        &self.config_file.script_url
    }

    /// The session cache slot.
    pub fn session_path(&self) -> PathBuf {
        self.cache.join("session.json")
    }

    /// The settings cache slot.
    pub fn settings_path(&self) -> PathBuf {
        self.cache.join("settings.json")
    }

    /// The student list cache slot.
    pub fn students_path(&self) -> PathBuf {
        self.cache.join("students.json")
    }

    /// The transaction log cache slot.
    pub fn transactions_path(&self) -> PathBuf {
        self.cache.join("transactions.json")
    }
}

/// Represents the serialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "ekas",
///   "config_version": 1,
///   "script_url": "https://script.google.com/macros/s/AKfycbz.../exec"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "ekas"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// URL of the deployed Apps Script web app
    script_url: String,
}

impl ConfigFile {
    /// Loads a `ConfigFile` from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if the
    /// app_name does not match.
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::read_json(path).await?;
        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        Ok(config)
    }

    /// Saves the `ConfigFile` to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        utils::write_json(path.as_ref(), self)
            .await
            .context("Unable to write config file")
    }
}

/// Checks that the script URL parses, and warns when it does not look like a
/// deployed Apps Script web app (the original UI refuses to fetch in that
/// case; here the fetch would simply fail and flip the connectivity flag).
fn validate_script_url(script_url: &str) -> Result<()> {
    let url = Url::parse(script_url)
        .with_context(|| format!("Invalid script URL '{script_url}'"))?;
    if !url.path().contains("/macros/s/") {
        warn!(
            "The script URL does not look like a deployed Apps Script web app \
            (expected a '/macros/s/' path): {script_url}"
        );
    }
    Ok(())
}
