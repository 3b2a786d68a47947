//! Configuration file handling for EzPay.
//!
//! The configuration file is stored at `$EZPAY_HOME/config.json` and contains the address of the
//! EzPay service, the user whose history is being viewed, and display settings.

use crate::api::Endpoints;
use crate::paginate::DEFAULT_PAGE_SIZE;
use crate::{utils, Result};
use anyhow::{bail, ensure, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

const APP_NAME: &str = "ezpay";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const EXPORTS: &str = "exports";

pub const DEFAULT_BASE_URL: &str = "http://localhost:8090";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$EZPAY_HOME` and from there it loads `$EZPAY_HOME/config.json`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    exports: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the EzPay home directory, its `exports` subdirectory and an initial `config.json`.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the EzPay home, e.g. `$HOME/.ezpay`
    /// - `base_url` - The address of the EzPay service, e.g. `http://localhost:8090`
    /// - `session_user` - The user whose transactions are viewed. Exported reports mark
    ///   transactions received by this user as credits.
    /// - `page_size` - Rows per page, `None` for the default of 5.
    ///
    /// # Errors
    /// - Returns an error if the settings are invalid or any file operation fails.
    pub async fn create(
        dir: impl Into<PathBuf>,
        base_url: &str,
        session_user: &str,
        page_size: Option<usize>,
    ) -> Result<Self> {
        let config_file = ConfigFile {
            base_url: base_url.trim().to_string(),
            session_user: session_user.trim().to_string(),
            page_size: page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            ..ConfigFile::default()
        };
        config_file.validate()?;

        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the EzPay home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let exports = root.join(EXPORTS);
        utils::make_dir(&exports).await?;

        let config_path = root.join(CONFIG_JSON);
        config_file.save(&config_path).await?;
        debug!("Created {}", config_path.display());

        Ok(Self {
            root,
            exports,
            config_path,
            config_file,
        })
    }

    /// This will
    /// - validate that `ezpay_home` exists and that the config file exists
    /// - load and validate the config file
    /// - validate that the exports directory exists
    pub async fn load(ezpay_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = ezpay_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("EzPay Home is missing, run `ezpay init` first")?;
        let _ = utils::read_dir(&root).await?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let exports = root.join(EXPORTS);
        if !exports.is_dir() {
            bail!("The exports directory is missing '{}'", exports.display())
        }

        Ok(Self {
            root,
            exports,
            config_path,
            config_file,
        })
    }

    /// Replaces the configured base URL for this run only. The file is not changed.
    pub fn with_base_url(mut self, base_url: Option<&str>) -> Result<Self> {
        if let Some(base_url) = base_url {
            Endpoints::new(base_url)?;
            self.config_file.base_url = base_url.trim().to_string();
        }
        Ok(self)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn exports(&self) -> &Path {
        &self.exports
    }

    pub fn base_url(&self) -> &str {
        &self.config_file.base_url
    }

    pub fn session_user(&self) -> &str {
        &self.config_file.session_user
    }

    pub fn page_size(&self) -> usize {
        self.config_file.page_size
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.config_file.request_timeout_secs)
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "ezpay",
///   "config_version": 1,
///   "base_url": "http://localhost:8090",
///   "session_user": "user10",
///   "page_size": 5,
///   "request_timeout_secs": 30
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "ezpay"
    app_name: String,

    config_version: u8,

    /// The address of the EzPay service. All endpoint paths are relative to it.
    base_url: String,

    session_user: String,

    #[serde(default = "default_page_size")]
    page_size: usize,

    #[serde(default = "default_request_timeout_secs")]
    request_timeout_secs: u64,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            base_url: DEFAULT_BASE_URL.to_string(),
            session_user: String::new(),
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl ConfigFile {
    /// Loads and validates a ConfigFile from the specified path.
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;
        config
            .validate()
            .with_context(|| format!("Invalid config file at {}", path.display()))?;
        Ok(config)
    }

    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        utils::serialize(path.as_ref(), self)
            .await
            .context("Unable to write config file")
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            self.app_name
        );
        ensure!(self.page_size > 0, "The page size must be greater than zero");
        ensure!(
            self.request_timeout_secs > 0,
            "The request timeout must be greater than zero"
        );
        Endpoints::new(&self.base_url)?;
        Ok(())
    }
}
